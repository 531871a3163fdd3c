//! Registration identifier allocation

use crate::error::HotkeyError;

/// First id handed out. Zero is avoided so an uninitialized id never
/// matches a live registration.
const FIRST_ID: i32 = 1;

/// Last id usable by applications; Windows reserves ids above 0xBFFF
/// for DLLs.
const LAST_ID: i32 = 0xBFFF;

/// Monotonic allocator for OS registration ids.
///
/// Ids are never reissued while the allocator lives, which trivially
/// satisfies "never issue an id held by a live registration". On
/// exhaustion of the application id range it fails with
/// [`HotkeyError::IdsExhausted`] rather than wrapping around into ids
/// that may still be live.
#[derive(Debug)]
pub(crate) struct IdAllocator {
    next: i32,
}

impl IdAllocator {
    pub(crate) fn new() -> Self {
        Self { next: FIRST_ID }
    }

    pub(crate) fn next(&mut self) -> Result<i32, HotkeyError> {
        if self.next > LAST_ID {
            return Err(HotkeyError::IdsExhausted);
        }
        let id = self.next;
        self.next += 1;
        Ok(id)
    }
}
