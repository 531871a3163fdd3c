//! Global hotkey registry
//!
//! The registry maps key+modifier combinations to live OS registrations
//! and routes WM_HOTKEY messages from the host's message pump to the
//! actions subscribed on each combination.
//!
//! Setup flow: [`HotkeyRegistry::register`] allocates an id, asks the
//! [`RegistrationBackend`](crate::platform::RegistrationBackend) to
//! register it with the OS, and tracks the resulting [`HotkeyHandle`].
//! Press flow: the pump hands every raw message to
//! [`HotkeyRegistry::dispatch`], which decodes it and notifies the
//! matching handle's actions.

mod handle;
mod ids;
mod message;
mod registry;

pub use handle::ActionId;
pub use message::{RawMessage, WM_HOTKEY};
pub use registry::HotkeyRegistry;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::keys::{HotkeySpec, Modifiers, ParseHotkeyError, VirtualKey};

/// A key plus its semantically meaningful modifiers: the registry's
/// lookup key.
///
/// The NOREPEAT bit is stripped at construction, so registering with or
/// without it always lands in the same slot and never shows up in error
/// messages. Immutable after construction; equality and hash cover the
/// key and the normalized modifiers.
///
/// Serializable for logging/diagnostics; deserialization goes through
/// [`HotkeySpec`] so the normalization invariant cannot be bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyCombination {
    key: VirtualKey,
    modifiers: Modifiers,
}

impl KeyCombination {
    pub fn new(key: VirtualKey, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers: modifiers.normalized(),
        }
    }

    pub fn key(&self) -> VirtualKey {
        self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl From<HotkeySpec> for KeyCombination {
    fn from(spec: HotkeySpec) -> Self {
        Self::new(spec.key, spec.modifiers)
    }
}

impl FromStr for KeyCombination {
    type Err = ParseHotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<HotkeySpec>().map(Self::from)
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Payload delivered to every action when its hotkey fires.
///
/// Fields mirror the WM_HOTKEY message: the registration id from wParam,
/// key and modifiers unpacked from lParam, the cursor position and the
/// message timestamp (milliseconds since system start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotkeyEvent {
    pub id: i32,
    pub key: VirtualKey,
    pub modifiers: Modifiers,
    pub cursor_x: i32,
    pub cursor_y: i32,
    pub time_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_masks_norepeat() {
        let with = KeyCombination::new(VirtualKey(0x41), Modifiers::CONTROL | Modifiers::NOREPEAT);
        let without = KeyCombination::new(VirtualKey(0x41), Modifiers::CONTROL);
        assert_eq!(with, without);
        assert!(!with.modifiers().contains(Modifiers::NOREPEAT));
    }

    #[test]
    fn test_combination_equality_is_structural() {
        let a = KeyCombination::new(VirtualKey(0x41), Modifiers::CONTROL);
        let b = KeyCombination::new(VirtualKey(0x41), Modifiers::SHIFT);
        let c = KeyCombination::new(VirtualKey(0x42), Modifiers::CONTROL);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_combination_display_never_shows_norepeat() {
        let combo = KeyCombination::new(
            VirtualKey::SPACE,
            Modifiers::CONTROL | Modifiers::ALT | Modifiers::NOREPEAT,
        );
        assert_eq!(combo.to_string(), "Ctrl+Alt+Space");
    }

    #[test]
    fn test_combination_from_spec_string() {
        let combo: KeyCombination = "ctrl+norepeat+k".parse().unwrap();
        assert_eq!(
            combo,
            KeyCombination::new(VirtualKey(0x4B), Modifiers::CONTROL)
        );
    }
}
