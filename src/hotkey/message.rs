//! Raw message decoding
//!
//! WM_HOTKEY packs the registration id into wParam and the combination
//! into lParam: high 16 bits carry the virtual key code, low 16 bits the
//! modifier flags. This must mirror the OS encoding exactly; a one-bit
//! misalignment silently breaks all dispatch.

use crate::hotkey::HotkeyEvent;
use crate::keys::{Modifiers, VirtualKey};

/// The Win32 hotkey notification message.
pub const WM_HOTKEY: u32 = 0x0312;

/// One message as delivered by the host's message pump, shaped like the
/// Win32 MSG record the pump reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub message: u32,
    pub wparam: usize,
    pub lparam: isize,
    /// Cursor position at the time the message was posted.
    pub pt_x: i32,
    pub pt_y: i32,
    /// Milliseconds since system start.
    pub time: u32,
}

impl RawMessage {
    /// Whether this message is a hotkey-press notification at all.
    pub fn is_hotkey(&self) -> bool {
        self.message == WM_HOTKEY
    }

    /// Decode a hotkey message into its event payload. `None` for any
    /// other message type.
    pub fn decode(&self) -> Option<HotkeyEvent> {
        if !self.is_hotkey() {
            return None;
        }
        Some(HotkeyEvent {
            id: self.wparam as i32,
            key: VirtualKey(((self.lparam >> 16) & 0xFFFF) as u16),
            modifiers: Modifiers::from_bits_retain((self.lparam & 0xFFFF) as u32),
            cursor_x: self.pt_x,
            cursor_y: self.pt_y,
            time_ms: self.time,
        })
    }
}
