//! Global hotkey registration and dispatch for Windows.
//!
//! Register a key+modifier combination system-wide, then feed the host's
//! message pump through [`HotkeyRegistry::dispatch`] to get callbacks
//! whenever the combination is pressed, regardless of window focus.

pub mod error;
pub mod hotkey;
pub mod keys;
pub mod platform;

pub use error::{HotkeyError, TeardownError};
pub use hotkey::{ActionId, HotkeyEvent, HotkeyRegistry, KeyCombination, RawMessage, WM_HOTKEY};
pub use keys::{HotkeySpec, Modifiers, ParseHotkeyError, VirtualKey};
