//! Virtual key codes and modifier flags
//!
//! Values match the Win32 conventions: `VirtualKey` wraps a VK_* code and
//! `Modifiers` wraps the MOD_* bits passed to RegisterHotKey.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bitflags! {
    /// Modifier keys for a hotkey combination.
    ///
    /// `NOREPEAT` is not a key: it only changes OS auto-repeat behavior at
    /// registration time and never participates in combination identity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const ALT = 0x0001;
        const CONTROL = 0x0002;
        const SHIFT = 0x0004;
        const WIN = 0x0008;
        const NOREPEAT = 0x4000;
    }
}

impl Modifiers {
    /// Bits that distinguish one combination from another.
    const SEMANTIC_BITS: u32 = 0x000F;

    /// Strip the NOREPEAT bit, keeping only the semantically meaningful
    /// modifiers. Registry lookups always go through this.
    pub fn normalized(self) -> Self {
        Self::from_bits_retain(self.bits() & Self::SEMANTIC_BITS)
    }

    /// Parse a single modifier name, as used in specs like "ctrl+alt+k".
    ///
    /// Named `from_spec_name` to avoid colliding with the `from_name`
    /// method that the `bitflags!` macro generates.
    pub fn from_spec_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::CONTROL),
            "alt" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "win" | "super" | "meta" => Some(Self::WIN),
            "norepeat" => Some(Self::NOREPEAT),
            _ => None,
        }
    }
}

// Serialized as the raw MOD_* bits, matching what the OS call takes.
impl Serialize for Modifiers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_bits_retain)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.contains(Self::CONTROL) {
            parts.push("Ctrl");
        }
        if self.contains(Self::ALT) {
            parts.push("Alt");
        }
        if self.contains(Self::SHIFT) {
            parts.push("Shift");
        }
        if self.contains(Self::WIN) {
            parts.push("Win");
        }
        if self.contains(Self::NOREPEAT) {
            parts.push("NoRepeat");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A Win32 virtual key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualKey(pub u16);

#[rustfmt::skip]
impl VirtualKey {
    pub const BACKSPACE: Self = Self(0x08);
    pub const TAB: Self = Self(0x09);
    pub const RETURN: Self = Self(0x0D);
    pub const PAUSE: Self = Self(0x13);
    pub const ESCAPE: Self = Self(0x1B);
    pub const SPACE: Self = Self(0x20);
    pub const PAGE_UP: Self = Self(0x21);
    pub const PAGE_DOWN: Self = Self(0x22);
    pub const END: Self = Self(0x23);
    pub const HOME: Self = Self(0x24);
    pub const LEFT: Self = Self(0x25);
    pub const UP: Self = Self(0x26);
    pub const RIGHT: Self = Self(0x27);
    pub const DOWN: Self = Self(0x28);
    pub const PRINT_SCREEN: Self = Self(0x2C);
    pub const INSERT: Self = Self(0x2D);
    pub const DELETE: Self = Self(0x2E);
}

impl VirtualKey {
    /// Parse a key name: a single letter or digit, "f1".."f24", or one of
    /// the named keys above.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();

        // Single letter or digit maps straight onto its VK code
        // ('a'..'z' -> 0x41..0x5A, '0'..'9' -> 0x30..0x39).
        if lower.len() == 1 {
            let c = lower.chars().next()?;
            if c.is_ascii_lowercase() {
                return Some(Self(c as u16 - b'a' as u16 + 0x41));
            }
            if c.is_ascii_digit() {
                return Some(Self(c as u16));
            }
        }

        // Function keys: VK_F1 = 0x70.
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u16>().ok()) {
            if (1..=24).contains(&n) {
                return Some(Self(0x70 + n - 1));
            }
        }

        match lower.as_str() {
            "backspace" => Some(Self::BACKSPACE),
            "tab" => Some(Self::TAB),
            "return" | "enter" => Some(Self::RETURN),
            "pause" => Some(Self::PAUSE),
            "escape" | "esc" => Some(Self::ESCAPE),
            "space" => Some(Self::SPACE),
            "pageup" => Some(Self::PAGE_UP),
            "pagedown" => Some(Self::PAGE_DOWN),
            "end" => Some(Self::END),
            "home" => Some(Self::HOME),
            "left" => Some(Self::LEFT),
            "up" => Some(Self::UP),
            "right" => Some(Self::RIGHT),
            "down" => Some(Self::DOWN),
            "printscreen" => Some(Self::PRINT_SCREEN),
            "insert" => Some(Self::INSERT),
            "delete" | "del" => Some(Self::DELETE),
            _ => None,
        }
    }

    /// The raw code passed to the OS registration call.
    pub fn code(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0x30..=0x39 | 0x41..=0x5A => write!(f, "{}", self.0 as u8 as char),
            0x70..=0x87 => write!(f, "F{}", self.0 - 0x70 + 1),
            0x08 => write!(f, "Backspace"),
            0x09 => write!(f, "Tab"),
            0x0D => write!(f, "Return"),
            0x13 => write!(f, "Pause"),
            0x1B => write!(f, "Escape"),
            0x20 => write!(f, "Space"),
            0x21 => write!(f, "PageUp"),
            0x22 => write!(f, "PageDown"),
            0x23 => write!(f, "End"),
            0x24 => write!(f, "Home"),
            0x25 => write!(f, "Left"),
            0x26 => write!(f, "Up"),
            0x27 => write!(f, "Right"),
            0x28 => write!(f, "Down"),
            0x2C => write!(f, "PrintScreen"),
            0x2D => write!(f, "Insert"),
            0x2E => write!(f, "Delete"),
            code => write!(f, "0x{:02X}", code),
        }
    }
}

/// Errors from parsing a textual hotkey spec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHotkeyError {
    #[error("empty hotkey spec")]
    Empty,
    #[error("unknown key or modifier name: {0:?}")]
    UnknownName(String),
    #[error("hotkey spec {0:?} names no key, only modifiers")]
    MissingKey(String),
    #[error("hotkey spec {0:?} names more than one key")]
    MultipleKeys(String),
}

/// A key plus modifiers as written by the user, e.g. "ctrl+alt+k".
///
/// Unlike [`KeyCombination`](crate::hotkey::KeyCombination) this keeps the
/// NOREPEAT bit if the spec asked for it, so it can be handed to
/// registration as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeySpec {
    pub key: VirtualKey,
    pub modifiers: Modifiers,
}

impl FromStr for HotkeySpec {
    type Err = ParseHotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseHotkeyError::Empty);
        }

        let mut modifiers = Modifiers::empty();
        let mut key: Option<VirtualKey> = None;

        for part in trimmed.split('+').map(str::trim) {
            if let Some(m) = Modifiers::from_spec_name(part) {
                modifiers |= m;
            } else if let Some(k) = VirtualKey::from_name(part) {
                if key.replace(k).is_some() {
                    return Err(ParseHotkeyError::MultipleKeys(s.to_string()));
                }
            } else {
                return Err(ParseHotkeyError::UnknownName(part.to_string()));
            }
        }

        match key {
            Some(key) => Ok(Self { key, modifiers }),
            None => Err(ParseHotkeyError::MissingKey(s.to_string())),
        }
    }
}

impl fmt::Display for HotkeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}
