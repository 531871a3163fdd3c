//! Error types for registry operations

use thiserror::Error;

use crate::hotkey::KeyCombination;

/// Failures surfaced by the hotkey registry.
///
/// OS-level failures carry the platform's last-error text verbatim in
/// `reason`; the registry never interprets or retries them.
#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("hotkey {0} is already registered")]
    AlreadyRegistered(KeyCombination),

    #[error("hotkey {0} is not registered")]
    NotRegistered(KeyCombination),

    #[error("failed to register hotkey {combination}: {reason}")]
    RegistrationFailed {
        combination: KeyCombination,
        reason: String,
    },

    #[error("failed to unregister hotkey {combination}: {reason}")]
    UnregisterFailed {
        combination: KeyCombination,
        reason: String,
    },

    #[error("hotkey id space exhausted")]
    IdsExhausted,
}

/// Aggregate of per-entry release failures from
/// [`HotkeyRegistry::unregister_all`](crate::hotkey::HotkeyRegistry::unregister_all).
///
/// Teardown is best-effort: every entry is released regardless of earlier
/// failures, and whatever failed is collected here.
#[derive(Debug, Error)]
#[error("failed to release {} hotkey registration(s) during teardown", failures.len())]
pub struct TeardownError {
    pub failures: Vec<(KeyCombination, HotkeyError)>,
}
