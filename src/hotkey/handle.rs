//! Hotkey handle - owns one live OS registration and its subscribers

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::HotkeyError;
use crate::hotkey::{HotkeyEvent, KeyCombination};
use crate::keys::{Modifiers, VirtualKey};
use crate::platform::RegistrationBackend;

/// Token identifying one subscribed action, handed back by
/// [`HotkeyRegistry::register`](crate::hotkey::HotkeyRegistry::register)
/// and `add_action`. Closures have no identity in Rust, so removal goes
/// through the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(u64);

type Action = Arc<dyn Fn(&HotkeyEvent) + Send + Sync>;

/// Owner of exactly one successful OS registration.
///
/// Created only by the registry after the facade accepted the
/// registration; releases it exactly once, either through [`release`]
/// (idempotent) or, as a last-resort net, on drop. Holds the subscribed
/// actions in subscription order.
///
/// [`release`]: HotkeyHandle::release
pub(crate) struct HotkeyHandle {
    id: i32,
    combination: KeyCombination,
    backend: Arc<dyn RegistrationBackend>,
    released: AtomicBool,
    next_action: AtomicU64,
    actions: Mutex<Vec<(ActionId, Action)>>,
}

// Manual impl: the backend and action fields are trait objects and
// closures, so `#[derive(Debug)]` cannot apply.
impl std::fmt::Debug for HotkeyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyHandle")
            .field("id", &self.id)
            .field("combination", &self.combination)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl HotkeyHandle {
    /// Register `key` + `modifiers` with the OS under `id` and wrap the
    /// result. The modifiers go to the facade as given (NOREPEAT
    /// included, it changes OS behavior); the stored combination is
    /// normalized. On facade failure nothing is created and the reason
    /// is propagated verbatim.
    pub(crate) fn register(
        backend: Arc<dyn RegistrationBackend>,
        key: VirtualKey,
        modifiers: Modifiers,
        id: i32,
    ) -> Result<Self, HotkeyError> {
        let combination = KeyCombination::new(key, modifiers);
        backend
            .register(id, modifiers, key)
            .map_err(|reason| HotkeyError::RegistrationFailed {
                combination,
                reason,
            })?;

        Ok(Self {
            id,
            combination,
            backend,
            released: AtomicBool::new(false),
            next_action: AtomicU64::new(0),
            actions: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn id(&self) -> i32 {
        self.id
    }

    pub(crate) fn combination(&self) -> KeyCombination {
        self.combination
    }

    /// Append an action; actions fire in subscription order.
    pub(crate) fn subscribe(&self, action: Action) -> ActionId {
        let id = ActionId(self.next_action.fetch_add(1, Ordering::Relaxed));
        self.lock_actions().push((id, action));
        id
    }

    /// Remove an action by token. Removing a token that is not present
    /// is a no-op; returns whether anything was removed.
    pub(crate) fn unsubscribe(&self, action: ActionId) -> bool {
        let mut actions = self.lock_actions();
        let before = actions.len();
        actions.retain(|(id, _)| *id != action);
        actions.len() != before
    }

    /// Invoke every subscribed action in order. A panicking action is
    /// caught and logged so the remaining actions still run.
    pub(crate) fn notify(&self, event: &HotkeyEvent) {
        // Snapshot so actions may re-enter the registry (and this handle)
        // without deadlocking on the actions lock.
        let actions: Vec<Action> = self
            .lock_actions()
            .iter()
            .map(|(_, action)| Arc::clone(action))
            .collect();

        for action in actions {
            if catch_unwind(AssertUnwindSafe(|| action(event))).is_err() {
                log::error!("Hotkey action for {} panicked", self.combination);
            }
        }
    }

    /// Release the OS registration. The first call goes to the facade;
    /// later calls are no-ops returning success. A facade failure
    /// re-arms the handle so release can be retried, and surfaces the
    /// OS reason.
    pub(crate) fn release(&self) -> Result<(), HotkeyError> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Err(reason) = self.backend.unregister(self.id) {
            self.released.store(false, Ordering::SeqCst);
            return Err(HotkeyError::UnregisterFailed {
                combination: self.combination,
                reason,
            });
        }
        Ok(())
    }

    fn lock_actions(&self) -> std::sync::MutexGuard<'_, Vec<(ActionId, Action)>> {
        // A panic inside an action never happens while holding the lock
        // (notify snapshots first), so poisoning can only come from a
        // panicking caller thread; the list itself stays consistent.
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HotkeyHandle {
    fn drop(&mut self) {
        // Safety net for abnormal teardown: without this a skipped
        // release would leave the combination globally captured by a
        // dead registration until process exit.
        if !self.released.load(Ordering::SeqCst) {
            if let Err(reason) = self.backend.unregister(self.id) {
                log::warn!(
                    "Failed to release hotkey {} (id {}) on drop: {}",
                    self.combination,
                    self.id,
                    reason
                );
            } else {
                log::debug!(
                    "Released hotkey {} (id {}) via drop fallback",
                    self.combination,
                    self.id
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::platform::mock::{MockBackend, Op};

    fn event() -> HotkeyEvent {
        HotkeyEvent {
            id: 1,
            key: VirtualKey(0x41),
            modifiers: Modifiers::CONTROL,
            cursor_x: 0,
            cursor_y: 0,
            time_ms: 0,
        }
    }

    fn handle(backend: &Arc<MockBackend>) -> HotkeyHandle {
        HotkeyHandle::register(
            backend.clone() as Arc<dyn RegistrationBackend>,
            VirtualKey(0x41),
            Modifiers::CONTROL,
            1,
        )
        .unwrap()
    }

    #[test]
    fn test_register_passes_raw_modifiers_to_facade() {
        let backend = Arc::new(MockBackend::default());
        let h = HotkeyHandle::register(
            backend.clone() as Arc<dyn RegistrationBackend>,
            VirtualKey(0x41),
            Modifiers::CONTROL | Modifiers::NOREPEAT,
            7,
        )
        .unwrap();

        // The OS call keeps NOREPEAT; the stored combination drops it.
        assert_eq!(
            backend.ops(),
            vec![Op::Register {
                id: 7,
                modifiers: Modifiers::CONTROL | Modifiers::NOREPEAT,
                key: VirtualKey(0x41),
            }]
        );
        assert_eq!(
            h.combination(),
            KeyCombination::new(VirtualKey(0x41), Modifiers::CONTROL)
        );
        let _ = h.release();
    }

    #[test]
    fn test_register_failure_carries_facade_reason() {
        let backend = Arc::new(MockBackend::default());
        backend.set_fail_register(true);
        let err = HotkeyHandle::register(
            backend as Arc<dyn RegistrationBackend>,
            VirtualKey(0x41),
            Modifiers::empty(),
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HotkeyError::RegistrationFailed { ref reason, .. }
                if reason.as_str() == "Hot key is already registered."
        ));
    }

    #[test]
    fn test_release_is_idempotent() {
        let backend = Arc::new(MockBackend::default());
        let h = handle(&backend);
        h.release().unwrap();
        h.release().unwrap();
        drop(h);
        // One register, exactly one unregister - drop must not double-free.
        assert_eq!(backend.unregistered_ids(), vec![1]);
    }

    #[test]
    fn test_failed_release_can_be_retried() {
        let backend = Arc::new(MockBackend::default());
        let h = handle(&backend);

        backend.set_fail_unregister(true);
        assert!(matches!(
            h.release(),
            Err(HotkeyError::UnregisterFailed { .. })
        ));

        backend.set_fail_unregister(false);
        h.release().unwrap();
        assert_eq!(backend.unregistered_ids(), vec![1]);
    }

    #[test]
    fn test_drop_releases_unreleased_registration() {
        let backend = Arc::new(MockBackend::default());
        let h = handle(&backend);
        drop(h);
        assert_eq!(backend.unregistered_ids(), vec![1]);
    }

    #[test]
    fn test_notify_runs_actions_in_subscription_order() {
        let backend = Arc::new(MockBackend::default());
        let h = handle(&backend);

        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            h.subscribe(Arc::new(move |_e| seen.lock().unwrap().push(tag)));
        }

        h.notify(&event());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_panicking_action_does_not_suppress_others() {
        let backend = Arc::new(MockBackend::default());
        let h = handle(&backend);

        let seen = Arc::new(Mutex::new(Vec::new()));
        h.subscribe(Arc::new(|_e| panic!("subscriber bug")));
        let seen2 = seen.clone();
        h.subscribe(Arc::new(move |_e| seen2.lock().unwrap().push("survivor")));

        h.notify(&event());
        assert_eq!(*seen.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn test_unsubscribe_unknown_token_is_noop() {
        let backend = Arc::new(MockBackend::default());
        let h = handle(&backend);
        let id = h.subscribe(Arc::new(|_e| {}));
        assert!(h.unsubscribe(id));
        assert!(!h.unsubscribe(id));
    }
}
