//! Hotkey registry - combination bookkeeping and message dispatch

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{HotkeyError, TeardownError};
use crate::hotkey::handle::HotkeyHandle;
use crate::hotkey::ids::IdAllocator;
use crate::hotkey::{ActionId, HotkeyEvent, KeyCombination, RawMessage};
use crate::keys::{Modifiers, VirtualKey};
use crate::platform::RegistrationBackend;

/// Both lookup structures plus the allocator, guarded as one unit so a
/// partially applied registration is never observable: every id in
/// `live_ids` belongs to exactly one handle in `hotkeys` and vice versa.
struct Inner {
    hotkeys: HashMap<KeyCombination, Arc<HotkeyHandle>>,
    live_ids: HashSet<i32>,
    ids: IdAllocator,
}

/// Registry of global hotkeys.
///
/// Owns the mapping from [`KeyCombination`] to its live OS registration
/// and the set of ids backing them. Constructed explicitly and owned by
/// the host; "one per process" is a deployment choice, not enforced
/// here. [`dispatch`] is meant to run on the host's message pump thread,
/// once per incoming message; the other operations may be called from
/// any thread.
///
/// [`dispatch`]: HotkeyRegistry::dispatch
pub struct HotkeyRegistry {
    backend: Arc<dyn RegistrationBackend>,
    inner: Mutex<Inner>,
}

impl HotkeyRegistry {
    pub fn new(backend: Arc<dyn RegistrationBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                hotkeys: HashMap::new(),
                live_ids: HashSet::new(),
                ids: IdAllocator::new(),
            }),
        }
    }

    /// Register `key` + `modifiers` globally and subscribe `action` to
    /// it. The modifiers reach the OS as given (NOREPEAT included);
    /// lookup uses the normalized combination, so a combination differing
    /// only in NOREPEAT counts as already registered.
    ///
    /// Fails with [`HotkeyError::AlreadyRegistered`] without side
    /// effects if the normalized combination is taken, and with
    /// [`HotkeyError::RegistrationFailed`] if the OS refuses - in that
    /// case no registry state changes either.
    pub fn register(
        &self,
        key: VirtualKey,
        modifiers: Modifiers,
        action: impl Fn(&HotkeyEvent) + Send + Sync + 'static,
    ) -> Result<ActionId, HotkeyError> {
        let combination = KeyCombination::new(key, modifiers);
        let mut inner = self.lock();

        if inner.hotkeys.contains_key(&combination) {
            log::warn!("Failed to register hotkey: {} is already registered", combination);
            return Err(HotkeyError::AlreadyRegistered(combination));
        }

        let id = inner.ids.next()?;
        let handle = HotkeyHandle::register(Arc::clone(&self.backend), key, modifiers, id)
            .map_err(|e| {
                log::warn!("Failed to register hotkey: {}", e);
                e
            })?;
        let action_id = handle.subscribe(Arc::new(action));

        inner.hotkeys.insert(combination, Arc::new(handle));
        inner.live_ids.insert(id);
        log::info!("Registered hotkey {} (id {})", combination, id);

        Ok(action_id)
    }

    /// Unregister the combination and release its OS registration.
    ///
    /// If the OS release fails the entry stays live (and its id stays
    /// reserved) so the caller can retry; the failure is surfaced, never
    /// swallowed.
    pub fn unregister(&self, key: VirtualKey, modifiers: Modifiers) -> Result<(), HotkeyError> {
        let combination = KeyCombination::new(key, modifiers);
        let mut inner = self.lock();

        let handle = inner
            .hotkeys
            .get(&combination)
            .ok_or(HotkeyError::NotRegistered(combination))?;

        handle.release().map_err(|e| {
            log::warn!("Failed to unregister hotkey: {}", e);
            e
        })?;

        let id = handle.id();
        inner.hotkeys.remove(&combination);
        inner.live_ids.remove(&id);
        log::info!("Unregistered hotkey {} (id {})", combination, id);
        Ok(())
    }

    /// Release every registration and clear the registry. Best-effort:
    /// a failing release does not stop the remaining ones; whatever
    /// failed comes back aggregated in [`TeardownError`].
    pub fn unregister_all(&self) -> Result<(), TeardownError> {
        let mut inner = self.lock();

        let mut failures = Vec::new();
        for (combination, handle) in inner.hotkeys.drain() {
            if let Err(e) = handle.release() {
                log::warn!("Teardown: {}", e);
                failures.push((combination, e));
            }
        }
        inner.live_ids.clear();

        if failures.is_empty() {
            log::info!("Unregistered all hotkeys");
            Ok(())
        } else {
            Err(TeardownError { failures })
        }
    }

    /// Subscribe an additional action to an already registered
    /// combination. Actions fire in subscription order.
    pub fn add_action(
        &self,
        key: VirtualKey,
        modifiers: Modifiers,
        action: impl Fn(&HotkeyEvent) + Send + Sync + 'static,
    ) -> Result<ActionId, HotkeyError> {
        let combination = KeyCombination::new(key, modifiers);
        let inner = self.lock();

        let handle = inner
            .hotkeys
            .get(&combination)
            .ok_or(HotkeyError::NotRegistered(combination))?;
        Ok(handle.subscribe(Arc::new(action)))
    }

    /// Remove a previously subscribed action. Fails only if the
    /// combination itself is not registered; an unknown token on a live
    /// combination is a no-op.
    pub fn remove_action(
        &self,
        key: VirtualKey,
        modifiers: Modifiers,
        action: ActionId,
    ) -> Result<(), HotkeyError> {
        let combination = KeyCombination::new(key, modifiers);
        let inner = self.lock();

        let handle = inner
            .hotkeys
            .get(&combination)
            .ok_or(HotkeyError::NotRegistered(combination))?;
        if !handle.unsubscribe(action) {
            log::debug!("remove_action: no action {:?} on {}", action, combination);
        }
        Ok(())
    }

    /// Whether the normalized combination is free to register.
    pub fn is_available(&self, key: VirtualKey, modifiers: Modifiers) -> bool {
        let combination = KeyCombination::new(key, modifiers);
        !self.lock().hotkeys.contains_key(&combination)
    }

    /// Point-in-time snapshot of the registered combinations. Order is
    /// unspecified; the returned list never reflects mutation happening
    /// after the call.
    pub fn list_active(&self) -> Vec<KeyCombination> {
        self.lock().hotkeys.keys().copied().collect()
    }

    /// Route one raw pump message. Returns whether the message was a
    /// hotkey press for a live registration (the only case a host should
    /// mark the message handled).
    ///
    /// Non-hotkey messages are ignored. A hotkey message for a
    /// combination no longer tracked is routine - a press can be in
    /// flight while the combination is unregistered - and stays silent.
    pub fn dispatch(&self, message: &RawMessage) -> bool {
        let Some(event) = message.decode() else {
            return false;
        };
        let combination = KeyCombination::new(event.key, event.modifiers);

        // Clone the handle out of the lock so actions can call back into
        // the registry without deadlocking the pump thread.
        let handle = { self.lock().hotkeys.get(&combination).map(Arc::clone) };

        match handle {
            Some(handle) => {
                log::trace!("Dispatching hotkey {} (id {})", combination, event.id);
                handle.notify(&event);
                true
            }
            None => {
                // Benign race between a press in flight and unregister.
                log::trace!("Ignoring hotkey message for unknown {}", combination);
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Recover from poisoning: the maps are only ever mutated to a
        // consistent state before the lock is dropped.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
