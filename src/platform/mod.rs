//! OS registration facade
//!
//! The registry talks to the OS through [`RegistrationBackend`], a
//! two-operation seam: register a combination under a numeric id,
//! unregister by id. The one real implementation wraps the Win32 calls;
//! tests inject their own. This is a testability seam, not a
//! cross-platform abstraction.

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use windows::{find_window_by_title, list_window_titles, run_message_pump, WindowsBackend};

use crate::keys::{Modifiers, VirtualKey};

/// The OS-level hotkey registration surface.
///
/// Both operations are synchronous and either succeed or fail
/// immediately. The error `String` carries the platform's last-error
/// text verbatim so callers can log or display it.
pub trait RegistrationBackend: Send + Sync {
    fn register(&self, id: i32, modifiers: Modifiers, key: VirtualKey) -> Result<(), String>;

    fn unregister(&self, id: i32) -> Result<(), String>;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::RegistrationBackend;
    use crate::keys::{Modifiers, VirtualKey};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Op {
        Register {
            id: i32,
            modifiers: Modifiers,
            key: VirtualKey,
        },
        Unregister {
            id: i32,
        },
    }

    /// Records every facade call and fails on demand.
    #[derive(Default)]
    pub(crate) struct MockBackend {
        pub(crate) ops: Mutex<Vec<Op>>,
        pub(crate) fail_register: AtomicBool,
        pub(crate) fail_unregister: AtomicBool,
    }

    impl MockBackend {
        pub(crate) fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }

        pub(crate) fn set_fail_register(&self, fail: bool) {
            self.fail_register.store(fail, Ordering::SeqCst);
        }

        pub(crate) fn set_fail_unregister(&self, fail: bool) {
            self.fail_unregister.store(fail, Ordering::SeqCst);
        }

        pub(crate) fn unregistered_ids(&self) -> Vec<i32> {
            self.ops()
                .into_iter()
                .filter_map(|op| match op {
                    Op::Unregister { id } => Some(id),
                    _ => None,
                })
                .collect()
        }
    }

    impl RegistrationBackend for MockBackend {
        fn register(&self, id: i32, modifiers: Modifiers, key: VirtualKey) -> Result<(), String> {
            if self.fail_register.load(Ordering::SeqCst) {
                return Err("Hot key is already registered.".to_string());
            }
            self.ops.lock().unwrap().push(Op::Register { id, modifiers, key });
            Ok(())
        }

        fn unregister(&self, id: i32) -> Result<(), String> {
            if self.fail_unregister.load(Ordering::SeqCst) {
                return Err("Hot key is not registered.".to_string());
            }
            self.ops.lock().unwrap().push(Op::Unregister { id });
            Ok(())
        }
    }
}
