//! Hotkey binding lifecycle
//!
//! [`HotkeyBinding`] tracks whether the single toggle binding is active and
//! hands registration to a platform [`HotkeyBackend`]. Triggers are delivered
//! by the backend straight into the dispatcher channel.

use tracing::{info, warn};

use crate::lifecycle::BestEffort;

use super::keys::Hotkey;

/// Errors that can occur while registering the global hotkey
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("hotkey {0} is already registered")]
    AlreadyRegistered(&'static str),

    #[cfg(target_os = "macos")]
    #[error("failed to create event tap - check Accessibility permissions")]
    EventTapCreation,

    #[cfg(target_os = "macos")]
    #[error("failed to attach event tap to run loop")]
    RunLoopSource,

    #[cfg(target_os = "windows")]
    #[error("the system refused the hotkey: {0}")]
    Registration(String),

    #[cfg(target_os = "windows")]
    #[error("failed to stop hotkey listener: {0}")]
    Unregistration(String),

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("hotkey listener thread exited unexpectedly")]
    ListenerExited,

    #[error("global hotkeys are not supported on this platform")]
    Unsupported,
}

/// OS side of a global key binding
pub trait HotkeyBackend {
    /// Start delivering triggers for `hotkey`
    fn register(&mut self, hotkey: Hotkey) -> Result<(), HotkeyError>;

    /// Stop delivering triggers. Must be safe to call when nothing is registered.
    fn unregister(&mut self) -> Result<(), HotkeyError>;
}

/// The single toggle binding and its registered flag
pub struct HotkeyBinding<B: HotkeyBackend> {
    backend: B,
    hotkey: Hotkey,
    registered: bool,
}

impl<B: HotkeyBackend> HotkeyBinding<B> {
    pub fn new(backend: B, hotkey: Hotkey) -> Self {
        Self {
            backend,
            hotkey,
            registered: false,
        }
    }

    pub fn hotkey(&self) -> Hotkey {
        self.hotkey
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Register the binding. Already registered is a no-op success.
    ///
    /// On failure the binding stays inactive; there is no automatic retry.
    pub fn enable(&mut self) -> Result<(), HotkeyError> {
        if self.registered {
            return Ok(());
        }

        match self.backend.register(self.hotkey) {
            Ok(()) => {
                self.registered = true;
                info!(hotkey = self.hotkey.name, id = self.hotkey.id, "global hotkey registered");
                Ok(())
            }
            Err(e) => {
                warn!(hotkey = self.hotkey.name, error = %e, "global hotkey registration failed");
                Err(e)
            }
        }
    }

    /// Unregister the binding if active; failures are logged and swallowed
    pub fn disable(&mut self) -> BestEffort {
        if !self.registered {
            return BestEffort::Skipped;
        }

        self.registered = false;
        let outcome = BestEffort::from_result("unregister hotkey", self.backend.unregister());
        if outcome.is_completed() {
            info!(hotkey = self.hotkey.name, "global hotkey unregistered");
        }
        outcome
    }
}

impl<B: HotkeyBackend> Drop for HotkeyBinding<B> {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Debug, Default)]
    pub struct FakeState {
        pub active: usize,
        pub registrations: usize,
        pub unregistrations: usize,
        pub fail_register: bool,
        pub fail_unregister: bool,
    }

    /// In-memory backend; clones share state so tests can inspect it
    #[derive(Debug, Clone, Default)]
    pub struct FakeHotkeyBackend {
        pub state: Arc<Mutex<FakeState>>,
    }

    impl FakeHotkeyBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rejecting() -> Self {
            let backend = Self::default();
            backend.state.lock().unwrap().fail_register = true;
            backend
        }

        pub fn active(&self) -> usize {
            self.state.lock().unwrap().active
        }
    }

    impl HotkeyBackend for FakeHotkeyBackend {
        fn register(&mut self, hotkey: Hotkey) -> Result<(), HotkeyError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_register {
                return Err(HotkeyError::Unsupported);
            }
            if state.active > 0 {
                return Err(HotkeyError::AlreadyRegistered(hotkey.name));
            }
            state.active += 1;
            state.registrations += 1;
            Ok(())
        }

        fn unregister(&mut self) -> Result<(), HotkeyError> {
            let mut state = self.state.lock().unwrap();
            state.unregistrations += 1;
            state.active = state.active.saturating_sub(1);
            if state.fail_unregister {
                return Err(HotkeyError::ListenerExited);
            }
            Ok(())
        }
    }
}
