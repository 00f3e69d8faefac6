//! Fallback for platforms without a hotkey backend

use tracing::debug;

use crate::events::EventSender;

use super::keys::Hotkey;
use super::listener::{HotkeyBackend, HotkeyError};

/// Registration always fails, which the UI reports like any other refusal
pub struct UnsupportedHotkeyBackend {
    _event_tx: EventSender,
}

impl UnsupportedHotkeyBackend {
    pub fn new(event_tx: EventSender) -> Self {
        Self {
            _event_tx: event_tx,
        }
    }
}

impl HotkeyBackend for UnsupportedHotkeyBackend {
    fn register(&mut self, hotkey: Hotkey) -> Result<(), HotkeyError> {
        debug!(hotkey = hotkey.name, "no hotkey backend on this platform");
        Err(HotkeyError::Unsupported)
    }

    fn unregister(&mut self) -> Result<(), HotkeyError> {
        Ok(())
    }
}
