//! Events flowing into and out of the dispatcher
//!
//! [`InputEvent`]s are the only way to change daemon state. They arrive
//! from the hotkey backend and IPC clients, all through one channel. OS
//! signals are handled in `main` and never pass through it.
//! [`StateEvent`]s are broadcast after each change.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::i18n::Language;
use crate::inject::MouseButton;
use crate::state::{DispatchError, HoldStatus};

/// Something that asks the dispatcher to act
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Toggle action from the UI
    UserToggleRequested,
    /// The global hotkey fired
    HotkeyTriggered,
    /// Button selector changed
    ButtonSelectionChanged(MouseButton),
    /// Language switch pressed
    LanguageChanged(Language),
    /// Hotkey checkbox changed
    HotkeyEnableRequested(bool),
    /// Status readout, no state change
    StatusRequested,
    /// Application is closing
    ShutdownRequested,
}

/// Result handed back to whoever sent a request
pub type Reply = Result<HoldStatus, DispatchError>;

/// An input event plus an optional reply channel
#[derive(Debug)]
pub struct Envelope {
    pub event: InputEvent,
    pub reply: Option<oneshot::Sender<Reply>>,
}

impl Envelope {
    /// Fire-and-forget event (hotkey triggers)
    pub fn notify(event: InputEvent) -> Self {
        Self { event, reply: None }
    }

    /// Event whose outcome the sender waits for
    pub fn request(event: InputEvent) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                event,
                reply: Some(tx),
            },
            rx,
        )
    }
}

/// Sending half of the dispatcher channel
pub type EventSender = mpsc::Sender<Envelope>;

/// Events emitted by the dispatcher after a state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateEvent {
    /// Synthetic button-down injected
    HoldStarted { button: MouseButton },

    /// Synthetic button-up injected
    HoldReleased {
        button: MouseButton,
        /// How long the button was held
        duration_ms: u64,
    },

    /// Button selector changed
    ButtonSelected { button: MouseButton },

    /// Display language changed
    LanguageChanged { language: Language },

    /// Global hotkey registered
    HotkeyEnabled,

    /// Global hotkey unregistered
    HotkeyDisabled,

    /// Global hotkey could not be registered
    HotkeyRegistrationFailed {
        /// Localized message for the user
        message: String,
    },
}

impl std::fmt::Display for StateEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateEvent::HoldStarted { button } => write!(f, "HOLD_STARTED ({})", button),
            StateEvent::HoldReleased {
                button,
                duration_ms,
            } => write!(f, "HOLD_RELEASED ({}, {}ms)", button, duration_ms),
            StateEvent::ButtonSelected { button } => write!(f, "BUTTON_SELECTED ({})", button),
            StateEvent::LanguageChanged { language } => {
                write!(f, "LANGUAGE_CHANGED ({})", language.code())
            }
            StateEvent::HotkeyEnabled => write!(f, "HOTKEY_ENABLED"),
            StateEvent::HotkeyDisabled => write!(f, "HOTKEY_DISABLED"),
            StateEvent::HotkeyRegistrationFailed { .. } => write!(f, "HOTKEY_REGISTRATION_FAILED"),
        }
    }
}
