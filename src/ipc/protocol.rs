//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::{InputEvent, StateEvent};
use crate::i18n::Language;
use crate::inject::MouseButton;
use crate::state::{DispatchError, HoldStatus};

/// Largest frame a peer may send
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Requests from UI to daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Ping to check connectivity
    Ping,

    /// Request the status readout
    GetStatus,

    /// Press or release, same as the hotkey
    Toggle,

    /// Change the button used by the next press
    SelectButton { button: MouseButton },

    /// Hotkey checkbox
    SetHotkey { enabled: bool },

    /// Switch display language
    SetLanguage { language: Language },

    /// Subscribe to state change notifications
    Subscribe,

    /// Release everything and exit
    Shutdown,
}

impl Request {
    /// The dispatcher event for this request; `None` when the server answers alone
    pub fn input_event(&self) -> Option<InputEvent> {
        match *self {
            Request::Ping | Request::Subscribe => None,
            Request::GetStatus => Some(InputEvent::StatusRequested),
            Request::Toggle => Some(InputEvent::UserToggleRequested),
            Request::SelectButton { button } => Some(InputEvent::ButtonSelectionChanged(button)),
            Request::SetHotkey { enabled } => Some(InputEvent::HotkeyEnableRequested(enabled)),
            Request::SetLanguage { language } => Some(InputEvent::LanguageChanged(language)),
            Request::Shutdown => Some(InputEvent::ShutdownRequested),
        }
    }
}

/// Responses from daemon to UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Pong response to ping
    Pong,

    /// Status after the request was applied
    Status(HoldStatus),

    /// Subscription confirmed
    Subscribed,

    /// Final status; the daemon exits after sending this
    ShuttingDown(HoldStatus),

    /// Error response
    Error { code: String, message: String },
}

impl Response {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Response::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<DispatchError> for Response {
    fn from(err: DispatchError) -> Self {
        Response::error(err.code(), err.to_string())
    }
}

/// Push notification from daemon to UI (for subscribed clients)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// State event occurred
    StateChanged { event: StateEvent },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SelectButton {
            button: MouseButton::Right,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("select_button"));
        assert!(json.contains("right"));
    }

    #[test]
    fn test_request_deserialization() {
        let req: Request = serde_json::from_str(r#"{"type":"set_language","language":"ru"}"#).unwrap();
        assert_eq!(
            req,
            Request::SetLanguage {
                language: Language::Russian
            }
        );
        assert_eq!(
            req.input_event(),
            Some(InputEvent::LanguageChanged(Language::Russian))
        );
    }

    #[test]
    fn test_local_requests_have_no_event() {
        assert_eq!(Request::Ping.input_event(), None);
        assert_eq!(Request::Subscribe.input_event(), None);
        assert_eq!(
            Request::SetHotkey { enabled: false }.input_event(),
            Some(InputEvent::HotkeyEnableRequested(false))
        );
    }

    #[test]
    fn test_error_response_serialization() {
        let resp = Response::error("hotkey_registration_failed", "Failed to register hotkey F6.");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains("hotkey_registration_failed"));
    }

    #[test]
    fn test_notification_serialization() {
        let note = Notification::StateChanged {
            event: StateEvent::HoldStarted {
                button: MouseButton::Left,
            },
        };
        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("state_changed"));
        assert!(json.contains("hold_started"));
    }
}
