//! Synthetic mouse button injection
//!
//! The hold controller only ever talks to a [`MouseInjector`]. The platform
//! backend posts real OS events; tests substitute a recorder.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod win32;

use serde::{Deserialize, Serialize};

#[cfg(target_os = "macos")]
pub use macos::CgMouseInjector as PlatformInjector;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use unsupported::UnsupportedInjector as PlatformInjector;
#[cfg(target_os = "windows")]
pub use win32::SendInputInjector as PlatformInjector;

/// Which mouse button is held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
}

impl MouseButton {
    /// Index used by the settings store and the button selector (0 = left, 1 = right)
    pub fn index(self) -> u8 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
        }
    }
}

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Down,
    Up,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
        }
    }
}

/// Errors reported by an injection backend
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("failed to create event source")]
    EventSource,

    #[error("failed to create {direction} event for {button} button")]
    EventCreation {
        button: MouseButton,
        direction: Direction,
    },

    #[error("mouse injection is not supported on this platform")]
    Unsupported,
}

/// Posts synthetic button events to the OS
///
/// Calls are short and synchronous. Callers treat them as fire-and-forget.
pub trait MouseInjector {
    fn inject(&mut self, button: MouseButton, direction: Direction) -> Result<(), InjectError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_index_mapping() {
        assert_eq!(MouseButton::Left.index(), 0);
        assert_eq!(MouseButton::Right.index(), 1);
        assert_eq!(MouseButton::from_index(1), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_index(2), None);
    }

    #[test]
    fn test_button_serialization() {
        let json = serde_json::to_string(&MouseButton::Right).unwrap();
        assert_eq!(json, "\"right\"");
    }
}
