//! Global hotkey registration
//!
//! On macOS a CGEventTap watches key presses for the toggle binding; on
//! Windows the key is registered with RegisterHotKey. Either way each match
//! is forwarded to the dispatcher.

mod keys;
mod listener;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod win32;

pub use keys::{Hotkey, TOGGLE_HOTKEY};
pub use listener::{HotkeyBackend, HotkeyBinding};
#[cfg(target_os = "macos")]
pub use macos::EventTapBackend as PlatformHotkeyBackend;
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub use unsupported::UnsupportedHotkeyBackend as PlatformHotkeyBackend;
#[cfg(target_os = "windows")]
pub use win32::MessageLoopBackend as PlatformHotkeyBackend;

#[cfg(test)]
pub(crate) use listener::testing;
