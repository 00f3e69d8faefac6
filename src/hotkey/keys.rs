//! Hotkey definition and modifier tracking
//!
//! The daemon binds exactly one key: F6 with no modifiers. A press only
//! counts when every modifier is released.

/// A single global key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    /// Registration id
    pub id: u32,
    /// Human readable key name, shown in labels and errors
    pub name: &'static str,
    /// macOS virtual key code (kVK_F6)
    pub mac_keycode: u16,
    /// Windows virtual key code (VK_F6)
    pub win_vk: u16,
}

/// The toggle binding
pub const TOGGLE_HOTKEY: Hotkey = Hotkey {
    id: 0x100,
    name: "F6",
    mac_keycode: 97,
    win_vk: 0x75,
};

#[cfg(target_os = "macos")]
pub mod flags {
    use core_graphics::event::CGEventFlags;

    pub const CONTROL: CGEventFlags = CGEventFlags::CGEventFlagControl;
    pub const OPTION: CGEventFlags = CGEventFlags::CGEventFlagAlternate;
    pub const COMMAND: CGEventFlags = CGEventFlags::CGEventFlagCommand;
    pub const SHIFT: CGEventFlags = CGEventFlags::CGEventFlagShift;
}

/// Which modifier keys were down when a key event arrived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    pub control: bool,
    pub option: bool,
    pub command: bool,
    pub shift: bool,
}

impl ModifierState {
    #[cfg(target_os = "macos")]
    pub fn from_flags(event_flags: core_graphics::event::CGEventFlags) -> Self {
        Self {
            control: event_flags.contains(flags::CONTROL),
            option: event_flags.contains(flags::OPTION),
            command: event_flags.contains(flags::COMMAND),
            shift: event_flags.contains(flags::SHIFT),
        }
    }

    /// Check if all modifiers are released
    pub fn is_empty(&self) -> bool {
        !self.control && !self.option && !self.command && !self.shift
    }
}

impl Hotkey {
    /// Whether a raw key press matches this binding
    pub fn matches(&self, keycode: u16, modifiers: ModifierState, autorepeat: bool) -> bool {
        keycode == self.mac_keycode && modifiers.is_empty() && !autorepeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state() {
        let state = ModifierState::default();
        assert!(state.is_empty());
    }

    #[test]
    fn test_shift_is_a_modifier() {
        let state = ModifierState {
            shift: true,
            ..Default::default()
        };
        assert!(!state.is_empty());
    }

    #[test]
    fn test_toggle_binding_key_codes() {
        assert_eq!(TOGGLE_HOTKEY.name, "F6");
        assert_eq!(TOGGLE_HOTKEY.mac_keycode, 97);
        assert_eq!(TOGGLE_HOTKEY.win_vk, 0x75);
    }

    #[test]
    fn test_plain_f6_matches() {
        assert!(TOGGLE_HOTKEY.matches(97, ModifierState::default(), false));
    }

    #[test]
    fn test_modified_or_repeated_f6_does_not_match() {
        let control = ModifierState {
            control: true,
            ..Default::default()
        };
        assert!(!TOGGLE_HOTKEY.matches(97, control, false));
        assert!(!TOGGLE_HOTKEY.matches(97, ModifierState::default(), true));
        assert!(!TOGGLE_HOTKEY.matches(96, ModifierState::default(), false));
    }
}
