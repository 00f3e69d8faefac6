//! Mouse injection through SendInput

use std::mem;

use tracing::trace;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEINPUT, MOUSE_EVENT_FLAGS,
};

use super::{Direction, InjectError, MouseButton, MouseInjector};

/// Posts button events at the current cursor position
#[derive(Debug, Default)]
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        Self
    }
}

fn button_flags(button: MouseButton, direction: Direction) -> MOUSE_EVENT_FLAGS {
    match (button, direction) {
        (MouseButton::Left, Direction::Down) => MOUSEEVENTF_LEFTDOWN,
        (MouseButton::Left, Direction::Up) => MOUSEEVENTF_LEFTUP,
        (MouseButton::Right, Direction::Down) => MOUSEEVENTF_RIGHTDOWN,
        (MouseButton::Right, Direction::Up) => MOUSEEVENTF_RIGHTUP,
    }
}

impl MouseInjector for SendInputInjector {
    fn inject(&mut self, button: MouseButton, direction: Direction) -> Result<(), InjectError> {
        // No MOUSEEVENTF_MOVE: the event lands wherever the cursor is
        let input = [INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: button_flags(button, direction),
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        }];

        // Zero inserted means the input was blocked (UIPI or a secure desktop)
        let inserted = unsafe { SendInput(&input, mem::size_of::<INPUT>() as i32) };
        if inserted == 0 {
            return Err(InjectError::EventCreation { button, direction });
        }

        trace!(%button, %direction, "mouse input sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_button_and_direction_has_its_own_flag() {
        assert_eq!(button_flags(MouseButton::Left, Direction::Down), MOUSEEVENTF_LEFTDOWN);
        assert_eq!(button_flags(MouseButton::Left, Direction::Up), MOUSEEVENTF_LEFTUP);
        assert_eq!(button_flags(MouseButton::Right, Direction::Down), MOUSEEVENTF_RIGHTDOWN);
        assert_eq!(button_flags(MouseButton::Right, Direction::Up), MOUSEEVENTF_RIGHTUP);
    }
}
