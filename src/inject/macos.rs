//! Mouse injection through Quartz event services

use core_graphics::event::{CGEvent, CGEventTapLocation, CGEventType, CGMouseButton};
use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};
use tracing::trace;

use super::{Direction, InjectError, MouseButton, MouseInjector};

/// Posts button events at the current cursor position on the HID tap
#[derive(Debug, Default)]
pub struct CgMouseInjector;

impl CgMouseInjector {
    pub fn new() -> Self {
        Self
    }
}

impl MouseInjector for CgMouseInjector {
    fn inject(&mut self, button: MouseButton, direction: Direction) -> Result<(), InjectError> {
        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| InjectError::EventSource)?;

        // A null event carries the live cursor location
        let position = CGEvent::new(source.clone())
            .map_err(|_| InjectError::EventSource)?
            .location();

        let (event_type, cg_button) = match (button, direction) {
            (MouseButton::Left, Direction::Down) => (CGEventType::LeftMouseDown, CGMouseButton::Left),
            (MouseButton::Left, Direction::Up) => (CGEventType::LeftMouseUp, CGMouseButton::Left),
            (MouseButton::Right, Direction::Down) => (CGEventType::RightMouseDown, CGMouseButton::Right),
            (MouseButton::Right, Direction::Up) => (CGEventType::RightMouseUp, CGMouseButton::Right),
        };

        let event = CGEvent::new_mouse_event(source, event_type, position, cg_button)
            .map_err(|_| InjectError::EventCreation { button, direction })?;
        event.post(CGEventTapLocation::HID);

        trace!(%button, %direction, x = position.x, y = position.y, "mouse event posted");
        Ok(())
    }
}
