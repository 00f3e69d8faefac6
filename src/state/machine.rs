//! Hold controller
//!
//! Two states, Released and Held. `toggle` flips between them and performs
//! the matching injection in the same step. The Held state remembers which
//! button was pressed, so a release always lifts that button even if the
//! selector changed in between.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::inject::{Direction, MouseButton, MouseInjector};

/// Current hold state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldState {
    /// No synthetic button is down
    #[default]
    Released,
    /// A synthetic button-down was injected and not yet released
    Held { button: MouseButton, since: Instant },
}

impl std::fmt::Display for HoldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldState::Released => write!(f, "Released"),
            HoldState::Held { button, .. } => write!(f, "Held({})", button),
        }
    }
}

/// What a transition did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pressed { button: MouseButton },
    Released { button: MouseButton, duration_ms: u64 },
}

/// Owns the hold state and the injector
pub struct HoldController<I: MouseInjector> {
    injector: I,
    state: HoldState,
    selected: MouseButton,
}

impl<I: MouseInjector> HoldController<I> {
    /// Create a controller in the Released state
    pub fn new(injector: I, selected: MouseButton) -> Self {
        Self {
            injector,
            state: HoldState::Released,
            selected,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> HoldState {
        self.state
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, HoldState::Held { .. })
    }

    pub fn selected_button(&self) -> MouseButton {
        self.selected
    }

    /// Button currently pressed, if any
    pub fn held_button(&self) -> Option<MouseButton> {
        match self.state {
            HoldState::Held { button, .. } => Some(button),
            HoldState::Released => None,
        }
    }

    /// Press the selected button, or release the held one
    pub fn toggle(&mut self) -> Transition {
        match self.state {
            HoldState::Released => self.press(),
            HoldState::Held { button, since } => self.release(button, since),
        }
    }

    /// Change the selection. A held button stays held; the new choice is
    /// used from the next press.
    pub fn select_button(&mut self, button: MouseButton) {
        if button == self.selected {
            return;
        }

        if let Some(held) = self.held_button() {
            debug!(%held, selected = %button, "selection changed while holding; applies to next press");
        }
        self.selected = button;
    }

    /// Release the held button if there is one
    pub fn force_release(&mut self) -> Option<Transition> {
        match self.state {
            HoldState::Held { button, since } => Some(self.release(button, since)),
            HoldState::Released => None,
        }
    }

    fn press(&mut self) -> Transition {
        let button = self.selected;
        self.inject(button, Direction::Down);
        self.state = HoldState::Held {
            button,
            since: Instant::now(),
        };

        info!(%button, "button held");
        Transition::Pressed { button }
    }

    fn release(&mut self, button: MouseButton, since: Instant) -> Transition {
        self.inject(button, Direction::Up);
        self.state = HoldState::Released;

        let duration_ms = since.elapsed().as_millis() as u64;
        info!(%button, duration_ms, "button released");
        Transition::Released {
            button,
            duration_ms,
        }
    }

    /// Fire-and-forget: a failed injection is logged and the state still moves
    fn inject(&mut self, button: MouseButton, direction: Direction) {
        if let Err(e) = self.injector.inject(button, direction) {
            warn!(%button, %direction, error = %e, "mouse injection failed");
        }
    }
}

impl<I: MouseInjector> Drop for HoldController<I> {
    fn drop(&mut self) {
        self.force_release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::testing::RecordingInjector;

    fn create_controller(selected: MouseButton) -> (HoldController<RecordingInjector>, RecordingInjector) {
        let injector = RecordingInjector::new();
        (HoldController::new(injector.clone(), selected), injector)
    }

    #[test]
    fn test_initial_state() {
        let (controller, injector) = create_controller(MouseButton::Left);
        assert_eq!(controller.state(), HoldState::Released);
        assert!(!controller.is_holding());
        assert!(injector.events().is_empty());
    }

    #[test]
    fn test_toggle_presses_then_releases() {
        let (mut controller, injector) = create_controller(MouseButton::Right);

        assert_eq!(
            controller.toggle(),
            Transition::Pressed {
                button: MouseButton::Right
            }
        );
        assert_eq!(controller.held_button(), Some(MouseButton::Right));

        assert!(matches!(
            controller.toggle(),
            Transition::Released {
                button: MouseButton::Right,
                ..
            }
        ));
        assert!(!controller.is_holding());
        assert_eq!(
            injector.events(),
            vec![
                (MouseButton::Right, Direction::Down),
                (MouseButton::Right, Direction::Up),
            ]
        );
    }

    #[test]
    fn test_toggle_sequence_alternates() {
        for n in 0..7 {
            let (mut controller, injector) = create_controller(MouseButton::Left);
            for _ in 0..n {
                controller.toggle();
            }

            let directions: Vec<Direction> = injector.events().into_iter().map(|(_, d)| d).collect();
            assert_eq!(directions.len(), n);
            for (i, direction) in directions.iter().enumerate() {
                let expected = if i % 2 == 0 { Direction::Down } else { Direction::Up };
                assert_eq!(*direction, expected);
            }
            assert_eq!(controller.is_holding(), n % 2 == 1);
        }
    }

    #[test]
    fn test_force_release_twice_emits_one_up() {
        let (mut controller, injector) = create_controller(MouseButton::Left);
        controller.toggle();

        assert!(controller.force_release().is_some());
        assert!(controller.force_release().is_none());

        assert_eq!(injector.count(Direction::Up), 1);
        assert!(!controller.is_holding());
    }

    #[test]
    fn test_force_release_when_released_is_noop() {
        let (mut controller, injector) = create_controller(MouseButton::Left);
        assert!(controller.force_release().is_none());
        assert!(injector.events().is_empty());
    }

    #[test]
    fn test_selection_change_while_held_releases_original_button() {
        let (mut controller, injector) = create_controller(MouseButton::Left);
        controller.toggle();

        controller.select_button(MouseButton::Right);
        assert_eq!(injector.events().len(), 1);
        assert_eq!(controller.held_button(), Some(MouseButton::Left));

        controller.toggle();
        assert_eq!(
            injector.events(),
            vec![
                (MouseButton::Left, Direction::Down),
                (MouseButton::Left, Direction::Up),
            ]
        );

        // New selection applies to the next press
        controller.toggle();
        assert_eq!(controller.held_button(), Some(MouseButton::Right));
    }

    #[test]
    fn test_failed_injection_still_transitions() {
        let injector = RecordingInjector::failing();
        let mut controller = HoldController::new(injector.clone(), MouseButton::Left);

        controller.toggle();
        assert!(controller.is_holding());
        controller.toggle();
        assert!(!controller.is_holding());
        assert_eq!(injector.events().len(), 2);
    }

    #[test]
    fn test_drop_releases_held_button() {
        let injector = RecordingInjector::new();
        {
            let mut controller = HoldController::new(injector.clone(), MouseButton::Right);
            controller.toggle();
        }
        assert_eq!(
            injector.events().last(),
            Some(&(MouseButton::Right, Direction::Up))
        );
    }
}
