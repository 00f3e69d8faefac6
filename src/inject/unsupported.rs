//! Fallback for platforms without an injection backend

use super::{Direction, InjectError, MouseButton, MouseInjector};

#[derive(Debug, Default)]
pub struct UnsupportedInjector;

impl UnsupportedInjector {
    pub fn new() -> Self {
        Self
    }
}

impl MouseInjector for UnsupportedInjector {
    fn inject(&mut self, _button: MouseButton, _direction: Direction) -> Result<(), InjectError> {
        Err(InjectError::Unsupported)
    }
}
