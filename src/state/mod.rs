//! Hold state and the dispatcher that owns it
//!
//! - machine: the Released/Held controller and its injections
//! - dispatcher: routes every input event to the controller, the hotkey
//!   binding and the settings store
//! - status: the readout sent to UI clients

mod dispatcher;
mod machine;
mod status;

pub use dispatcher::{DispatchError, Dispatcher};
pub use status::HoldStatus;
