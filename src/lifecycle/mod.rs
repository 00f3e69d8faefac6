//! Process lifecycle: shutdown signals and best-effort cleanup

mod cleanup;
mod shutdown;

pub use cleanup::BestEffort;
pub use shutdown::ShutdownSignal;
