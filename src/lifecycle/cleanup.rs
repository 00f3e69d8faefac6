//! Outcome of cleanup steps that must never abort shutdown

use std::fmt::Display;

use tracing::warn;

/// Result of a best-effort step. Failures are logged when constructed and
/// never propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum BestEffort {
    /// Step ran and succeeded
    Completed,
    /// Nothing to do
    Skipped,
    /// Step ran and failed; the reason has been logged
    Failed(String),
}

impl BestEffort {
    pub fn from_result<E: Display>(action: &'static str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => BestEffort::Completed,
            Err(e) => {
                warn!(action, error = %e, "best-effort step failed");
                BestEffort::Failed(e.to_string())
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BestEffort::Completed)
    }
}
