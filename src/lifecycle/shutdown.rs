//! Signal handling for graceful shutdown

use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_c, ctrl_close, CtrlC, CtrlClose};
use tracing::debug;

/// Handles shutdown signals (SIGTERM and SIGINT, or Ctrl+C and console close on Windows)
///
/// Handlers are installed on construction so a failure surfaces at startup
/// instead of when the daemon is asked to exit.
#[cfg(unix)]
pub struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    /// Install the SIGTERM and SIGINT handlers
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for a shutdown signal
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = self.sigint.recv() => {
                debug!("received SIGINT");
            }
        }
    }
}

#[cfg(windows)]
pub struct ShutdownSignal {
    ctrl_c: CtrlC,
    ctrl_close: CtrlClose,
}

#[cfg(windows)]
impl ShutdownSignal {
    /// Install the Ctrl+C and console-close handlers
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: ctrl_c()?,
            ctrl_close: ctrl_close()?,
        })
    }

    /// Wait for a shutdown signal
    pub async fn wait(&mut self) {
        tokio::select! {
            _ = self.ctrl_c.recv() => {
                debug!("received Ctrl+C");
            }
            _ = self.ctrl_close.recv() => {
                debug!("console window closing");
            }
        }
    }
}
