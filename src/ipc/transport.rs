//! Local IPC endpoint
//!
//! A Unix domain socket (mode 0600) on Unix, a local-only named pipe on
//! Windows. Both hand out connections that the server splits into a reader
//! and a writer half.

#[cfg(unix)]
mod imp {
    use std::path::Path;

    use anyhow::{Context, Result};
    use tokio::net::{UnixListener, UnixStream};
    use tracing::warn;

    pub type Connection = UnixStream;

    pub struct Listener {
        inner: UnixListener,
    }

    impl Listener {
        /// Bind the socket, replacing a stale one
        pub fn bind(path: &Path) -> Result<Self> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).context("failed to create socket directory")?;
            }

            if path.exists() {
                std::fs::remove_file(path).context("failed to remove stale socket")?;
            }

            let inner = UnixListener::bind(path).context("failed to bind Unix socket")?;

            // Owner-only (0600)
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                    .context("failed to restrict socket permissions")?;
            }

            Ok(Self { inner })
        }

        pub async fn accept(&mut self) -> std::io::Result<Connection> {
            let (stream, _addr) = self.inner.accept().await?;
            Ok(stream)
        }
    }

    /// Remove the socket file
    pub fn remove(path: &Path) {
        if path.exists() {
            if let Err(e) = std::fs::remove_file(path) {
                warn!(?e, "failed to remove socket file");
            }
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use tokio::net::windows::named_pipe::{NamedPipeServer, ServerOptions};

    pub type Connection = NamedPipeServer;

    /// Named pipe server; one instance always waits for the next client
    pub struct Listener {
        name: PathBuf,
        pending: NamedPipeServer,
    }

    impl Listener {
        /// Create the first pipe instance; fails if another daemon owns the name
        pub fn bind(name: &Path) -> Result<Self> {
            let pending = ServerOptions::new()
                .first_pipe_instance(true)
                .reject_remote_clients(true)
                .create(name)
                .context("failed to create named pipe")?;

            Ok(Self {
                name: name.to_owned(),
                pending,
            })
        }

        pub async fn accept(&mut self) -> std::io::Result<Connection> {
            self.pending.connect().await?;
            let next = ServerOptions::new()
                .reject_remote_clients(true)
                .create(&self.name)?;
            Ok(std::mem::replace(&mut self.pending, next))
        }
    }

    /// Pipes vanish with their last handle
    pub fn remove(_name: &Path) {}
}

pub use imp::{remove, Connection, Listener};
