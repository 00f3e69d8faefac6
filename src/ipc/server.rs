//! IPC server for the settings window
//!
//! Translates client requests into dispatcher events and pushes state
//! events to subscribed clients. The server never touches hold state itself.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::events::{Envelope, EventSender, InputEvent, StateEvent};

use super::protocol::{Notification, Request, Response, MAX_FRAME_LEN};
use super::transport::{self, Connection, Listener};

/// How long shutdown waits for handlers to finish writing their replies
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: tokio::sync::Mutex<Listener>,
    clients: Mutex<JoinSet<()>>,
    event_tx: EventSender,
    state_events: broadcast::Sender<StateEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

/// What the reader half of a connection produced
enum Incoming {
    Request(Request),
    Malformed(String),
}

impl Server {
    /// Bind the endpoint, replacing a stale socket
    pub fn new(
        socket_path: &Path,
        event_tx: EventSender,
        state_events: broadcast::Sender<StateEvent>,
    ) -> Result<Self> {
        let listener = Listener::bind(socket_path)?;
        let (shutdown_tx, _) = broadcast::channel(1);

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: tokio::sync::Mutex::new(listener),
            clients: Mutex::new(JoinSet::new()),
            event_tx,
            state_events,
            shutdown_tx,
        })
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let mut listener = self.listener.lock().await;

        loop {
            match listener.accept().await {
                Ok(stream) => {
                    debug!("client connected");
                    let event_tx = self.event_tx.clone();
                    let state_events = self.state_events.clone();
                    let shutdown_rx = self.shutdown_tx.subscribe();

                    let mut clients = self.lock_clients();
                    while clients.try_join_next().is_some() {}
                    clients.spawn(async move {
                        if let Err(e) =
                            Self::handle_client(stream, event_tx, state_events, shutdown_rx).await
                        {
                            warn!(?e, "client handler error");
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    fn lock_clients(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.clients.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle a single client connection
    ///
    /// Shutdown is only observed between frames, so a reply that is being
    /// produced is always written out first.
    async fn handle_client(
        stream: Connection,
        event_tx: EventSender,
        state_events: broadcast::Sender<StateEvent>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<()> {
        let (reader, mut writer) = tokio::io::split(stream);
        let (incoming_tx, mut incoming_rx) = mpsc::channel(8);
        let reader_task = tokio::spawn(Self::read_requests(reader, incoming_tx));
        let mut subscription: Option<broadcast::Receiver<StateEvent>> = None;

        let result = loop {
            tokio::select! {
                incoming = incoming_rx.recv() => {
                    let response = match incoming {
                        Some(Incoming::Request(request)) => {
                            debug!(?request, "received request");
                            if request == Request::Subscribe && subscription.is_none() {
                                subscription = Some(state_events.subscribe());
                                debug!("client subscribed to notifications");
                            }
                            Self::process_request(request, &event_tx).await
                        }
                        Some(Incoming::Malformed(reason)) => {
                            Response::error("bad_request", reason)
                        }
                        None => break Ok(()),
                    };

                    if let Err(e) = Self::send_message(&mut writer, &response).await {
                        break Err(e);
                    }
                }

                event = next_state_event(&mut subscription) => {
                    match event {
                        Ok(event) => {
                            let note = Notification::StateChanged { event };
                            if let Err(e) = Self::send_message(&mut writer, &note).await {
                                break Err(e);
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            subscription = None;
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    debug!("client handler shutting down");
                    break Ok(());
                }
            }
        };

        reader_task.abort();
        result
    }

    /// Read length-prefixed JSON frames until EOF or an oversized frame
    async fn read_requests<R>(mut reader: R, incoming_tx: mpsc::Sender<Incoming>)
    where
        R: AsyncRead + Unpin,
    {
        let mut len_buf = [0u8; 4];

        loop {
            match reader.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return;
                }
                Err(e) => {
                    warn!(?e, "client read error");
                    return;
                }
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_FRAME_LEN {
                warn!(len, "message too large, disconnecting");
                return;
            }

            let mut msg_buf = vec![0u8; len];
            if let Err(e) = reader.read_exact(&mut msg_buf).await {
                warn!(?e, "client read error");
                return;
            }

            let incoming = match serde_json::from_slice::<Request>(&msg_buf) {
                Ok(request) => Incoming::Request(request),
                Err(e) => Incoming::Malformed(format!("failed to parse request: {e}")),
            };

            if incoming_tx.send(incoming).await.is_err() {
                return;
            }
        }
    }

    /// Send a length-prefixed JSON message
    async fn send_message<W, T>(writer: &mut W, msg: &T) -> Result<()>
    where
        W: AsyncWrite + Unpin,
        T: serde::Serialize,
    {
        let msg_bytes = serde_json::to_vec(msg)?;
        let msg_len = (msg_bytes.len() as u32).to_le_bytes();

        writer.write_all(&msg_len).await?;
        writer.write_all(&msg_bytes).await?;
        writer.flush().await?;

        Ok(())
    }

    /// Answer locally or forward to the dispatcher and wait for its reply
    async fn process_request(request: Request, event_tx: &EventSender) -> Response {
        let Some(event) = request.input_event() else {
            return match request {
                Request::Subscribe => Response::Subscribed,
                _ => Response::Pong,
            };
        };

        let (envelope, reply_rx) = Envelope::request(event);
        if event_tx.send(envelope).await.is_err() {
            return Response::error("unavailable", "daemon is shutting down");
        }

        match reply_rx.await {
            Ok(Ok(status)) if event == InputEvent::ShutdownRequested => Response::ShuttingDown(status),
            Ok(Ok(status)) => Response::Status(status),
            Ok(Err(e)) => e.into(),
            Err(_) => Response::error("unavailable", "daemon is shutting down"),
        }
    }

    /// Gracefully shutdown the server
    ///
    /// Handlers finish the frame they are writing, then close. Any still
    /// running after [`DRAIN_TIMEOUT`] are aborted.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        let mut clients = std::mem::take(&mut *self.lock_clients());
        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while clients.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(remaining = clients.len(), "client handlers did not finish, aborting");
            clients.abort_all();
        }

        transport::remove(&self.socket_path);

        info!("IPC server shutdown complete");
    }
}

/// Next event for a subscribed client; never resolves without a subscription
async fn next_state_event(
    subscription: &mut Option<broadcast::Receiver<StateEvent>>,
) -> Result<StateEvent, broadcast::error::RecvError> {
    match subscription {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
