//! IPC module for daemon-UI communication

mod protocol;
mod server;
mod transport;

pub use server::Server;
