//! Local RPC client: connection management and the `PresenceService` impl.

mod connection;
mod ipc_client;


pub use ipc_client::{IpcClient, IpcTimeouts};
