//! Locating and opening the local RPC socket.
//!
//! The desktop client listens on `discord-ipc-0` through `discord-ipc-9`:
//! Unix sockets under the runtime/temp directory (including Flatpak and
//! Snap sandboxes), named pipes on Windows.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use presence_common::RpcError;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

const PIPE_SLOTS: u8 = 10;

#[cfg(unix)]
const SANDBOX_SUBDIRS: [&str; 3] = ["", "app/com.discordapp.Discord", "snap.discord"];

/// Any duplex byte stream the client can speak the protocol over.
pub trait IpcStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> IpcStream for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

pub type BoxedStream = Box<dyn IpcStream>;

/// Opens a fresh stream to the presence service for each login attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<BoxedStream, RpcError>;
}

/// Connects to the real local socket, either a fixed path or the first slot that answers.
#[derive(Debug, Clone, Default)]
pub struct SocketConnector {
    explicit: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl SocketConnector {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn connect_any(&self) -> Result<BoxedStream, RpcError> {
        let candidates = match &self.explicit {
            Some(path) => vec![path.clone()],
            None => candidate_paths(),
        };

        let mut last_error = None;
        for path in &candidates {
            match open(path).await {
                Ok(stream) => {
                    debug!(path = %path.display(), "Opened presence IPC socket");
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no candidate paths".into());
        Err(RpcError::Connection(format!(
            "could not connect to the local client ({} paths tried): {detail}",
            candidates.len()
        )))
    }
}

#[async_trait]
impl Connector for SocketConnector {
    async fn connect(&self) -> Result<BoxedStream, RpcError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.connect_any())
                .await
                .map_err(|_| RpcError::Timeout("socket connect"))?,
            None => self.connect_any().await,
        }
    }
}

/// Candidate socket paths in the order they are tried.
pub fn candidate_paths() -> Vec<PathBuf> {
    candidate_paths_with(|key| std::env::var(key).ok())
}

/// Same as [`candidate_paths`] with an injectable environment lookup.
#[cfg(unix)]
pub fn candidate_paths_with<F>(lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let base = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
        .iter()
        .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    let mut paths = Vec::with_capacity(SANDBOX_SUBDIRS.len() * PIPE_SLOTS as usize);
    for subdir in SANDBOX_SUBDIRS {
        let dir = if subdir.is_empty() {
            base.clone()
        } else {
            base.join(subdir)
        };
        for slot in 0..PIPE_SLOTS {
            paths.push(dir.join(format!("discord-ipc-{slot}")));
        }
    }
    paths
}

#[cfg(windows)]
pub fn candidate_paths_with<F>(_lookup: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    (0..PIPE_SLOTS)
        .map(|slot| PathBuf::from(format!(r"\\?\pipe\discord-ipc-{slot}")))
        .collect()
}

#[cfg(unix)]
async fn open(path: &Path) -> Result<BoxedStream, RpcError> {
    let stream = tokio::net::UnixStream::connect(path).await?;
    Ok(Box::new(stream))
}

#[cfg(windows)]
async fn open(path: &Path) -> Result<BoxedStream, RpcError> {
    let pipe = tokio::net::windows::named_pipe::ClientOptions::new().open(path)?;
    Ok(Box::new(pipe))
}
