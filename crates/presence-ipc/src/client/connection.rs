//! One established socket: handshake, request routing and the reader task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use presence_common::{new_nonce, RpcError};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::codec::{read_frame, write_frame, Opcode};
use crate::discovery::BoxedStream;
use crate::protocol::{Command, ErrorData, Handshake, ReadyData, Response, User, PROTOCOL_VERSION};
use crate::service::ServiceEvent;

type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<Result<serde_json::Value, RpcError>>>>>;
type Writer = Arc<Mutex<WriteHalf<BoxedStream>>>;

pub(crate) struct Connection {
    writer: Writer,
    pending: Pending,
    /// Set once login completes; only live connections report events.
    live: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl Connection {
    /// Handshake on a fresh stream, then start the reader task.
    pub(crate) async fn open(
        stream: BoxedStream,
        client_id: &str,
        event_tx: mpsc::Sender<ServiceEvent>,
        handshake_timeout: Duration,
    ) -> Result<(Self, User), RpcError> {
        let (mut read_half, mut write_half) = tokio::io::split(stream);

        let user = tokio::time::timeout(
            handshake_timeout,
            handshake(&mut read_half, &mut write_half, client_id),
        )
        .await
        .map_err(|_| RpcError::Timeout("handshake"))??;

        let writer: Writer = Arc::new(Mutex::new(write_half));
        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let live = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(read_loop(
            read_half,
            Arc::clone(&writer),
            Arc::clone(&pending),
            Arc::clone(&live),
            event_tx,
        ));

        Ok((
            Self {
                writer,
                pending,
                live,
                reader,
            },
            user,
        ))
    }

    pub(crate) fn mark_live(&self) {
        self.live.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst) && !self.reader.is_finished()
    }

    /// Send a command and wait for the response carrying the same nonce.
    pub(crate) async fn request(
        &self,
        cmd: &'static str,
        args: serde_json::Value,
        limit: Duration,
    ) -> Result<serde_json::Value, RpcError> {
        let nonce = new_nonce();
        let body = serde_json::to_value(Command {
            cmd,
            args,
            nonce: &nonce,
        })?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(nonce.clone(), tx);

        let written = {
            let mut writer = self.writer.lock().await;
            write_frame(&mut *writer, Opcode::Frame, &body).await
        };
        if let Err(e) = written {
            self.pending.lock().await.remove(&nonce);
            return Err(e);
        }

        match tokio::time::timeout(limit, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RpcError::NotConnected),
            Err(_) => {
                self.pending.lock().await.remove(&nonce);
                Err(RpcError::Timeout(cmd))
            }
        }
    }

    /// Stop the reader without reporting a disconnect, then shut the socket.
    pub(crate) async fn close(self) -> Result<(), RpcError> {
        self.live.store(false, Ordering::SeqCst);
        self.reader.abort();
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn handshake<R, W>(reader: &mut R, writer: &mut W, client_id: &str) -> Result<User, RpcError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let hello = serde_json::to_value(Handshake {
        v: PROTOCOL_VERSION,
        client_id,
    })?;
    write_frame(writer, Opcode::Handshake, &hello).await?;

    loop {
        let frame = read_frame(reader)
            .await?
            .ok_or_else(|| RpcError::Connection("socket closed during handshake".into()))?;

        match frame.opcode {
            Opcode::Frame => {
                let response: Response = serde_json::from_value(frame.payload)?;
                if response.is_ready() {
                    let ready: ReadyData = serde_json::from_value(response.data)?;
                    return Ok(ready.user.unwrap_or_default());
                }
                if response.is_error() {
                    let data: ErrorData = serde_json::from_value(response.data).unwrap_or_default();
                    return Err(RpcError::Rpc {
                        code: data.code,
                        message: data.message,
                    });
                }
                debug!(cmd = %response.cmd, "Ignoring frame before READY");
            }
            Opcode::Close => {
                let data: ErrorData = serde_json::from_value(frame.payload).unwrap_or_default();
                return Err(RpcError::Closed {
                    code: data.code,
                    message: data.message,
                });
            }
            Opcode::Ping => write_frame(writer, Opcode::Pong, &frame.payload).await?,
            Opcode::Pong | Opcode::Handshake => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

async fn read_loop(
    mut reader: ReadHalf<BoxedStream>,
    writer: Writer,
    pending: Pending,
    live: Arc<AtomicBool>,
    event_tx: mpsc::Sender<ServiceEvent>,
) {
    let reason = loop {
        let frame = match read_frame(&mut reader).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break "socket closed".to_string(),
            Err(e) => break e.to_string(),
        };

        match frame.opcode {
            Opcode::Frame => dispatch(frame.payload, &pending, &live, &event_tx).await,
            Opcode::Ping => {
                let mut w = writer.lock().await;
                if let Err(e) = write_frame(&mut *w, Opcode::Pong, &frame.payload).await {
                    break e.to_string();
                }
            }
            Opcode::Close => {
                let data: ErrorData = serde_json::from_value(frame.payload).unwrap_or_default();
                break format!("closed by peer ({}): {}", data.code, data.message);
            }
            Opcode::Pong | Opcode::Handshake => {}
        }
    };

    debug!(reason = %reason, "Presence IPC reader stopped");

    for (_, tx) in pending.lock().await.drain() {
        let _ = tx.send(Err(RpcError::Connection(reason.clone())));
    }

    if live.swap(false, Ordering::SeqCst) {
        let _ = event_tx.send(ServiceEvent::Disconnected).await;
    }
}

async fn dispatch(
    payload: serde_json::Value,
    pending: &Pending,
    live: &AtomicBool,
    event_tx: &mpsc::Sender<ServiceEvent>,
) {
    let response: Response = match serde_json::from_value(payload) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "Malformed frame from presence service");
            return;
        }
    };
    let is_error = response.is_error();

    if let Some(nonce) = response.nonce.as_deref() {
        let waiter = pending.lock().await.remove(nonce);
        if let Some(tx) = waiter {
            let result = if is_error {
                Err(rpc_error(response.data))
            } else {
                Ok(response.data)
            };
            let _ = tx.send(result);
            return;
        }
    }

    if is_error {
        let err = rpc_error(response.data);
        if live.load(Ordering::SeqCst) {
            let _ = event_tx.send(ServiceEvent::Error(err)).await;
        } else {
            debug!(error = %err, "Error before login completed");
        }
        return;
    }

    debug!(cmd = %response.cmd, evt = ?response.evt, "Unhandled dispatch");
}

fn rpc_error(data: serde_json::Value) -> RpcError {
    let data: ErrorData = serde_json::from_value(data).unwrap_or_default();
    RpcError::Rpc {
        code: data.code,
        message: data.message,
    }
}
