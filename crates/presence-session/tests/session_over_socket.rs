//! End-to-end session runs against a fake desktop client on a Unix socket.

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use presence_config::PresenceConfig;
use presence_ipc::codec::{read_frame, write_frame, Opcode};
use presence_ipc::IpcClient;
use presence_session::{Exit, Session};
use serde_json::{json, Value};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, oneshot};

fn config_for(socket: PathBuf) -> PresenceConfig {
    let mut config = PresenceConfig::default();
    config.client.scopes = Vec::new();
    config.client.ipc_path = Some(socket);
    config.session.backoff_step_ms = 1;
    config.session.backoff_cap_ms = 3;
    config
}

/// Accept one connection, greet it and acknowledge every command.
/// With `hang_up`, the socket is closed right after the first command.
async fn serve_once(listener: UnixListener, seen: mpsc::UnboundedSender<Value>, hang_up: bool) {
    let (mut stream, _) = listener.accept().await.unwrap();
    drop(listener);

    let hello = read_frame(&mut stream).await.unwrap().unwrap();
    assert_eq!(hello.opcode, Opcode::Handshake);
    write_frame(
        &mut stream,
        Opcode::Frame,
        &json!({
            "cmd": "DISPATCH",
            "evt": "READY",
            "data": {"v": 1, "user": {"id": "1", "username": "tester"}}
        }),
    )
    .await
    .unwrap();

    while let Ok(Some(frame)) = read_frame(&mut stream).await {
        let cmd = frame.payload;
        write_frame(
            &mut stream,
            Opcode::Frame,
            &json!({"cmd": cmd["cmd"], "nonce": cmd["nonce"], "data": cmd["args"]["activity"]}),
        )
        .await
        .unwrap();
        let _ = seen.send(cmd);
        if hang_up {
            return;
        }
    }
}

async fn next_seen(seen: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(5), seen.recv())
        .await
        .expect("no command reached the server")
        .expect("server stopped")
}

#[tokio::test]
async fn publishes_then_clears_on_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("discord-ipc-0");
    let listener = UnixListener::bind(&socket).unwrap();
    let (seen_tx, mut seen) = mpsc::unbounded_channel();
    let server = tokio::spawn(serve_once(listener, seen_tx, false));

    let config = config_for(socket);
    let (client, events) = IpcClient::new(config.client.clone());
    let session = Session::new(client, events, &config);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let run = tokio::spawn(session.run(async move {
        let _ = stop_rx.await;
    }));

    let published = next_seen(&mut seen).await;
    assert_eq!(published["cmd"], "SET_ACTIVITY");
    assert_eq!(published["args"]["activity"]["details"], "Join Fire Development");
    assert!(published["args"]["activity"]["timestamps"]["start"].is_i64());

    stop_tx.send(()).unwrap();
    let cleared = next_seen(&mut seen).await;
    assert_eq!(cleared["cmd"], "SET_ACTIVITY");
    assert!(cleared["args"].get("activity").is_none());

    assert_eq!(run.await.unwrap(), Exit::Shutdown);
    server.await.unwrap();
}

#[tokio::test]
async fn lost_client_exhausts_retries() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("discord-ipc-0");
    let listener = UnixListener::bind(&socket).unwrap();
    let (seen_tx, mut seen) = mpsc::unbounded_channel();
    let server = tokio::spawn(serve_once(listener, seen_tx, true));

    let config = config_for(socket);
    let (client, events) = IpcClient::new(config.client.clone());
    let session = Session::new(client, events, &config);
    let run = tokio::spawn(session.run(std::future::pending()));

    next_seen(&mut seen).await;
    server.await.unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("session kept retrying")
        .unwrap();
    assert_eq!(exit, Exit::RetriesExhausted);
    assert_eq!(exit.code(), 1);
}

#[tokio::test]
async fn missing_client_fails_first_connect() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path().join("discord-ipc-0"));
    let (client, events) = IpcClient::new(config.client.clone());

    let exit = Session::new(client, events, &config)
        .run(std::future::pending())
        .await;

    assert_eq!(exit, Exit::InitialConnectFailed);
}
