//! fisidi-presence: keeps a rich presence activity published on the local
//! Discord client until interrupted.

mod shutdown;

use presence_ipc::IpcClient;
use presence_session::{Exit, Session};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is normal; the process environment still applies.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fisidi_presence=info,presence_session=info,presence_ipc=info,presence_config=info"
                    .into()
            }),
        )
        .init();

    let exit = match run().await {
        Ok(exit) => exit,
        Err(e) => {
            tracing::error!(error = %e, "fisidi-presence failed to start");
            Exit::InitialConnectFailed
        }
    };
    tracing::info!(code = exit.code(), "fisidi-presence exiting ({exit:?})");
    std::process::exit(exit.code());
}

async fn run() -> presence_common::Result<Exit> {
    let config = presence_config::load_config()?;

    tracing::info!(
        client_id = %config.client.client_id,
        refresh_ms = config.session.refresh_interval_ms,
        max_retries = config.session.max_retries,
        "Starting presence session"
    );

    let (client, events) = IpcClient::new(config.client.clone());
    let session = Session::new(client, events, &config);
    Ok(session.run(shutdown::signal()).await)
}
