//! Accept loop: one concurrent receiver session per connection.

use std::path::PathBuf;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::receiver;

/// Accept connections until the shutdown token fires, spawning one session
/// per connection. Sessions never block the accept loop or each other; a
/// failed session is logged and the loop keeps serving.
pub async fn run_server(listener: TcpListener, save_root: PathBuf, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                let (mut socket, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!(error = %e, "accept failed");
                        continue;
                    }
                };
                info!(%peer, "client connected");
                let save_root = save_root.clone();
                let shutdown = shutdown.clone();
                tokio::spawn(async move {
                    match receiver::handle_session(&mut socket, &save_root, &shutdown).await {
                        Ok(stats) => info!(
                            %peer,
                            written = stats.files_written,
                            skipped = stats.files_skipped,
                            bytes = stats.bytes_accounted,
                            "client done, closing connection"
                        ),
                        Err(e) => error!(%peer, error = %e, "session terminated"),
                    }
                });
            }
        }
    }
}
