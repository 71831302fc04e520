//! Receive file(s) and/or folder(s) across the network.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use netshare::config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "receiver",
    version,
    about = "Receive files from the network"
)]
struct Args {
    /// Port to listen on; picked from a candidate list when omitted
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1025..))]
    port: Option<u16>,

    /// Folder to save received items (default: ~/NetShare)
    #[arg(short, long)]
    save: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let port = match args.port {
        Some(port) => port,
        None => match config::pick_available_port() {
            Some(port) => port,
            None => bail!("no candidate port available, pass one with --port"),
        },
    };

    let save_root = args.save.unwrap_or_else(config::default_save_root);
    config::prepare_save_root(&save_root)?;

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("cannot listen on port {port}"))?;
    println!("Files will be saved at: {}", save_root.display());
    println!("Server started at port: {port} (press ctrl+c to exit) Waiting...");
    info!(port, save_root = %save_root.display(), "server started");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("server stopped");
            signal_token.cancel();
        }
    });

    netshare::run_server(listener, save_root, shutdown).await;
    Ok(())
}
