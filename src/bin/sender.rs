//! Send file(s) and/or folder(s) across the network.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sender",
    version,
    about = "Send files and/or folders across the network"
)]
struct Args {
    /// IP address of the machine where the receiver is running
    #[arg(short, long)]
    address: IpAddr,

    /// The receiver process network port number
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1025..))]
    port: u16,

    /// The file(s) and/or folder(s) to send to the receiver
    #[arg(short, long, num_args = 1.., required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let addr = SocketAddr::new(args.address, args.port);
    netshare::send_to(addr, &args.files).await?;
    Ok(())
}
