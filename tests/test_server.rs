//! Accept-loop tests over real TCP sockets.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use netshare::{run_server, send_to};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

async fn start_server(save_root: &Path) -> (SocketAddr, CancellationToken, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(run_server(
        listener,
        save_root.to_path_buf(),
        shutdown.clone(),
    ));
    (addr, shutdown, handle)
}

#[tokio::test]
async fn test_concurrent_senders() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let tree_a = src.path().join("alpha");
    write(&tree_a.join("a1.txt"), b"first");
    write(&tree_a.join("deep").join("a2.txt"), b"second");
    let tree_b = src.path().join("beta");
    write(&tree_b.join("b1.txt"), b"third");

    let (addr, shutdown, server) = start_server(dst.path()).await;

    // Two independent connections served at the same time
    let paths_a = [tree_a];
    let paths_b = [tree_b];
    let (res_a, res_b) = tokio::join!(
        send_to(addr, &paths_a),
        send_to(addr, &paths_b),
    );
    assert_eq!(res_a.unwrap().files_sent, 2);
    assert_eq!(res_b.unwrap().files_sent, 1);

    assert_eq!(
        fs::read(dst.path().join("alpha").join("a1.txt")).unwrap(),
        b"first"
    );
    assert_eq!(
        fs::read(dst.path().join("alpha").join("deep").join("a2.txt")).unwrap(),
        b"second"
    );
    assert_eq!(
        fs::read(dst.path().join("beta").join("b1.txt")).unwrap(),
        b"third"
    );

    shutdown.cancel();
    server.await.unwrap();
}

#[tokio::test]
async fn test_bad_session_does_not_stop_the_acceptor() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let file = src.path().join("fine.txt");
    write(&file, b"still works");

    let (addr, shutdown, server) = start_server(dst.path()).await;

    // A client that speaks garbage only kills its own session
    let mut bad = TcpStream::connect(addr).await.unwrap();
    bad.write_all(&12u32.to_be_bytes()).await.unwrap();
    bad.write_all(b"not a frame!").await.unwrap();
    bad.shutdown().await.unwrap();
    drop(bad);

    let stats = send_to(addr, &[file]).await.unwrap();
    assert_eq!(stats.files_sent, 1);
    assert_eq!(fs::read(dst.path().join("fine.txt")).unwrap(), b"still works");

    shutdown.cancel();
    server.await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let dst = TempDir::new().unwrap();
    let (addr, shutdown, server) = start_server(dst.path()).await;

    shutdown.cancel();
    server.await.unwrap();

    // The listener is gone once the accept loop returns
    assert!(TcpStream::connect(addr).await.is_err());
}
