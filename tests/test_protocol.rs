//! Tests for the wire protocol blocks.

use netshare::transfer::protocol::{
    FileHead, Token, recv_block, recv_head, recv_head_or_eof, recv_token, send_block, send_head,
    send_token,
};
use netshare::transfer::TransferError;

fn sample_head() -> FileHead {
    FileHead {
        name: vec!["photos".to_string(), "2024".to_string(), "cat.jpg".to_string()],
        size: 2500,
        dir_size: 10_000,
    }
}

#[tokio::test]
async fn test_head_round_trip() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let head = sample_head();
    send_head(&mut client, &head).await.unwrap();
    let decoded = recv_head(&mut server).await.unwrap();

    assert_eq!(decoded, head);
}

#[tokio::test]
async fn test_token_round_trip() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    for token in [Token::Accept, Token::Skip, Token::Next] {
        send_token(&mut client, token).await.unwrap();
        assert_eq!(recv_token(&mut server).await.unwrap(), token);
    }
}

#[tokio::test]
async fn test_malformed_head_is_fatal() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    send_block(&mut client, b"this is not json").await.unwrap();
    let err = recv_head(&mut server).await.unwrap_err();
    assert!(matches!(err, TransferError::MalformedHead(_)));
}

#[tokio::test]
async fn test_head_missing_fields_is_fatal() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    // Valid JSON, but no size_d
    send_block(&mut client, br#"{"name":["a.txt"],"size":5}"#)
        .await
        .unwrap();
    let err = recv_head(&mut server).await.unwrap_err();
    assert!(matches!(err, TransferError::MalformedHead(_)));
}

#[tokio::test]
async fn test_oversized_block_rejected_on_send() {
    let (mut client, _server) = tokio::io::duplex(4096);

    let big = vec![b'x'; 1025];
    let err = send_block(&mut client, &big).await.unwrap_err();
    assert!(matches!(err, TransferError::Protocol(_)));
}

#[tokio::test]
async fn test_oversized_block_rejected_on_receive() {
    use tokio::io::AsyncWriteExt;

    let (mut client, mut server) = tokio::io::duplex(4096);

    // Hand-rolled prefix announcing a block over the limit
    client.write_all(&4096u32.to_be_bytes()).await.unwrap();
    client.write_all(&[0u8; 16]).await.unwrap();
    let err = recv_block(&mut server).await.unwrap_err();
    assert!(matches!(err, TransferError::Protocol(_)));
}

#[tokio::test]
async fn test_unknown_token_is_protocol_error() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    send_block(&mut client, b"perhaps").await.unwrap();
    let err = recv_token(&mut server).await.unwrap_err();
    assert!(matches!(err, TransferError::Protocol(_)));
}

#[tokio::test]
async fn test_peer_close_reads_as_end_of_session() {
    let (client, mut server) = tokio::io::duplex(4096);

    drop(client);
    let head = recv_head_or_eof(&mut server).await.unwrap();
    assert!(head.is_none());
}

#[tokio::test]
async fn test_close_inside_frame_is_an_error() {
    use tokio::io::AsyncWriteExt;

    let (mut client, mut server) = tokio::io::duplex(4096);

    // Length prefix promising 100 bytes, then the connection drops
    client.write_all(&100u32.to_be_bytes()).await.unwrap();
    drop(client);
    assert!(recv_head_or_eof(&mut server).await.is_err());
}
