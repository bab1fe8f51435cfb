//! End-to-end tests against a live listener.
//!
//! Each test binds an ephemeral port, runs the real accept loop on a
//! spawned task, and drives it with raw `TcpStream` clients — one fresh
//! connection per request, exactly as deployed clients behave.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use bytes::Bytes;
use maildrop_core::ClientRegistry;
use maildrop_proto::{
    ClientId, Credential, GetPublicKeyRequest, RegisterRequest, Request, Response,
    ResponseHeader, SendMessageRequest, response,
};
use maildrop_server::{SystemEnv, run_server};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

const TEST_READ_TIMEOUT: Duration = Duration::from_secs(1);

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = Arc::new(ClientRegistry::new(SystemEnv::new()));

    tokio::spawn(async move {
        run_server(listener, registry, TEST_READ_TIMEOUT).await;
    });

    addr
}

/// One request/response exchange over a fresh connection.
async fn exchange(addr: SocketAddr, request: &Request, requester: ClientId) -> Response {
    let frame = request.encode_frame(requester).unwrap();

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&frame).await.unwrap();

    read_response(&mut stream).await
}

async fn read_response(stream: &mut TcpStream) -> Response {
    let mut header_buf = [0u8; ResponseHeader::SIZE];
    stream.read_exact(&mut header_buf).await.unwrap();
    let header = *ResponseHeader::from_bytes(&header_buf).unwrap();

    let mut body = vec![0u8; header.payload_size() as usize];
    stream.read_exact(&mut body).await.unwrap();

    let mut frame = header_buf.to_vec();
    frame.extend_from_slice(&body);
    response::decode_frame(&frame).unwrap().1
}

fn credential(fill: u8) -> Credential {
    Credential::from_bytes([fill; Credential::LENGTH])
}

fn anonymous() -> ClientId {
    ClientId::from_bytes([0; 16])
}

async fn register(addr: SocketAddr, name: &str, fill: u8) -> ClientId {
    let request = Request::Register(RegisterRequest {
        name: name.to_string(),
        credential: credential(fill),
    });

    match exchange(addr, &request, anonymous()).await {
        Response::RegisterOk { id } => id,
        other => panic!("expected RegisterOk, got {other:?}"),
    }
}

#[tokio::test]
async fn register_then_duplicate_name_fails() {
    let addr = spawn_server().await;

    let id = register(addr, "alice", 0x01).await;
    assert_eq!(id.as_bytes().len(), 16);

    let request = Request::Register(RegisterRequest {
        name: "alice".to_string(),
        credential: credential(0x01),
    });
    assert_eq!(exchange(addr, &request, anonymous()).await, Response::Failure);
}

#[tokio::test]
async fn list_clients_returns_registered_entry() {
    let addr = spawn_server().await;
    let bob = register(addr, "bob", 0x02).await;

    match exchange(addr, &Request::ListClients, bob).await {
        Response::ClientList(entries) => {
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].name, "bob");
            assert_eq!(entries[0].id, bob);
        },
        other => panic!("expected ClientList, got {other:?}"),
    }
}

#[tokio::test]
async fn get_public_key_echoes_credential_bytes() {
    let addr = spawn_server().await;

    for (name, fill) in [("zeros", 0x00u8), ("ones", 0xFF)] {
        let id = register(addr, name, fill).await;
        let requester = register(addr, &format!("{name}-peer"), 0x10).await;

        let request = Request::GetPublicKey(GetPublicKeyRequest { target_id: id });
        match exchange(addr, &request, requester).await {
            Response::PublicKey { id: returned, credential: stored } => {
                assert_eq!(returned, id);
                assert_eq!(stored, credential(fill));
            },
            other => panic!("expected PublicKey, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn text_message_round_trip_and_destructive_drain() {
    let addr = spawn_server().await;
    let carol = register(addr, "carol", 0x01).await;
    let dave = register(addr, "dave", 0x02).await;

    // Dave sends Carol a text message.
    let request = Request::SendMessage(SendMessageRequest {
        target_id: carol,
        kind: 3,
        content: Bytes::from_static(b"hello"),
    });
    match exchange(addr, &request, dave).await {
        Response::MessageAccepted { target_id, .. } => assert_eq!(target_id, carol),
        other => panic!("expected MessageAccepted, got {other:?}"),
    }

    // Carol pulls it.
    match exchange(addr, &Request::PullMessages, carol).await {
        Response::PendingMessages(messages) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].sender_id, dave);
            assert_eq!(messages[0].kind, 3);
            assert_eq!(messages[0].content, Bytes::from_static(b"hello"));
        },
        other => panic!("expected PendingMessages, got {other:?}"),
    }

    // An immediate second pull is empty.
    assert_eq!(
        exchange(addr, &Request::PullMessages, carol).await,
        Response::PendingMessages(vec![])
    );
}

#[tokio::test]
async fn send_to_unknown_target_gets_failure_not_silence() {
    let addr = spawn_server().await;
    let dave = register(addr, "dave", 0x02).await;

    let request = Request::SendMessage(SendMessageRequest {
        target_id: ClientId::from_bytes([0xCD; 16]),
        kind: 3,
        content: Bytes::from_static(b"nobody home"),
    });
    assert_eq!(exchange(addr, &request, dave).await, Response::Failure);
}

#[tokio::test]
async fn empty_content_message_is_delivered() {
    let addr = spawn_server().await;
    let carol = register(addr, "carol", 0x01).await;
    let dave = register(addr, "dave", 0x02).await;

    let request = Request::SendMessage(SendMessageRequest {
        target_id: carol,
        kind: 1,
        content: Bytes::new(),
    });
    assert!(matches!(
        exchange(addr, &request, dave).await,
        Response::MessageAccepted { .. }
    ));

    match exchange(addr, &Request::PullMessages, carol).await {
        Response::PendingMessages(messages) => {
            assert_eq!(messages.len(), 1);
            assert!(messages[0].content.is_empty());
            assert_eq!(messages[0].kind, 1);
        },
        other => panic!("expected PendingMessages, got {other:?}"),
    }
}

#[tokio::test]
async fn large_content_survives_segmented_delivery() {
    let addr = spawn_server().await;
    let carol = register(addr, "carol", 0x01).await;
    let dave = register(addr, "dave", 0x02).await;

    // Well beyond a single TCP segment; the server must loop on partial
    // reads until the declared size is satisfied.
    let content: Vec<u8> = (0..128 * 1024).map(|i| i as u8).collect();
    let request = Request::SendMessage(SendMessageRequest {
        target_id: carol,
        kind: 4,
        content: Bytes::from(content.clone()),
    });
    assert!(matches!(
        exchange(addr, &request, dave).await,
        Response::MessageAccepted { .. }
    ));

    match exchange(addr, &Request::PullMessages, carol).await {
        Response::PendingMessages(messages) => {
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0].content.as_ref(), content.as_slice());
        },
        other => panic!("expected PendingMessages, got {other:?}"),
    }
}

#[tokio::test]
async fn unregistered_requester_gets_failure_after_body_is_consumed() {
    let addr = spawn_server().await;
    register(addr, "alice", 0x01).await;

    // SendMessage from an id the registry has never issued: the server must
    // consume the whole declared body, then answer Failure.
    let request = Request::SendMessage(SendMessageRequest {
        target_id: anonymous(),
        kind: 3,
        content: Bytes::from(vec![0x55; 4096]),
    });
    let ghost = ClientId::from_bytes([0x99; 16]);
    assert_eq!(exchange(addr, &request, ghost).await, Response::Failure);
}

#[tokio::test]
async fn partial_header_peer_is_dropped_without_response() {
    let addr = spawn_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&[0x01, 0x02, 0x03]).await.unwrap();

    // The read timeout releases the connection; the peer sees EOF, not a
    // response frame.
    let mut buf = [0u8; 1];
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("server should close the connection within the read timeout");
    assert_eq!(read.unwrap(), 0);

    // The server is still healthy afterwards.
    register(addr, "survivor", 0x01).await;
}

#[tokio::test]
async fn unknown_request_code_closes_without_response() {
    let addr = spawn_server().await;

    let mut frame = Request::ListClients.encode_frame(anonymous()).unwrap();
    frame[17..19].copy_from_slice(&4321u16.to_le_bytes());

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&frame).await.unwrap();

    let mut buf = [0u8; 1];
    let read = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("server should close the connection");
    assert_eq!(read.unwrap(), 0);
}

#[tokio::test]
async fn concurrent_registrations_get_unique_ids() {
    let addr = spawn_server().await;
    let clients = 20;

    let handles: Vec<_> = (0..clients)
        .map(|i| tokio::spawn(async move { register(addr, &format!("client-{i}"), 0x01).await }))
        .collect();

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    assert_eq!(ids.len(), clients);
}
