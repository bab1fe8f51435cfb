//! Tokio TCP transport for the maildrop relay.
//!
//! The accept loop is single-threaded and sequential; each accepted
//! connection runs on its own spawned task against the shared registry.
//! A connection carries exactly one request: read the fixed header, read
//! the declared body, dispatch, write at most one response frame, close.
//! There is no keep-alive.
//!
//! Every read and the response write run under the configured timeout, so
//! idle or trickling peers cannot pin a task indefinitely. Accept errors
//! are logged and never terminate the server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod env;

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use maildrop_core::{ClientRegistry, Environment, dispatch};
use maildrop_proto::RequestHeader;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    time::timeout,
};

pub use crate::{config::ServerConfig, env::SystemEnv};

/// Accept connections forever, spawning one handler task per connection.
///
/// Returns only if the runtime shuts the task down; individual connection
/// failures and accept errors are logged and absorbed.
pub async fn run_server<E: Environment>(
    listener: TcpListener,
    registry: Arc<ClientRegistry<E>>,
    read_timeout: Duration,
) {
    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!(%error, "accept failed");
                continue;
            },
        };

        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            handle_connection(stream, &registry, read_timeout, peer_addr).await;
        });
    }
}

/// Drive one connection through its single request/response exchange.
///
/// ```text
/// AwaitHeader ──> AwaitBody ──> Dispatch ──> RespondAndClose
/// ```
///
/// The declared body is always read in full — even for requests that will
/// be answered with `Failure` — so the transport is never abandoned
/// mid-frame. The connection closes unconditionally on return.
async fn handle_connection<E: Environment>(
    mut stream: TcpStream,
    registry: &ClientRegistry<E>,
    read_timeout: Duration,
    peer_addr: SocketAddr,
) {
    tracing::debug!(%peer_addr, "client connected");

    // AwaitHeader
    let mut header_buf = [0u8; RequestHeader::SIZE];
    if let Err(error) = read_exact_timed(&mut stream, &mut header_buf, read_timeout).await {
        // Peers that connect and vanish are routine; nothing was promised yet.
        tracing::debug!(%peer_addr, %error, "connection abandoned before header");
        return;
    }

    let header = match RequestHeader::from_bytes(&header_buf) {
        Ok(header) => *header,
        Err(error) => {
            tracing::warn!(%peer_addr, %error, "dropping connection with unparseable header");
            return;
        },
    };

    // AwaitBody: consume exactly the declared payload. Content may exceed a
    // single segment; read_exact loops over partial reads until satisfied.
    let mut body = vec![0u8; header.payload_size() as usize];
    if let Err(error) = read_exact_timed(&mut stream, &mut body, read_timeout).await {
        tracing::warn!(%peer_addr, %error, "dropping connection with incomplete body");
        return;
    }

    // Dispatch
    let response = match dispatch(registry, &header, &body) {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(%peer_addr, %error, "closing connection without response");
            return;
        },
    };

    // RespondAndClose
    let frame = match response.encode_frame() {
        Ok(frame) => frame,
        Err(error) => {
            tracing::error!(%peer_addr, %error, "failed to encode response");
            return;
        },
    };

    if let Err(error) = write_all_timed(&mut stream, &frame, read_timeout).await {
        tracing::debug!(%peer_addr, %error, "failed to deliver response");
    }
}

async fn read_exact_timed(
    stream: &mut TcpStream,
    buf: &mut [u8],
    limit: Duration,
) -> io::Result<()> {
    match timeout(limit, stream.read_exact(buf)).await {
        Ok(result) => result.map(|_| ()),
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
    }
}

async fn write_all_timed(stream: &mut TcpStream, buf: &[u8], limit: Duration) -> io::Result<()> {
    match timeout(limit, stream.write_all(buf)).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "write timed out")),
    }
}
