//! Request dispatch: decoded header plus fully-read body → response.
//!
//! Every connection carries exactly one request. The transport driver
//! walks the connection through four steps:
//!
//! ```text
//! AwaitHeader ──> AwaitBody ──> Dispatch ──> RespondAndClose
//! ```
//!
//! The driver owns the two reads and the final write; this module is the
//! Dispatch step. By the time [`dispatch`] runs, the driver has read
//! exactly the declared number of body bytes — including for requests it
//! will reject — so the peer's connection is never left mid-frame.
//!
//! # Response policy
//!
//! Exactly one response frame per accepted request, with two exceptions
//! surfaced as [`DispatchError`]:
//!
//! - an unknown request code closes the connection without a response
//! - a SendMessage body whose framing is inconsistent (short sub-header,
//!   content length disagreeing with the declared size) is treated as
//!   corruption and closes the connection
//!
//! Everything else that goes wrong — duplicate name, unregistered
//! requester, unknown target, undecodable Register body — answers with a
//! `Failure` frame and lets the connection close normally.

use maildrop_proto::{
    ClientEntry, ClientId, GetPublicKeyRequest, ProtocolError, RegisterRequest, RequestCode,
    RequestHeader, Response, SendMessageRequest,
};
use thiserror::Error;

use crate::{env::Environment, registry::ClientRegistry};

/// Terminal connection errors: no response frame can or should be sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Request code outside the supported set
    #[error("unsupported request code: {0}")]
    UnknownRequestCode(u16),

    /// Body framing inconsistent with its declared sizes
    #[error("malformed frame: {0}")]
    Malformed(#[from] ProtocolError),
}

/// Handle one decoded request against the shared registry.
///
/// `body` must be exactly the bytes the request header declared.
///
/// # Errors
///
/// Returns [`DispatchError`] only for the close-without-response paths
/// described in the module docs; all recoverable failures are `Ok` with a
/// [`Response::Failure`] body.
pub fn dispatch<E: Environment>(
    registry: &ClientRegistry<E>,
    header: &RequestHeader,
    body: &[u8],
) -> Result<Response, DispatchError> {
    let Some(code) = header.code_enum() else {
        return Err(DispatchError::UnknownRequestCode(header.code()));
    };

    tracing::debug!(
        requester = %header.requester_id(),
        version = header.version(),
        ?code,
        payload_size = header.payload_size(),
        "dispatching request"
    );

    if code == RequestCode::Register {
        return Ok(register(registry, body));
    }

    // Every other operation requires a registered requester. The body was
    // already consumed by the driver, so answering here leaves the
    // connection well-formed.
    let requester = header.requester_id();
    if !registry.exists(requester) {
        tracing::warn!(requester = %requester, ?code, "request from unregistered client");
        return Ok(Response::Failure);
    }

    match code {
        RequestCode::Register => unreachable!("handled above"),
        RequestCode::ListClients => Ok(list_clients(registry)),
        RequestCode::GetPublicKey => Ok(get_public_key(registry, body)),
        RequestCode::SendMessage => send_message(registry, requester, body),
        RequestCode::PullMessages => Ok(pull_messages(registry, requester)),
    }
}

fn register<E: Environment>(registry: &ClientRegistry<E>, body: &[u8]) -> Response {
    let request = match RegisterRequest::decode(body) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(%error, "rejecting registration with undecodable body");
            return Response::Failure;
        },
    };

    match registry.register(&request.name, request.credential) {
        Ok(record) => Response::RegisterOk { id: record.id() },
        Err(error) => {
            tracing::warn!(%error, "rejecting registration");
            Response::Failure
        },
    }
}

fn list_clients<E: Environment>(registry: &ClientRegistry<E>) -> Response {
    let entries = registry
        .list_all()
        .iter()
        .map(|record| ClientEntry { id: record.id(), name: record.name().to_string() })
        .collect();

    Response::ClientList(entries)
}

fn get_public_key<E: Environment>(registry: &ClientRegistry<E>, body: &[u8]) -> Response {
    let request = match GetPublicKeyRequest::decode(body) {
        Ok(request) => request,
        Err(error) => {
            tracing::warn!(%error, "rejecting credential lookup with undecodable body");
            return Response::Failure;
        },
    };

    match registry.find(request.target_id) {
        Some(record) => {
            Response::PublicKey { id: record.id(), credential: *record.credential() }
        },
        None => {
            tracing::debug!(target = %request.target_id, "credential lookup for unknown client");
            Response::Failure
        },
    }
}

fn send_message<E: Environment>(
    registry: &ClientRegistry<E>,
    requester: ClientId,
    body: &[u8],
) -> Result<Response, DispatchError> {
    // Inconsistent send framing is indistinguishable from a desynchronized
    // stream; it drops the connection rather than answering.
    let request = SendMessageRequest::decode(body)?;

    match registry.find(request.target_id) {
        Some(record) => {
            let message_id =
                record.mailbox().append(request.kind, requester, request.content, registry.env());

            tracing::debug!(
                target = %request.target_id,
                message_id,
                kind = request.kind,
                "stored message"
            );
            Ok(Response::MessageAccepted { target_id: request.target_id, message_id })
        },
        None => {
            tracing::debug!(target = %request.target_id, "message for unknown client");
            Ok(Response::Failure)
        },
    }
}

fn pull_messages<E: Environment>(
    registry: &ClientRegistry<E>,
    requester: ClientId,
) -> Response {
    match registry.find(requester) {
        Some(record) => {
            let messages = record.mailbox().drain_all();
            tracing::debug!(requester = %requester, count = messages.len(), "drained mailbox");
            Response::PendingMessages(messages)
        },
        // Records are never removed; a requester that passed the exists
        // gate is still present.
        None => Response::Failure,
    }
}
