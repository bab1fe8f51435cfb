//! # Maildrop Protocol: Wire Format
//!
//! This crate implements the binary framing layer for the maildrop
//! store-and-forward relay.
//!
//! ## Protocol Design
//!
//! Every exchange is one request frame followed by at most one response
//! frame over a fresh connection:
//!
//! - **RequestHeader**: fixed 23 bytes of raw binary (Little Endian) —
//!   requester id, protocol version, request code, payload size
//! - **ResponseHeader**: fixed 7 bytes — protocol version, response code,
//!   payload size
//! - **Bodies**: fixed or length-declared binary layouts per code; the
//!   server never interprets message content, only its framing
//!
//! ## Implementation Notes
//!
//! - **Zero-Copy Parsing**: headers are cast directly from network bytes
//!   with [`zerocopy`](https://docs.rs/zerocopy); every bit pattern of the
//!   header structs is valid, so parsing cannot hit undefined behavior.
//!
//! - **Size Limits**: declared payload sizes above 16 MiB are rejected at
//!   header parse time, before any body allocation.
//!
//! - **Explicit Validation**: all parsing returns `Result`; malformed input
//!   is an error value, never a panic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codes;
pub mod errors;
pub mod header;
pub mod ids;
pub mod request;
pub mod response;

pub use codes::{MessageKind, RequestCode, ResponseCode};
pub use errors::{ProtocolError, Result};
pub use header::{RequestHeader, ResponseHeader};
pub use ids::{ClientId, Credential};
pub use request::{GetPublicKeyRequest, RegisterRequest, Request, SendMessageRequest};
pub use response::{ClientEntry, PendingMessage, Response};
