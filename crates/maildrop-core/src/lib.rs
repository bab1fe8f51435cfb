//! Maildrop relay core logic
//!
//! This crate contains the shared state and the request-handling logic of
//! the maildrop relay, decoupled from sockets. The transport driver
//! (maildrop-server) reads frames off the network and hands fully-read
//! bodies to [`dispatch::dispatch`]; everything in here is exercised the
//! same way by unit tests and by the production server.
//!
//! # Architecture
//!
//! ```text
//!      ┌─────────────────────────────┐
//!      │ maildrop-core               │
//!      │ - ClientRegistry            │
//!      │ - per-record Mailbox        │
//!      │ - request dispatch          │
//!      └─────────────────────────────┘
//!         ↓                      ↓
//! ┌────────────────┐  ┌──────────────────┐
//! │ unit tests     │  │ maildrop-server  │
//! │ - seeded RNG   │  │ - Tokio TCP      │
//! │ - no sockets   │  │ - OS entropy     │
//! └────────────────┘  └──────────────────┘
//! ```
//!
//! # Key Principles
//!
//! - Randomness goes through the [`env::Environment`] trait, never through
//!   a thread-local RNG, so identifier generation is reproducible in tests
//! - Locking is two-level: one registry lock for membership, one lock per
//!   record for its mailbox, so unrelated clients' traffic never serializes
//!
//! # Modules
//!
//! - [`env`]: environment abstraction (randomness)
//! - [`registry`]: client records and the registration critical section
//! - [`mailbox`]: per-client pending-message queue
//! - [`dispatch`]: decoded request → response (or terminal error)

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod dispatch;
pub mod env;
pub mod mailbox;
pub mod registry;

pub use dispatch::{DispatchError, dispatch};
pub use env::Environment;
pub use mailbox::Mailbox;
pub use registry::{ClientRecord, ClientRegistry, RegistryError};
