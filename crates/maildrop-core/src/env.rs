//! Environment abstraction for identifier generation.
//!
//! The `Environment` trait decouples the registry and mailbox from system
//! entropy. Identifiers are the only side effect this crate needs:
//!
//! - Production (`maildrop-server::SystemEnv`): OS entropy pool
//! - Tests: seeded ChaCha20, so generated ids are reproducible run to run
//!
//! Core code MUST NOT reach for a thread-local RNG directly; everything
//! flows through an `Environment` value handed in by the driver.

use maildrop_proto::ClientId;

/// Abstract source of randomness for identifier generation.
///
/// # Implementations
///
/// Production implementations MUST draw from a cryptographically secure
/// source (client identifiers double as bearer tokens for mailbox access).
/// Test implementations should be seeded for reproducibility.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Fills the provided buffer with random bytes.
    ///
    /// # Panics
    ///
    /// May panic if the underlying entropy source fails (OS entropy
    /// exhaustion, incorrect test setup). Implementations document their
    /// specific conditions.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a fresh candidate client identifier.
    ///
    /// Candidates are drawn uniformly from the 128-bit space; the registry
    /// still checks each candidate against live records before accepting it.
    fn client_id(&self) -> ClientId {
        let mut bytes = [0u8; ClientId::LENGTH];
        self.random_bytes(&mut bytes);
        ClientId::from_bytes(bytes)
    }

    /// Generates a random message acknowledgment id.
    ///
    /// Message ids are informational and best-effort unique; collisions are
    /// accepted.
    fn message_id(&self) -> u32 {
        let mut bytes = [0u8; 4];
        self.random_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }
}
