//! Identifier and credential types carried on the wire.

use std::fmt;

/// 16-byte client identifier.
///
/// Assigned by the server at registration from a wide random space;
/// uniqueness is enforced against the live registry, not guaranteed by the
/// generator itself. Serialized as raw bytes, displayed as hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId([u8; Self::LENGTH]);

impl ClientId {
    /// Width of the identifier on the wire (16 bytes)
    pub const LENGTH: usize = 16;

    /// Wrap raw identifier bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw identifier bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Consume into the raw identifier bytes
    #[must_use]
    pub const fn into_bytes(self) -> [u8; Self::LENGTH] {
        self.0
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", hex::encode(self.0))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Opaque fixed-length public credential (160 bytes).
///
/// Stored verbatim at registration and echoed back on lookup. The server
/// never validates or interprets the contents.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Credential([u8; Self::LENGTH]);

impl Credential {
    /// Width of the credential on the wire (160 bytes)
    pub const LENGTH: usize = 160;

    /// Wrap raw credential bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw credential bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} bytes>)", Self::LENGTH)
    }
}
