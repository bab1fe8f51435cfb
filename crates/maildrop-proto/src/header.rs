//! Fixed frame headers with zero-copy parsing.
//!
//! Both headers are serialized as raw binary with Little Endian integers.
//! Fields are stored as byte arrays so the `#[repr(C, packed)]` layout has
//! no alignment requirements and any byte pattern is a structurally valid
//! header — validation of code values happens at the dispatch layer, where
//! a response can still be produced.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    ClientId, RequestCode, ResponseCode,
    errors::{ProtocolError, Result},
};

/// Protocol version stamped on every frame.
///
/// The version byte is informational: requests carrying other values are
/// still served (and the value is available for logging), matching the
/// behavior clients in the field already rely on.
pub const PROTOCOL_VERSION: u8 = 1;

/// Maximum declared payload size (16 MiB).
///
/// Declared sizes above this are rejected at parse time, before any body
/// buffer is allocated for them.
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Fixed 23-byte request header (Little Endian).
///
/// Layout on the wire:
/// `requester_id(16) · protocol_version(1) · request_code(2) · payload_size(4)`
///
/// The `payload_size` counts only the variable-length body that follows the
/// header.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct RequestHeader {
    requester_id: [u8; ClientId::LENGTH],
    version: u8,
    code: [u8; 2],
    payload_size: [u8; 4],
}

impl RequestHeader {
    /// Size of the serialized header (23 bytes)
    pub const SIZE: usize = 23;

    /// Create a new header for the given requester and request code.
    #[must_use]
    pub fn new(requester_id: ClientId, code: RequestCode, payload_size: u32) -> Self {
        Self {
            requester_id: requester_id.into_bytes(),
            version: PROTOCOL_VERSION,
            code: code.to_u16().to_le_bytes(),
            payload_size: payload_size.to_le_bytes(),
        }
    }

    /// Parse a header from network bytes (zero-copy).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the buffer holds fewer than 23 bytes, or
    /// the declared payload size exceeds [`MAX_PAYLOAD_SIZE`]. Unknown
    /// request codes and foreign version bytes parse successfully — the
    /// dispatcher decides what to do with them.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::FrameTooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            })?
            .0;

        let payload_size = u32::from_le_bytes(header.payload_size);
        if payload_size > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_size as usize,
                max: MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(header)
    }

    /// Serialize the header to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(self));
        arr
    }

    /// Get the requester's claimed identifier
    #[must_use]
    pub fn requester_id(&self) -> ClientId {
        ClientId::from_bytes(self.requester_id)
    }

    /// Get the protocol version byte
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Get the raw request code
    #[must_use]
    pub fn code(&self) -> u16 {
        u16::from_le_bytes(self.code)
    }

    /// Get the request code as an enum (if known)
    #[must_use]
    pub fn code_enum(&self) -> Option<RequestCode> {
        RequestCode::from_u16(self.code())
    }

    /// Get the declared body size in bytes
    #[must_use]
    pub fn payload_size(&self) -> u32 {
        u32::from_le_bytes(self.payload_size)
    }
}

// Manual impls: derives are unavailable under packed repr.
impl std::fmt::Debug for RequestHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHeader")
            .field("requester_id", &self.requester_id())
            .field("version", &self.version())
            .field("code", &self.code())
            .field("payload_size", &self.payload_size())
            .finish()
    }
}

impl PartialEq for RequestHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for RequestHeader {}

/// Fixed 7-byte response header (Little Endian).
///
/// Layout on the wire:
/// `protocol_version(1) · response_code(2) · payload_size(4)`
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ResponseHeader {
    version: u8,
    code: [u8; 2],
    payload_size: [u8; 4],
}

impl ResponseHeader {
    /// Size of the serialized header (7 bytes)
    pub const SIZE: usize = 7;

    /// Create a new header for the given response code.
    #[must_use]
    pub fn new(code: ResponseCode, payload_size: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            code: code.to_u16().to_le_bytes(),
            payload_size: payload_size.to_le_bytes(),
        }
    }

    /// Parse a header from network bytes (zero-copy).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the buffer holds fewer than 7 bytes or the
    /// declared payload size exceeds [`MAX_PAYLOAD_SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::FrameTooShort {
                expected: Self::SIZE,
                actual: bytes.len(),
            })?
            .0;

        let payload_size = u32::from_le_bytes(header.payload_size);
        if payload_size > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: payload_size as usize,
                max: MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(header)
    }

    /// Serialize the header to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(self));
        arr
    }

    /// Get the protocol version byte
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Get the raw response code
    #[must_use]
    pub fn code(&self) -> u16 {
        u16::from_le_bytes(self.code)
    }

    /// Get the response code as an enum (if known)
    #[must_use]
    pub fn code_enum(&self) -> Option<ResponseCode> {
        ResponseCode::from_u16(self.code())
    }

    /// Get the declared body size in bytes
    #[must_use]
    pub fn payload_size(&self) -> u32 {
        u32::from_le_bytes(self.payload_size)
    }
}

impl std::fmt::Debug for ResponseHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHeader")
            .field("version", &self.version())
            .field("code", &self.code())
            .field("payload_size", &self.payload_size())
            .finish()
    }
}

impl PartialEq for ResponseHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for ResponseHeader {}
