//! Response body layouts.
//!
//! Responses mirror requests: a fixed 7-byte header followed by a body
//! whose layout is selected by the response code. The list-shaped bodies
//! (`ClientList`, `PendingMessages`) are plain repetitions of fixed or
//! length-declared records with no count prefix; the declared payload size
//! delimits them.

use bytes::{BufMut, Bytes};

use crate::{
    ClientId, Credential, ResponseCode, ResponseHeader,
    errors::{ProtocolError, Result},
    request::{NAME_FIELD_LENGTH, parse_padded_name, put_padded_name},
};

/// One registry entry in a [`Response::ClientList`] body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    /// Client identifier
    pub id: ClientId,
    /// Display name
    pub name: String,
}

/// Wire width of one `ClientList` record: id + padded name
const CLIENT_ENTRY_SIZE: usize = ClientId::LENGTH + NAME_FIELD_LENGTH;

/// One stored message, as drained from a mailbox.
///
/// This is both the wire record inside a [`Response::PendingMessages`] body
/// and the in-memory representation a mailbox holds: the relay stores
/// exactly what it will later serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Identifier the sender claimed in its request header
    pub sender_id: ClientId,
    /// Random acknowledgment id assigned at deposit time
    pub message_id: u32,
    /// Message kind tag, carried verbatim
    pub kind: u8,
    /// Opaque content; may be empty
    pub content: Bytes,
}

/// Fixed prefix of one `PendingMessages` record:
/// sender id + message id + kind + content size (25 bytes)
const PENDING_RECORD_SUBHEADER_SIZE: usize = ClientId::LENGTH + 4 + 1 + 4;

/// All response bodies, tagged by [`ResponseCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Registration accepted (code 2000)
    RegisterOk {
        /// Identifier assigned to the new client
        id: ClientId,
    },
    /// Registry snapshot in insertion order (code 2001)
    ClientList(Vec<ClientEntry>),
    /// Credential lookup hit (code 2002)
    PublicKey {
        /// Identifier the lookup asked for
        id: ClientId,
        /// Stored credential, byte-for-byte as registered
        credential: Credential,
    },
    /// Message stored in the target's mailbox (code 2003)
    MessageAccepted {
        /// Identifier of the receiving client
        target_id: ClientId,
        /// Acknowledgment id of the stored message
        message_id: u32,
    },
    /// Drained mailbox contents in FIFO order (code 2004)
    PendingMessages(Vec<PendingMessage>),
    /// Request failed (code 9000, no body)
    Failure,
}

impl Response {
    /// Get the response code for this body
    #[must_use]
    pub const fn code(&self) -> ResponseCode {
        match self {
            Self::RegisterOk { .. } => ResponseCode::RegisterOk,
            Self::ClientList(_) => ResponseCode::ClientList,
            Self::PublicKey { .. } => ResponseCode::PublicKey,
            Self::MessageAccepted { .. } => ResponseCode::MessageAccepted,
            Self::PendingMessages(_) => ResponseCode::PendingMessages,
            Self::Failure => ResponseCode::Failure,
        }
    }

    /// Encode the body into a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NameTooLong`] if a `ClientList` entry holds
    /// a name wider than the 255-byte field. Names that arrived over the
    /// wire always fit; the check guards locally constructed entries.
    pub fn encode_body(&self, dst: &mut impl BufMut) -> Result<()> {
        match self {
            Self::RegisterOk { id } => {
                dst.put_slice(id.as_bytes());
            },
            Self::ClientList(entries) => {
                for entry in entries {
                    dst.put_slice(entry.id.as_bytes());
                    put_padded_name(dst, &entry.name)?;
                }
            },
            Self::PublicKey { id, credential } => {
                dst.put_slice(id.as_bytes());
                dst.put_slice(credential.as_bytes());
            },
            Self::MessageAccepted { target_id, message_id } => {
                dst.put_slice(target_id.as_bytes());
                dst.put_u32_le(*message_id);
            },
            Self::PendingMessages(messages) => {
                for message in messages {
                    dst.put_slice(message.sender_id.as_bytes());
                    dst.put_u32_le(message.message_id);
                    dst.put_u8(message.kind);
                    dst.put_u32_le(message.content.len() as u32);
                    dst.put_slice(&message.content);
                }
            },
            Self::Failure => {},
        }
        Ok(())
    }

    /// Decode a body slice according to its response code.
    ///
    /// The slice must be exactly the bytes the frame header declared.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if a fixed layout has the wrong size, a
    /// repeated body does not divide into whole records, or a name field
    /// fails UTF-8 validation.
    pub fn decode_body(code: ResponseCode, bytes: &[u8]) -> Result<Self> {
        match code {
            ResponseCode::RegisterOk => {
                expect_len(bytes, ClientId::LENGTH)?;
                Ok(Self::RegisterOk { id: take_client_id(bytes) })
            },
            ResponseCode::ClientList => {
                if bytes.len() % CLIENT_ENTRY_SIZE != 0 {
                    return Err(ProtocolError::PayloadSizeMismatch {
                        header: bytes.len(),
                        actual: bytes.len() - bytes.len() % CLIENT_ENTRY_SIZE,
                    });
                }

                let mut entries = Vec::with_capacity(bytes.len() / CLIENT_ENTRY_SIZE);
                for record in bytes.chunks_exact(CLIENT_ENTRY_SIZE) {
                    let id = take_client_id(&record[..ClientId::LENGTH]);
                    let name = parse_padded_name(&record[ClientId::LENGTH..])?;
                    entries.push(ClientEntry { id, name });
                }
                Ok(Self::ClientList(entries))
            },
            ResponseCode::PublicKey => {
                expect_len(bytes, ClientId::LENGTH + Credential::LENGTH)?;

                let id = take_client_id(&bytes[..ClientId::LENGTH]);
                let mut credential = [0u8; Credential::LENGTH];
                credential.copy_from_slice(&bytes[ClientId::LENGTH..]);

                Ok(Self::PublicKey { id, credential: Credential::from_bytes(credential) })
            },
            ResponseCode::MessageAccepted => {
                expect_len(bytes, ClientId::LENGTH + 4)?;

                let target_id = take_client_id(&bytes[..ClientId::LENGTH]);
                let mut message_id = [0u8; 4];
                message_id.copy_from_slice(&bytes[ClientId::LENGTH..]);

                Ok(Self::MessageAccepted {
                    target_id,
                    message_id: u32::from_le_bytes(message_id),
                })
            },
            ResponseCode::PendingMessages => {
                let mut messages = Vec::new();
                let mut rest = bytes;

                while !rest.is_empty() {
                    if rest.len() < PENDING_RECORD_SUBHEADER_SIZE {
                        return Err(ProtocolError::FrameTooShort {
                            expected: PENDING_RECORD_SUBHEADER_SIZE,
                            actual: rest.len(),
                        });
                    }

                    let sender_id = take_client_id(&rest[..ClientId::LENGTH]);

                    let mut message_id = [0u8; 4];
                    message_id.copy_from_slice(&rest[ClientId::LENGTH..ClientId::LENGTH + 4]);
                    let kind = rest[ClientId::LENGTH + 4];

                    let mut size = [0u8; 4];
                    size.copy_from_slice(
                        &rest[ClientId::LENGTH + 5..PENDING_RECORD_SUBHEADER_SIZE],
                    );
                    let content_size = u32::from_le_bytes(size) as usize;

                    let after_subheader = &rest[PENDING_RECORD_SUBHEADER_SIZE..];
                    if after_subheader.len() < content_size {
                        return Err(ProtocolError::PayloadSizeMismatch {
                            header: content_size,
                            actual: after_subheader.len(),
                        });
                    }

                    messages.push(PendingMessage {
                        sender_id,
                        message_id: u32::from_le_bytes(message_id),
                        kind,
                        content: Bytes::copy_from_slice(&after_subheader[..content_size]),
                    });
                    rest = &after_subheader[content_size..];
                }

                Ok(Self::PendingMessages(messages))
            },
            ResponseCode::Failure => {
                expect_len(bytes, 0)?;
                Ok(Self::Failure)
            },
        }
    }

    /// Encode a complete frame: header plus body.
    ///
    /// The header's payload size is set from the encoded body, so the two
    /// cannot disagree.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the body fails to encode.
    pub fn encode_frame(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.encode_body(&mut body)?;

        let header = ResponseHeader::new(self.code(), body.len() as u32);

        let mut frame = Vec::with_capacity(ResponseHeader::SIZE + body.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

/// Decode a complete response frame from wire bytes.
///
/// # Errors
///
/// Returns `ProtocolError` if the header fails to parse, the buffer holds
/// fewer body bytes than declared, the response code is unknown, or the
/// body fails to decode.
pub fn decode_frame(bytes: &[u8]) -> Result<(ResponseHeader, Response)> {
    let header = *ResponseHeader::from_bytes(bytes)?;

    let payload_size = header.payload_size() as usize;
    let available = bytes.len() - ResponseHeader::SIZE;
    if available < payload_size {
        return Err(ProtocolError::FrameTruncated { expected: payload_size, actual: available });
    }

    let code = header.code_enum().ok_or(ProtocolError::InvalidResponseCode(header.code()))?;
    let body = &bytes[ResponseHeader::SIZE..ResponseHeader::SIZE + payload_size];

    Ok((header, Response::decode_body(code, body)?))
}

fn expect_len(bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::PayloadSizeMismatch { header: bytes.len(), actual: expected })
    }
}

/// Copy a 16-byte identifier out of a slice already checked for length.
fn take_client_id(field: &[u8]) -> ClientId {
    let mut id = [0u8; ClientId::LENGTH];
    id.copy_from_slice(&field[..ClientId::LENGTH]);
    ClientId::from_bytes(id)
}
