//! Request body layouts.
//!
//! Each request code has a fixed or length-declared binary body. The
//! `Request` enum provides type-safe encoding and decoding; the frame
//! helpers pair a body with its 23-byte header.
//!
//! Name fields are fixed 255-byte slots, right-padded with zero bytes.
//! Encoding fails (rather than truncating) when a name does not fit;
//! decoding strips trailing zero bytes and requires the remainder to be
//! valid UTF-8.

use bytes::{BufMut, Bytes};

use crate::{
    ClientId, Credential, RequestCode, RequestHeader,
    errors::{ProtocolError, Result},
    header::MAX_PAYLOAD_SIZE,
};

/// Width of the zero-padded name field (255 bytes)
pub const NAME_FIELD_LENGTH: usize = 255;

/// Fixed size of the Register body: padded name + credential (415 bytes)
pub const REGISTER_BODY_SIZE: usize = NAME_FIELD_LENGTH + Credential::LENGTH;

/// Fixed prefix of the SendMessage body: target id + kind + content size
/// (21 bytes)
pub const SEND_MESSAGE_SUBHEADER_SIZE: usize = ClientId::LENGTH + 1 + 4;

/// Register a new client under a unique display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name, unique server-wide, at most 255 bytes encoded
    pub name: String,
    /// Opaque public credential stored verbatim
    pub credential: Credential,
}

impl RegisterRequest {
    /// Decode the fixed 415-byte Register body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the slice is not exactly
    /// [`REGISTER_BODY_SIZE`] bytes or the name field is not valid UTF-8.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != REGISTER_BODY_SIZE {
            return Err(ProtocolError::PayloadSizeMismatch {
                header: bytes.len(),
                actual: REGISTER_BODY_SIZE,
            });
        }

        let name = parse_padded_name(&bytes[..NAME_FIELD_LENGTH])?;
        let mut credential = [0u8; Credential::LENGTH];
        credential.copy_from_slice(&bytes[NAME_FIELD_LENGTH..]);

        Ok(Self { name, credential: Credential::from_bytes(credential) })
    }
}

/// Fetch the stored credential of one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetPublicKeyRequest {
    /// Identifier of the client whose credential is requested
    pub target_id: ClientId,
}

impl GetPublicKeyRequest {
    /// Decode the fixed 16-byte GetPublicKey body.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the slice is not exactly one identifier
    /// wide.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ClientId::LENGTH {
            return Err(ProtocolError::PayloadSizeMismatch {
                header: bytes.len(),
                actual: ClientId::LENGTH,
            });
        }

        let mut id = [0u8; ClientId::LENGTH];
        id.copy_from_slice(bytes);
        Ok(Self { target_id: ClientId::from_bytes(id) })
    }
}

/// Deposit one message into a client's mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// Identifier of the receiving client
    pub target_id: ClientId,
    /// Message kind tag, carried verbatim (see [`crate::MessageKind`])
    pub kind: u8,
    /// Opaque message content; may be empty
    pub content: Bytes,
}

impl SendMessageRequest {
    /// Decode a SendMessage body: 21-byte sub-header plus declared content.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the slice is shorter than the sub-header
    /// or the declared content size does not match the remaining bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SEND_MESSAGE_SUBHEADER_SIZE {
            return Err(ProtocolError::FrameTooShort {
                expected: SEND_MESSAGE_SUBHEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut target = [0u8; ClientId::LENGTH];
        target.copy_from_slice(&bytes[..ClientId::LENGTH]);
        let kind = bytes[ClientId::LENGTH];

        let mut size = [0u8; 4];
        size.copy_from_slice(&bytes[ClientId::LENGTH + 1..SEND_MESSAGE_SUBHEADER_SIZE]);
        let content_size = u32::from_le_bytes(size) as usize;

        let content = &bytes[SEND_MESSAGE_SUBHEADER_SIZE..];
        if content.len() != content_size {
            return Err(ProtocolError::PayloadSizeMismatch {
                header: content_size,
                actual: content.len(),
            });
        }

        Ok(Self {
            target_id: ClientId::from_bytes(target),
            kind,
            content: Bytes::copy_from_slice(content),
        })
    }
}

/// All request bodies, tagged by [`RequestCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Register a new client (code 1000)
    Register(RegisterRequest),
    /// Enumerate registered clients (code 1001, no body)
    ListClients,
    /// Fetch a client's credential (code 1002)
    GetPublicKey(GetPublicKeyRequest),
    /// Deposit a message (code 1003)
    SendMessage(SendMessageRequest),
    /// Drain the requester's mailbox (code 1004, no body)
    PullMessages,
}

impl Request {
    /// Get the request code for this body
    #[must_use]
    pub const fn code(&self) -> RequestCode {
        match self {
            Self::Register(_) => RequestCode::Register,
            Self::ListClients => RequestCode::ListClients,
            Self::GetPublicKey(_) => RequestCode::GetPublicKey,
            Self::SendMessage(_) => RequestCode::SendMessage,
            Self::PullMessages => RequestCode::PullMessages,
        }
    }

    /// Encode the body into a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::NameTooLong`] if a Register name exceeds the
    /// 255-byte field.
    pub fn encode_body(&self, dst: &mut impl BufMut) -> Result<()> {
        match self {
            Self::Register(register) => {
                put_padded_name(dst, &register.name)?;
                dst.put_slice(register.credential.as_bytes());
            },
            Self::ListClients | Self::PullMessages => {},
            Self::GetPublicKey(get) => {
                dst.put_slice(get.target_id.as_bytes());
            },
            Self::SendMessage(send) => {
                dst.put_slice(send.target_id.as_bytes());
                dst.put_u8(send.kind);
                dst.put_u32_le(send.content.len() as u32);
                dst.put_slice(&send.content);
            },
        }
        Ok(())
    }

    /// Decode a body slice according to its request code.
    ///
    /// The slice must be exactly the bytes the frame header declared.
    /// Bodyless codes ignore any declared bytes, matching the tolerance of
    /// deployed servers.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if a fixed layout has the wrong size, a
    /// declared content length does not match the remaining bytes, or a name
    /// field fails UTF-8 validation.
    pub fn decode_body(code: RequestCode, bytes: &[u8]) -> Result<Self> {
        match code {
            RequestCode::Register => RegisterRequest::decode(bytes).map(Self::Register),
            RequestCode::ListClients => Ok(Self::ListClients),
            RequestCode::GetPublicKey => GetPublicKeyRequest::decode(bytes).map(Self::GetPublicKey),
            RequestCode::SendMessage => SendMessageRequest::decode(bytes).map(Self::SendMessage),
            RequestCode::PullMessages => Ok(Self::PullMessages),
        }
    }

    /// Encode a complete frame: header plus body.
    ///
    /// The header's payload size is set from the encoded body, so the two
    /// cannot disagree.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the body fails to encode or exceeds
    /// [`MAX_PAYLOAD_SIZE`].
    pub fn encode_frame(&self, requester_id: ClientId) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        self.encode_body(&mut body)?;

        if body.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: body.len(),
                max: MAX_PAYLOAD_SIZE as usize,
            });
        }

        let header = RequestHeader::new(requester_id, self.code(), body.len() as u32);

        let mut frame = Vec::with_capacity(RequestHeader::SIZE + body.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

/// Decode a complete request frame from wire bytes.
///
/// Trailing bytes beyond the declared payload are ignored.
///
/// # Errors
///
/// Returns `ProtocolError` if the header fails to parse, the buffer holds
/// fewer body bytes than declared, the request code is unknown, or the body
/// fails to decode.
pub fn decode_frame(bytes: &[u8]) -> Result<(RequestHeader, Request)> {
    let header = *RequestHeader::from_bytes(bytes)?;

    let payload_size = header.payload_size() as usize;
    let available = bytes.len() - RequestHeader::SIZE;
    if available < payload_size {
        return Err(ProtocolError::FrameTruncated { expected: payload_size, actual: available });
    }

    let code = header.code_enum().ok_or(ProtocolError::InvalidRequestCode(header.code()))?;
    let body = &bytes[RequestHeader::SIZE..RequestHeader::SIZE + payload_size];

    Ok((header, Request::decode_body(code, body)?))
}

/// Write `name` into a fixed 255-byte slot, right-padded with zeros.
pub(crate) fn put_padded_name(dst: &mut impl BufMut, name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_FIELD_LENGTH {
        return Err(ProtocolError::NameTooLong { len: bytes.len(), max: NAME_FIELD_LENGTH });
    }

    dst.put_slice(bytes);
    dst.put_bytes(0, NAME_FIELD_LENGTH - bytes.len());
    Ok(())
}

/// Parse a fixed 255-byte name slot: strip trailing zeros, require UTF-8.
pub(crate) fn parse_padded_name(field: &[u8]) -> Result<String> {
    debug_assert_eq!(field.len(), NAME_FIELD_LENGTH);

    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    std::str::from_utf8(&field[..end]).map(str::to_owned).map_err(|_| ProtocolError::NameNotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(request: Request) -> Request {
        let requester = ClientId::from_bytes([0x42; 16]);
        let frame = request.encode_frame(requester).expect("should encode");
        let (header, decoded) = decode_frame(&frame).expect("should decode");

        assert_eq!(header.requester_id(), requester);
        assert_eq!(header.code_enum(), Some(request.code()));
        decoded
    }

    #[test]
    fn register_round_trip() {
        let request = Request::Register(RegisterRequest {
            name: "alice".to_string(),
            credential: Credential::from_bytes([0x01; Credential::LENGTH]),
        });
        assert_eq!(round_trip(request.clone()), request);
    }

    #[test]
    fn register_body_is_fixed_size() {
        let request = Request::Register(RegisterRequest {
            name: "a".to_string(),
            credential: Credential::from_bytes([0; Credential::LENGTH]),
        });
        let mut body = Vec::new();
        request.encode_body(&mut body).expect("should encode");
        assert_eq!(body.len(), REGISTER_BODY_SIZE);
    }

    #[test]
    fn register_name_at_field_width() {
        let name = "x".repeat(NAME_FIELD_LENGTH);
        let request = Request::Register(RegisterRequest {
            name: name.clone(),
            credential: Credential::from_bytes([0xFF; Credential::LENGTH]),
        });

        match round_trip(request) {
            Request::Register(register) => assert_eq!(register.name, name),
            other => panic!("expected Register, got {other:?}"),
        }
    }

    #[test]
    fn overlong_name_fails_instead_of_truncating() {
        let request = Request::Register(RegisterRequest {
            name: "x".repeat(NAME_FIELD_LENGTH + 1),
            credential: Credential::from_bytes([0; Credential::LENGTH]),
        });

        let mut body = Vec::new();
        assert_eq!(
            request.encode_body(&mut body),
            Err(ProtocolError::NameTooLong { len: NAME_FIELD_LENGTH + 1, max: NAME_FIELD_LENGTH })
        );
    }

    #[test]
    fn register_rejects_wrong_body_size() {
        let result = Request::decode_body(RequestCode::Register, &[0u8; REGISTER_BODY_SIZE - 1]);
        assert!(matches!(result, Err(ProtocolError::PayloadSizeMismatch { .. })));
    }

    #[test]
    fn register_rejects_non_utf8_name() {
        let mut body = vec![0u8; REGISTER_BODY_SIZE];
        body[0] = 0xFF;
        body[1] = 0xFE;

        assert_eq!(
            Request::decode_body(RequestCode::Register, &body),
            Err(ProtocolError::NameNotUtf8)
        );
    }

    #[test]
    fn get_public_key_round_trip() {
        let request = Request::GetPublicKey(GetPublicKeyRequest {
            target_id: ClientId::from_bytes([0x07; 16]),
        });
        assert_eq!(round_trip(request.clone()), request);
    }

    #[test]
    fn send_message_round_trip() {
        let request = Request::SendMessage(SendMessageRequest {
            target_id: ClientId::from_bytes([0x09; 16]),
            kind: 3,
            content: Bytes::from_static(b"hello"),
        });
        assert_eq!(round_trip(request.clone()), request);
    }

    #[test]
    fn send_message_empty_content_is_valid() {
        let request = Request::SendMessage(SendMessageRequest {
            target_id: ClientId::from_bytes([0x09; 16]),
            kind: 1,
            content: Bytes::new(),
        });

        let mut body = Vec::new();
        request.encode_body(&mut body).expect("should encode");
        assert_eq!(body.len(), SEND_MESSAGE_SUBHEADER_SIZE);
        assert_eq!(round_trip(request.clone()), request);
    }

    #[test]
    fn send_message_rejects_short_subheader() {
        let result = Request::decode_body(RequestCode::SendMessage, &[0u8; 20]);
        assert_eq!(result, Err(ProtocolError::FrameTooShort { expected: 21, actual: 20 }));
    }

    #[test]
    fn send_message_rejects_content_size_mismatch() {
        let request = Request::SendMessage(SendMessageRequest {
            target_id: ClientId::from_bytes([0; 16]),
            kind: 3,
            content: Bytes::from_static(b"abc"),
        });
        let mut body = Vec::new();
        request.encode_body(&mut body).expect("should encode");

        // Declare one more content byte than is present
        body[17..21].copy_from_slice(&4u32.to_le_bytes());

        assert_eq!(
            Request::decode_body(RequestCode::SendMessage, &body),
            Err(ProtocolError::PayloadSizeMismatch { header: 4, actual: 3 })
        );
    }

    #[test]
    fn bodyless_requests_ignore_declared_bytes() {
        assert_eq!(
            Request::decode_body(RequestCode::ListClients, &[1, 2, 3]),
            Ok(Request::ListClients)
        );
        assert_eq!(Request::decode_body(RequestCode::PullMessages, &[]), Ok(Request::PullMessages));
    }

    #[test]
    fn decode_frame_rejects_truncated_body() {
        let request = Request::SendMessage(SendMessageRequest {
            target_id: ClientId::from_bytes([0; 16]),
            kind: 3,
            content: Bytes::from_static(b"hello"),
        });
        let frame = request.encode_frame(ClientId::from_bytes([0; 16])).expect("should encode");

        let result = decode_frame(&frame[..frame.len() - 1]);
        assert!(matches!(result, Err(ProtocolError::FrameTruncated { .. })));
    }

    #[test]
    fn decode_frame_rejects_unknown_code() {
        let mut frame = Request::ListClients
            .encode_frame(ClientId::from_bytes([0; 16]))
            .expect("should encode");
        frame[17..19].copy_from_slice(&999u16.to_le_bytes());

        assert_eq!(decode_frame(&frame).unwrap_err(), ProtocolError::InvalidRequestCode(999));
    }
}
