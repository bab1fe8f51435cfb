//! Request, response, and message-kind codes.
//!
//! Codes are serialized as Little Endian `u16` values in the frame headers
//! (`u8` for message kinds inside message bodies). The `#[repr]` attributes
//! pin the numeric values for wire compatibility.
//!
//! Unknown request codes MUST be rejected explicitly by the dispatcher,
//! never silently ignored. Message kinds are the one exception: the relay
//! carries the kind byte verbatim and does not reject values outside the
//! known set — the tag is opaque to it.

/// Request operation codes (client → server)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum RequestCode {
    /// Register a new client (fixed 415-byte body)
    Register = 1000,
    /// Enumerate all registered clients (no body)
    ListClients = 1001,
    /// Fetch a client's stored credential (16-byte body)
    GetPublicKey = 1002,
    /// Deposit a message into a client's mailbox (21-byte sub-header + content)
    SendMessage = 1003,
    /// Drain the requester's own mailbox (no body)
    PullMessages = 1004,
}

impl RequestCode {
    /// Convert to raw u16 value
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Convert from raw u16 value.
    ///
    /// Returns `None` if the value doesn't correspond to a known request
    /// code. Total over all u16 values; never panics.
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Register),
            1001 => Some(Self::ListClients),
            1002 => Some(Self::GetPublicKey),
            1003 => Some(Self::SendMessage),
            1004 => Some(Self::PullMessages),
            _ => None,
        }
    }
}

/// Response codes (server → client)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResponseCode {
    /// Registration accepted; body carries the new 16-byte id
    RegisterOk = 2000,
    /// Registry snapshot; body repeats id + padded name per client
    ClientList = 2001,
    /// Credential lookup hit; body carries id + credential
    PublicKey = 2002,
    /// Message stored; body carries target id + message id
    MessageAccepted = 2003,
    /// Drained mailbox contents; body repeats one record per message
    PendingMessages = 2004,
    /// Request failed; no body
    Failure = 9000,
}

impl ResponseCode {
    /// Convert to raw u16 value
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Convert from raw u16 value.
    ///
    /// Returns `None` for values outside the known response set.
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            2000 => Some(Self::RegisterOk),
            2001 => Some(Self::ClientList),
            2002 => Some(Self::PublicKey),
            2003 => Some(Self::MessageAccepted),
            2004 => Some(Self::PendingMessages),
            9000 => Some(Self::Failure),
            _ => None,
        }
    }
}

/// Message kind tags carried inside send/pull bodies.
///
/// The relay stores and forwards the raw byte; this enum exists for
/// clients and tests that want to name the known kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// Ask the peer for a symmetric key
    SymmetricKeyRequest = 1,
    /// Deliver a symmetric key to the peer
    SymmetricKeyDelivery = 2,
    /// Text message
    Text = 3,
    /// File transfer
    File = 4,
}

impl MessageKind {
    /// Convert to raw u8 value
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Convert from raw u8 value; `None` for kinds this crate doesn't name
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SymmetricKeyRequest),
            2 => Some(Self::SymmetricKeyDelivery),
            3 => Some(Self::Text),
            4 => Some(Self::File),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_code_round_trip() {
        let codes = [
            RequestCode::Register,
            RequestCode::ListClients,
            RequestCode::GetPublicKey,
            RequestCode::SendMessage,
            RequestCode::PullMessages,
        ];

        for code in codes {
            assert_eq!(RequestCode::from_u16(code.to_u16()), Some(code));
        }
    }

    #[test]
    fn response_code_round_trip() {
        let codes = [
            ResponseCode::RegisterOk,
            ResponseCode::ClientList,
            ResponseCode::PublicKey,
            ResponseCode::MessageAccepted,
            ResponseCode::PendingMessages,
            ResponseCode::Failure,
        ];

        for code in codes {
            assert_eq!(ResponseCode::from_u16(code.to_u16()), Some(code));
        }
    }

    #[test]
    fn invalid_codes() {
        assert_eq!(RequestCode::from_u16(0), None);
        assert_eq!(RequestCode::from_u16(1005), None);
        assert_eq!(RequestCode::from_u16(2000), None);
        assert_eq!(ResponseCode::from_u16(1000), None);
        assert_eq!(ResponseCode::from_u16(9001), None);
    }

    #[test]
    fn message_kind_round_trip() {
        for value in 1..=4u8 {
            let kind = MessageKind::from_u8(value).expect("known kind");
            assert_eq!(kind.to_u8(), value);
        }
        assert_eq!(MessageKind::from_u8(0), None);
        assert_eq!(MessageKind::from_u8(5), None);
    }
}
