//! Unified error types for the bingo server.

use bingo_protocol::{ErrorCode, ErrorReply, PlayerId, ProtocolError, RoomCode};
use bingo_room::RoomError;
use bingo_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes generate `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BingoError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room refused a command.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The server configuration is unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Why the gateway refused a command before or after it reached a room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The connection is not bound to the room it addressed.
    #[error("not joined to room {0}")]
    NotJoined(RoomCode),

    /// The command names a player other than the one this connection
    /// joined as.
    #[error("connection is bound to player {bound}, not {given}")]
    PlayerMismatch { bound: PlayerId, given: PlayerId },
}

impl GatewayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Room(e) => e.code(),
            Self::NotJoined(_) => ErrorCode::NotJoined,
            Self::PlayerMismatch { .. } => ErrorCode::PlayerMismatch,
        }
    }

    pub fn to_reply(&self) -> ErrorReply {
        ErrorReply::new(self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let bingo_err: BingoError = err.into();
        assert!(matches!(bingo_err, BingoError::Transport(_)));
        assert!(bingo_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let bingo_err: BingoError = err.into();
        assert!(matches!(bingo_err, BingoError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let bingo_err: BingoError = RoomError::RoomFull.into();
        assert!(matches!(bingo_err, BingoError::Room(_)));
    }

    #[test]
    fn test_gateway_codes() {
        let room = GatewayError::from(RoomError::NotYourTurn);
        assert_eq!(room.code(), ErrorCode::NotYourTurn);

        let not_joined = GatewayError::NotJoined(RoomCode::new("ABCD"));
        assert_eq!(not_joined.code(), ErrorCode::NotJoined);
        assert_eq!(not_joined.to_reply().message, "not joined to room ABCD");

        let mismatch = GatewayError::PlayerMismatch {
            bound: PlayerId::new("a"),
            given: PlayerId::new("b"),
        };
        assert_eq!(mismatch.code(), ErrorCode::PlayerMismatch);
    }
}
