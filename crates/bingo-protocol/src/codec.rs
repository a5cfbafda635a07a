//! Turning frames into bytes and back.
//!
//! The gateway only ever needs two directions: client frames in
//! ([`Codec::decode_frame`]) and server events out ([`Codec::encode_event`]).
//! Test clients use the mirror pair. All four are provided on top of the
//! generic [`Codec::encode`] / [`Codec::decode`], so a new wire format
//! only has to implement those two.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientEnvelope, ProtocolError, ServerEvent};

/// Largest client frame the server will try to parse.
///
/// Commands are small; the biggest is `update_board` with a 7×7 card.
pub const MAX_FRAME_BYTES: usize = 16 * 1024;

/// Converts protocol values to bytes and back.
///
/// `Send + Sync + 'static` because one codec is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or do
    /// not match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes one client frame.
    ///
    /// # Errors
    /// Empty and oversized frames are refused before parsing with
    /// [`ProtocolError::InvalidMessage`].
    fn decode_frame(&self, data: &[u8]) -> Result<ClientEnvelope, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::InvalidMessage("empty frame".into()));
        }
        if data.len() > MAX_FRAME_BYTES {
            return Err(ProtocolError::InvalidMessage(format!(
                "frame of {} bytes exceeds the {MAX_FRAME_BYTES} byte limit",
                data.len()
            )));
        }
        self.decode(data)
    }

    fn encode_event(&self, event: &ServerEvent) -> Result<Vec<u8>, ProtocolError> {
        self.encode(event)
    }

    /// Client side of [`Codec::decode_frame`].
    fn encode_frame(&self, frame: &ClientEnvelope) -> Result<Vec<u8>, ProtocolError> {
        self.encode(frame)
    }

    /// Client side of [`Codec::encode_event`].
    fn decode_event(&self, data: &[u8]) -> Result<ServerEvent, ProtocolError> {
        self.decode(data)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// JSON via `serde_json`. Browser clients speak this natively.
///
/// ```rust
/// use bingo_protocol::{ClientEnvelope, Codec, Command, JsonCodec, RoomCode};
///
/// let codec = JsonCodec;
/// let frame = ClientEnvelope {
///     ack: None,
///     command: Command::DrawNumber { room_id: RoomCode::new("k7qp") },
/// };
///
/// let bytes = codec.encode_frame(&frame).unwrap();
/// let decoded = codec.decode_frame(&bytes).unwrap();
/// assert_eq!(frame, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Command, ErrorCode};

    #[test]
    fn test_decode_frame_rejects_empty() {
        let err = JsonCodec.decode_frame(b"").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_decode_frame_rejects_oversized() {
        let big = vec![b' '; MAX_FRAME_BYTES + 1];
        let err = JsonCodec.decode_frame(&big).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_decode_frame_malformed_json() {
        let err = JsonCodec.decode_frame(b"{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[test]
    fn test_decode_frame_heartbeat() {
        let frame = br#"{"command":{"event":"heartbeat","data":{"clientTime":42}}}"#;
        let env = JsonCodec.decode_frame(frame).unwrap();
        assert_eq!(env.command, Command::Heartbeat { client_time: 42 });
    }

    #[test]
    fn test_encode_event_is_json_text() {
        let event = ServerEvent::Error {
            code: ErrorCode::BadRequest,
            message: "bad".into(),
        };
        let bytes = JsonCodec.encode_event(&event).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with(r#"{"event":"error""#));
        assert_eq!(JsonCodec.decode_event(&bytes).unwrap(), event);
    }
}
