//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means a frame could not be turned into (or
//! out of) bytes. Game-rule failures never show up here; they travel to
//! clients as an [`ErrorCode`](crate::ErrorCode) inside a reply.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown `event` name,
    /// a missing field, or a value of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but breaks a protocol rule.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
