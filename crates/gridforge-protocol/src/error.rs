//! Error types for the protocol layer.
//!
//! When you see a `ProtocolError`, the problem is in turning messages
//! into bytes or back, never in game rules or session state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, an unknown
    /// `"type"` tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but violates protocol rules (e.g. an empty
    /// identity).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
