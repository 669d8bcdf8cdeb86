use thiserror::Error;

/// Errors returned by protocol-level decoding and signing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The configured MAC key is not a valid strkey-encoded seed.
    #[error("invalid MAC key")]
    InvalidMacKey,

    /// The receive response body is not a valid envelope.
    #[error("compliance envelope decode failed: {0}")]
    Envelope(serde_json::Error),

    /// The envelope's `data` field does not parse as auth data.
    #[error("compliance auth data decode failed: {0}")]
    AuthData(serde_json::Error),

    /// The auth data's `memo` field does not parse as a memo document.
    #[error("compliance memo decode failed: {0}")]
    Memo(serde_json::Error),
}
