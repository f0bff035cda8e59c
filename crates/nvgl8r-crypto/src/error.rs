use thiserror::Error;

/// Errors surfaced by key derivation, encryption and the encoding helpers.
///
/// Nothing in this crate retries or logs these; they propagate to the caller
/// as-is so the calling layer decides what the user sees.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// The GCM tag did not verify: wrong PIN/room, wrong nonce, or tampered data.
    #[error("authentication failed: wrong key or tampered data")]
    Authentication,

    #[error("encryption failed")]
    Encryption,

    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid nonce length: expected {expected}, got {actual}")]
    NonceLength { expected: usize, actual: usize },

    #[error("failed to read byte source: {0}")]
    Io(#[from] std::io::Error),

    #[error("crypto task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CryptoError {
    /// True for integrity failures, which callers usually report as "wrong PIN".
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }

    /// True for malformed base64 or a nonce that decodes to the wrong size.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::NonceLength { .. })
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
