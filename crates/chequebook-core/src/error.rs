//! Error types for the chequebook core.

use thiserror::Error;

/// Core errors that can occur while handling cheques.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Reported by [`ChequeSigner`](crate::ChequeSigner) implementations
    /// whose backend (HSM, remote signer) can fail.
    #[error("signing failed: {0}")]
    Signing(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
