//! Error types for the chequebook service.

use chequebook_core::{Address, Amount, CoreError};
use chequebook_store::StoreError;
use thiserror::Error;

use crate::chain::{ChainError, TxHash};

/// Errors that can occur during chequebook operations.
#[derive(Debug, Error)]
pub enum ChequebookError {
    /// The cheque would exceed the funds not yet promised to anyone.
    #[error("chequebook out of funds: requested {requested}, available {available}")]
    OutOfFunds { requested: Amount, available: Amount },

    /// A deposit or withdrawal exceeds the relevant balance.
    #[error("insufficient token balance: requested {requested}, available {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    /// No cheque has been issued to this beneficiary yet.
    #[error("no cheque issued to {0}")]
    NoCheque(Address),

    /// The transaction was mined but failed.
    #[error("transaction {0} reverted")]
    TransactionReverted(TxHash),

    /// A ledger entry could not be interpreted.
    #[error("corrupt ledger state at {key}: {reason}")]
    CorruptState { key: String, reason: String },

    /// The caller's delivery capability failed. Nothing was persisted.
    #[error("cheque delivery failed: {0}")]
    Delivery(#[source] anyhow::Error),

    /// Cheques must carry a positive amount.
    #[error("cheque amount must be greater than zero")]
    InvalidAmount,

    /// Token arithmetic left the representable range.
    #[error("amount overflow computing {0}")]
    Overflow(&'static str),

    /// Configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Signing error.
    #[error("signing error: {0}")]
    Signing(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Chain access error.
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Result type for chequebook operations.
pub type Result<T> = std::result::Result<T, ChequebookError>;
