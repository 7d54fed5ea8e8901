//! Chain collaborators: read-only contract queries and transaction
//! submission.
//!
//! The chequebook never talks to a node directly. It is handed a
//! [`ChainOracle`] bound to its escrow contract and token, and a
//! [`TransactionService`] that signs, broadcasts and tracks transactions.
//! Every call is a future; dropping it (for example from inside
//! `tokio::time::timeout`) cancels the call.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chequebook_core::{Address, Amount};
use thiserror::Error;

/// Errors reported by chain collaborators.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC or network failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The node does not know the transaction.
    #[error("unknown transaction {0}")]
    UnknownTransaction(TxHash),

    /// Gave up waiting.
    #[error("timed out: {0}")]
    Timeout(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// A 32-byte transaction hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash(0x{})", &self.to_hex()[..16])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// A transaction to be signed and broadcast by the [`TransactionService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: Amount,
    /// `None` lets the service choose.
    pub gas_price: Option<Amount>,
    /// `0` lets the service estimate.
    pub gas_limit: u64,
}

/// Execution outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub status: TxStatus,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == TxStatus::Success
    }
}

/// Read-only queries against the escrow contract and its token.
#[async_trait]
pub trait ChainOracle: Send + Sync {
    /// Current token balance held by the escrow contract.
    async fn balance(&self) -> ChainResult<Amount>;

    /// Cumulative amount ever redeemed from the escrow by beneficiaries.
    /// Never decreases.
    async fn total_paid_out(&self) -> ChainResult<Amount>;

    /// Token balance of an arbitrary account.
    async fn token_balance_of(&self, owner: &Address) -> ChainResult<Amount>;
}

/// Signs, broadcasts and tracks transactions from the issuer's account.
#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Broadcast a transaction. Returns once it is in the mempool.
    async fn send(&self, request: TxRequest) -> ChainResult<TxHash>;

    /// Wait until the transaction is mined.
    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> ChainResult<TxReceipt>;
}

#[async_trait]
impl<O: ChainOracle + ?Sized> ChainOracle for Arc<O> {
    async fn balance(&self) -> ChainResult<Amount> {
        (**self).balance().await
    }

    async fn total_paid_out(&self) -> ChainResult<Amount> {
        (**self).total_paid_out().await
    }

    async fn token_balance_of(&self, owner: &Address) -> ChainResult<Amount> {
        (**self).token_balance_of(owner).await
    }
}

#[async_trait]
impl<T: TransactionService + ?Sized> TransactionService for Arc<T> {
    async fn send(&self, request: TxRequest) -> ChainResult<TxHash> {
        (**self).send(request).await
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> ChainResult<TxReceipt> {
        (**self).wait_for_receipt(tx_hash).await
    }
}
