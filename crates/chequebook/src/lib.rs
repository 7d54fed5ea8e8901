//! # Chequebook
//!
//! Issuer-side accounting for a cheque-based payment channel.
//!
//! ## Overview
//!
//! A chequebook is an escrow contract holding ERC-20 tokens. Its owner pays
//! peers off-chain by signing cheques: each cheque names a beneficiary and
//! the cumulative amount ever authorized to them. The beneficiary can cash
//! the newest cheque at any time; older ones are superseded.
//!
//! [`ChequebookService`] keeps the owner honest:
//!
//! - **Never over-promise**: a cheque is only issued if the escrow can cover
//!   it together with everything issued before.
//! - **Never lose a cheque**: the signed cheque is delivered first and
//!   recorded second, and the record is a single atomic write.
//! - **Serialize issuance**: concurrent callers are queued, so each sees the
//!   previous caller's effects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chequebook::{ChequebookConfig, ChequebookService};
//! use chequebook::delivery::deliver_fn;
//! use chequebook::core::{Amount, Keypair};
//! use chequebook::store::SqliteStore;
//!
//! async fn example(oracle: impl ChainOracle, transactions: impl TransactionService) {
//!     let config = ChequebookConfig::new(chequebook, token, owner);
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let service =
//!         ChequebookService::new(config, store, oracle, transactions, Keypair::generate())
//!             .unwrap();
//!
//!     let tx = service.deposit(Amount::new(1_000)).await.unwrap();
//!     service.wait_for_deposit(&tx).await.unwrap();
//!
//!     let delivery = deliver_fn(|cheque| async move { send_to_peer(cheque).await });
//!     service.issue(peer, Amount::new(30), &delivery).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `chequebook::core` - Addresses, amounts and signed cheques
//! - `chequebook::store` - Ledger storage abstraction and SQLite

pub mod accounting;
pub mod calldata;
pub mod chain;
pub mod config;
pub mod delivery;
pub mod error;
pub mod funds;
pub mod issuer;
pub mod registry;
pub mod service;

pub use accounting::{BalanceSnapshot, LedgerAudit};
pub use chain::{
    ChainError, ChainOracle, ChainResult, TransactionService, TxHash, TxReceipt, TxRequest,
    TxStatus,
};
pub use config::ChequebookConfig;
pub use delivery::{deliver_fn, ChequeDelivery};
pub use error::{ChequebookError, Result};
pub use registry::{last_issued_cheque_key, LAST_ISSUED_CHEQUE_KEY_PREFIX, TOTAL_ISSUED_KEY};
pub use service::ChequebookService;

/// Re-export core primitives.
pub mod core {
    pub use chequebook_core::*;
}

/// Re-export store types.
pub mod store {
    pub use chequebook_store::*;
}
