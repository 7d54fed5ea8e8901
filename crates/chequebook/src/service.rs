//! The chequebook service: one issuer, one escrow contract, one ledger.
//!
//! Operations are split by concern across sibling modules, each adding an
//! `impl` block to [`ChequebookService`]:
//!
//! - `accounting` - balances, the issued-total counter and ledger audits
//! - `issuer` - cheque issuance
//! - `registry` - last-cheque lookup and enumeration
//! - `funds` - deposits and withdrawals

use bytes::Bytes;
use chequebook_core::{Address, Amount, ChequeSigner};
use chequebook_store::StateStore;
use tokio::sync::Mutex;
use tracing::info;

use crate::chain::{ChainOracle, TransactionService, TxRequest};
use crate::config::ChequebookConfig;
use crate::error::Result;

/// Issuer-side view of a chequebook.
///
/// The service is `Send + Sync` and meant to be shared (typically behind an
/// `Arc`) by every task that pays peers. Issuance is serialized internally;
/// reads run concurrently.
pub struct ChequebookService<S, O, T> {
    pub(crate) config: ChequebookConfig,
    pub(crate) store: S,
    pub(crate) oracle: O,
    pub(crate) transactions: T,
    pub(crate) signer: Box<dyn ChequeSigner>,
    /// Held across the whole check-sign-deliver-persist sequence.
    pub(crate) issue_lock: Mutex<()>,
}

impl<S, O, T> ChequebookService<S, O, T>
where
    S: StateStore,
    O: ChainOracle,
    T: TransactionService,
{
    /// Create a chequebook service.
    ///
    /// `oracle` must be bound to `config.chequebook` and `config.token`;
    /// `transactions` must send from `config.owner`.
    pub fn new(
        config: ChequebookConfig,
        store: S,
        oracle: O,
        transactions: T,
        signer: impl ChequeSigner + 'static,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            chequebook = %config.chequebook,
            token = %config.token,
            owner = %config.owner,
            "chequebook service ready"
        );
        Ok(Self {
            config,
            store,
            oracle,
            transactions,
            signer: Box::new(signer),
            issue_lock: Mutex::new(()),
        })
    }

    /// The escrow contract this service issues against.
    pub fn address(&self) -> Address {
        self.config.chequebook
    }

    pub fn config(&self) -> &ChequebookConfig {
        &self.config
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn tx_request(&self, to: Address, data: Bytes) -> TxRequest {
        TxRequest {
            to,
            data,
            value: Amount::ZERO,
            gas_price: self.config.gas_price,
            gas_limit: self.config.gas_limit,
        }
    }
}
