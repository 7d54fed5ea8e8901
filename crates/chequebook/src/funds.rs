//! Moving tokens into and out of the escrow.

use chequebook_core::Amount;
use chequebook_store::StateStore;
use tracing::{info, warn};

use crate::calldata;
use crate::chain::{ChainOracle, TransactionService, TxHash};
use crate::error::{ChequebookError, Result};
use crate::service::ChequebookService;

impl<S, O, T> ChequebookService<S, O, T>
where
    S: StateStore,
    O: ChainOracle,
    T: TransactionService,
{
    /// Transfer `amount` tokens from the owner's account into the escrow.
    ///
    /// Returns as soon as the transfer is broadcast; see
    /// [`wait_for_deposit`](Self::wait_for_deposit).
    pub async fn deposit(&self, amount: Amount) -> Result<TxHash> {
        let owner = self.config.owner;
        let owner_balance = self.oracle.token_balance_of(&owner).await?;
        if owner_balance < amount {
            warn!(%owner, %amount, %owner_balance, "deposit refused, insufficient token balance");
            return Err(ChequebookError::InsufficientFunds {
                requested: amount,
                available: owner_balance,
            });
        }

        let data = calldata::erc20_transfer(&self.address(), amount);
        let tx_hash = self
            .transactions
            .send(self.tx_request(self.config.token, data))
            .await?;

        info!(%amount, %tx_hash, "deposit sent");
        Ok(tx_hash)
    }

    /// Wait for a deposit transaction to be mined.
    ///
    /// Fails with [`ChequebookError::TransactionReverted`] if it was mined
    /// but did not succeed.
    pub async fn wait_for_deposit(&self, tx_hash: &TxHash) -> Result<()> {
        let receipt = self.transactions.wait_for_receipt(tx_hash).await?;
        if !receipt.succeeded() {
            warn!(%tx_hash, block = receipt.block_number, "deposit reverted");
            return Err(ChequebookError::TransactionReverted(*tx_hash));
        }

        info!(%tx_hash, block = receipt.block_number, "deposit confirmed");
        Ok(())
    }

    /// Withdraw `amount` tokens from the escrow back to the owner.
    ///
    /// Only funds not yet promised to beneficiaries may be withdrawn.
    /// Returns as soon as the transaction is broadcast.
    pub async fn withdraw(&self, amount: Amount) -> Result<TxHash> {
        let available = self.available_balance().await?;
        if available < amount {
            warn!(%amount, %available, "withdrawal refused, insufficient available balance");
            return Err(ChequebookError::InsufficientFunds {
                requested: amount,
                available,
            });
        }

        let data = calldata::chequebook_withdraw(amount);
        let tx_hash = self
            .transactions
            .send(self.tx_request(self.address(), data))
            .await?;

        info!(%amount, %tx_hash, "withdrawal sent");
        Ok(tx_hash)
    }
}
