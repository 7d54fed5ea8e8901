//! Cheque issuance.

use chequebook_core::{Address, Amount, Cheque, SignedCheque};
use chequebook_store::{StateStore, WriteBatch};
use tracing::{debug, info, warn};

use crate::chain::{ChainOracle, TransactionService};
use crate::delivery::ChequeDelivery;
use crate::error::{ChequebookError, Result};
use crate::registry::{last_issued_cheque_key, TOTAL_ISSUED_KEY};
use crate::service::ChequebookService;

impl<S, O, T> ChequebookService<S, O, T>
where
    S: StateStore,
    O: ChainOracle,
    T: TransactionService,
{
    /// Issue a cheque raising `beneficiary`'s cumulative payout by `amount`.
    ///
    /// The cheque is signed, handed to `delivery`, and only then recorded:
    /// the new last cheque and the raised issued-total are written in one
    /// atomic batch. Calls are serialized, so concurrent issuers never
    /// observe a stale available balance or last cheque.
    ///
    /// # Errors
    ///
    /// - [`ChequebookError::InvalidAmount`] if `amount` is zero
    /// - [`ChequebookError::OutOfFunds`] if `amount` exceeds the available
    ///   balance
    /// - [`ChequebookError::Delivery`] if `delivery` fails; the ledger is
    ///   left untouched
    /// - storage, chain and signing failures, also with the ledger
    ///   untouched
    pub async fn issue<D>(
        &self,
        beneficiary: Address,
        amount: Amount,
        delivery: &D,
    ) -> Result<SignedCheque>
    where
        D: ChequeDelivery + ?Sized,
    {
        if amount.is_zero() {
            return Err(ChequebookError::InvalidAmount);
        }

        let _guard = self.issue_lock.lock().await;

        let snapshot = self.balance_snapshot().await?;
        let available = snapshot.available()?;
        if amount > available {
            warn!(%beneficiary, %amount, %available, "cheque refused, out of funds");
            return Err(ChequebookError::OutOfFunds {
                requested: amount,
                available,
            });
        }

        let previous_payout = match self.last_cheque(&beneficiary).await {
            Ok(cheque) => cheque.cumulative_payout(),
            Err(ChequebookError::NoCheque(_)) => Amount::ZERO,
            Err(e) => return Err(e),
        };
        let cumulative_payout = previous_payout
            .checked_add(amount)
            .ok_or(ChequebookError::Overflow("cumulative payout"))?;
        let total_issued = snapshot
            .total_issued
            .checked_add(amount)
            .ok_or(ChequebookError::Overflow("total issued"))?;

        let signed =
            Cheque::new(self.address(), beneficiary, cumulative_payout).sign(&*self.signer)?;
        debug!(%beneficiary, %cumulative_payout, "cheque signed, delivering");

        delivery
            .deliver(&signed)
            .await
            .map_err(ChequebookError::Delivery)?;

        let mut batch = WriteBatch::new();
        batch
            .put_value(last_issued_cheque_key(&beneficiary), &signed)?
            .put_value(TOTAL_ISSUED_KEY, &total_issued)?;
        self.store.write_batch(batch).await?;

        info!(
            %beneficiary,
            %amount,
            %cumulative_payout,
            %total_issued,
            "cheque issued"
        );
        Ok(signed)
    }
}
