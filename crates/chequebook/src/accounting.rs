//! Balance accounting.
//!
//! The escrow holds `balance` tokens. Beneficiaries have already redeemed
//! `total_paid_out`, and the issuer has promised `total_issued` in total.
//! What the issuer may still promise is
//!
//! ```text
//! available = balance + total_paid_out - total_issued
//! ```
//!
//! `balance + total_paid_out` is everything ever funded into the escrow
//! (net of withdrawals), so the formula holds no matter how much of the
//! issued value has been cashed.

use chequebook_core::Amount;
use chequebook_store::{StateStore, StoreExt};
use tracing::{debug, warn};

use crate::chain::{ChainOracle, TransactionService};
use crate::error::{ChequebookError, Result};
use crate::registry::TOTAL_ISSUED_KEY;
use crate::service::ChequebookService;

/// The three inputs of the available-balance formula, read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub balance: Amount,
    pub total_paid_out: Amount,
    pub total_issued: Amount,
}

impl BalanceSnapshot {
    /// Amount the issuer may still promise.
    ///
    /// If more has been issued than was ever funded (an owner withdrawal
    /// raced issuance, or the chain reports stale data), nothing is
    /// available and a warning is logged.
    pub fn available(&self) -> Result<Amount> {
        let funded = self
            .balance
            .checked_add(self.total_paid_out)
            .ok_or(ChequebookError::Overflow("balance + total paid out"))?;
        match funded.checked_sub(self.total_issued) {
            Some(available) => Ok(available),
            None => {
                warn!(
                    balance = %self.balance,
                    total_paid_out = %self.total_paid_out,
                    total_issued = %self.total_issued,
                    "issued value exceeds funded value, chequebook is underwater"
                );
                Ok(Amount::ZERO)
            }
        }
    }
}

/// Cross-check of the two ledger views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerAudit {
    /// The persisted issued-total counter.
    pub total_issued: Amount,
    /// Sum of every beneficiary's last cumulative payout.
    pub total_cumulative_payout: Amount,
    /// Number of beneficiaries with a cheque.
    pub beneficiaries: usize,
}

impl LedgerAudit {
    /// Whether the counter equals the sum over last cheques.
    pub fn is_consistent(&self) -> bool {
        self.total_issued == self.total_cumulative_payout
    }
}

impl<S, O, T> ChequebookService<S, O, T>
where
    S: StateStore,
    O: ChainOracle,
    T: TransactionService,
{
    /// Token balance currently held by the escrow contract.
    pub async fn balance(&self) -> Result<Amount> {
        Ok(self.oracle.balance().await?)
    }

    /// Total value ever issued by this chequebook. Zero before the first
    /// cheque.
    pub async fn total_issued(&self) -> Result<Amount> {
        Ok(self
            .store
            .get_value::<Amount>(TOTAL_ISSUED_KEY)
            .await?
            .unwrap_or(Amount::ZERO))
    }

    /// Read the inputs of the available-balance formula.
    pub async fn balance_snapshot(&self) -> Result<BalanceSnapshot> {
        let total_issued = self.total_issued().await?;
        let balance = self.oracle.balance().await?;
        let total_paid_out = self.oracle.total_paid_out().await?;
        Ok(BalanceSnapshot {
            balance,
            total_paid_out,
            total_issued,
        })
    }

    /// Amount that can still be issued as cheques.
    pub async fn available_balance(&self) -> Result<Amount> {
        let available = self.balance_snapshot().await?.available()?;
        debug!(%available, "available balance");
        Ok(available)
    }

    /// Compare the issued-total counter with the sum of last cheques.
    ///
    /// Runs under the issuance lock so the two reads see the same ledger.
    pub async fn audit(&self) -> Result<LedgerAudit> {
        let _guard = self.issue_lock.lock().await;

        let total_issued = self.total_issued().await?;
        let cheques = self.last_cheques().await?;
        let total_cumulative_payout = cheques
            .values()
            .try_fold(Amount::ZERO, |acc, cheque| {
                acc.checked_add(cheque.cumulative_payout())
            })
            .ok_or(ChequebookError::Overflow("sum of cumulative payouts"))?;

        let audit = LedgerAudit {
            total_issued,
            total_cumulative_payout,
            beneficiaries: cheques.len(),
        };
        if !audit.is_consistent() {
            warn!(
                total_issued = %audit.total_issued,
                total_cumulative_payout = %audit.total_cumulative_payout,
                "ledger counter disagrees with last cheques"
            );
        }
        Ok(audit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(balance: u128, total_paid_out: u128, total_issued: u128) -> BalanceSnapshot {
        BalanceSnapshot {
            balance: Amount::new(balance),
            total_paid_out: Amount::new(total_paid_out),
            total_issued: Amount::new(total_issued),
        }
    }

    #[test]
    fn test_available_counts_redeemed_value_as_funded() {
        assert_eq!(snapshot(100, 0, 0).available().unwrap(), Amount::new(100));
        assert_eq!(snapshot(100, 0, 30).available().unwrap(), Amount::new(70));
        // 20 of the 30 issued were cashed: balance dropped by 20.
        assert_eq!(snapshot(80, 20, 30).available().unwrap(), Amount::new(70));
    }

    #[test]
    fn test_available_saturates_when_underwater() {
        assert_eq!(snapshot(10, 0, 30).available().unwrap(), Amount::ZERO);
    }

    #[test]
    fn test_available_overflow_is_an_error() {
        let result = snapshot(u128::MAX, 1, 0).available();
        assert!(matches!(result, Err(ChequebookError::Overflow(_))));
    }

    #[test]
    fn test_audit_consistency() {
        let audit = LedgerAudit {
            total_issued: Amount::new(5),
            total_cumulative_payout: Amount::new(5),
            beneficiaries: 2,
        };
        assert!(audit.is_consistent());
        assert!(!LedgerAudit {
            total_cumulative_payout: Amount::new(4),
            ..audit
        }
        .is_consistent());
    }
}
