//! Last-cheque registry.
//!
//! The ledger keeps exactly one entry per beneficiary, the most recent
//! signed cheque, under `chequebook_last_issued_cheque_<40 hex digits>`, and
//! one running counter under `chequebook_total_issued_`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chequebook_core::{Address, SignedCheque};
use chequebook_store::{decode_value, StateStore, StoreExt};
use tracing::debug;

use crate::chain::{ChainOracle, TransactionService};
use crate::error::{ChequebookError, Result};
use crate::service::ChequebookService;

/// Prefix of every last-cheque key.
pub const LAST_ISSUED_CHEQUE_KEY_PREFIX: &str = "chequebook_last_issued_cheque_";

/// Key of the issued-total counter.
pub const TOTAL_ISSUED_KEY: &str = "chequebook_total_issued_";

/// Ledger key of the last cheque issued to `beneficiary`.
pub fn last_issued_cheque_key(beneficiary: &Address) -> String {
    format!("{LAST_ISSUED_CHEQUE_KEY_PREFIX}{}", beneficiary.to_hex())
}

/// Recover the beneficiary from a last-cheque key.
///
/// Only the canonical form written by [`last_issued_cheque_key`] is
/// accepted, so keys and beneficiaries map one to one.
pub fn beneficiary_from_key(key: &str) -> Result<Address> {
    let corrupt = |reason: String| ChequebookError::CorruptState {
        key: key.to_string(),
        reason,
    };

    let suffix = key
        .strip_prefix(LAST_ISSUED_CHEQUE_KEY_PREFIX)
        .ok_or_else(|| corrupt("missing last-cheque prefix".into()))?;
    let beneficiary = Address::from_hex(suffix).map_err(|e| corrupt(e.to_string()))?;
    if beneficiary.to_hex() != suffix {
        return Err(corrupt("beneficiary not in canonical lowercase form".into()));
    }
    Ok(beneficiary)
}

impl<S, O, T> ChequebookService<S, O, T>
where
    S: StateStore,
    O: ChainOracle,
    T: TransactionService,
{
    /// The most recent cheque issued to `beneficiary`.
    ///
    /// Returns [`ChequebookError::NoCheque`] if none was ever issued.
    pub async fn last_cheque(&self, beneficiary: &Address) -> Result<SignedCheque> {
        self.store
            .get_value::<SignedCheque>(&last_issued_cheque_key(beneficiary))
            .await?
            .ok_or(ChequebookError::NoCheque(*beneficiary))
    }

    /// The most recent cheque for every beneficiary that has one.
    ///
    /// Fails with [`ChequebookError::CorruptState`] if any entry under the
    /// last-cheque prefix cannot be interpreted.
    pub async fn last_cheques(&self) -> Result<HashMap<Address, SignedCheque>> {
        let mut cheques = HashMap::new();

        self.store
            .iterate(
                LAST_ISSUED_CHEQUE_KEY_PREFIX,
                |key: &str, value: &[u8]| -> Result<bool> {
                    let beneficiary = beneficiary_from_key(key)?;
                    if let Entry::Vacant(slot) = cheques.entry(beneficiary) {
                        let cheque: SignedCheque =
                            decode_value(value).map_err(|e| ChequebookError::CorruptState {
                                key: key.to_string(),
                                reason: e.to_string(),
                            })?;
                        if cheque.beneficiary() != &beneficiary {
                            return Err(ChequebookError::CorruptState {
                                key: key.to_string(),
                                reason: format!(
                                    "cheque is payable to {}",
                                    cheque.beneficiary()
                                ),
                            });
                        }
                        slot.insert(cheque);
                    }
                    Ok(false)
                },
            )
            .await?;

        debug!(beneficiaries = cheques.len(), "enumerated last cheques");
        Ok(cheques)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let beneficiary = Address::from_bytes([0xab; 20]);
        let key = last_issued_cheque_key(&beneficiary);
        assert_eq!(
            key,
            "chequebook_last_issued_cheque_abababababababababababababababababababab"
        );
        assert_eq!(beneficiary_from_key(&key).unwrap(), beneficiary);
    }

    #[test]
    fn test_counter_key_outside_cheque_prefix() {
        assert!(!TOTAL_ISSUED_KEY.starts_with(LAST_ISSUED_CHEQUE_KEY_PREFIX));
    }

    #[test]
    fn test_malformed_keys_are_corrupt() {
        for key in [
            "chequebook_last_issued_cheque_",
            "chequebook_last_issued_cheque_xyz",
            "chequebook_last_issued_cheque_abababababababababababababababababababab00",
            "chequebook_last_issued_cheque_ABABABABABABABABABABABABABABABABABABABAB",
            "chequebook_last_issued_cheque_0xabababababababababababababababababababab",
            "something_else",
        ] {
            assert!(
                matches!(
                    beneficiary_from_key(key),
                    Err(ChequebookError::CorruptState { .. })
                ),
                "{key} should be rejected"
            );
        }
    }
}
