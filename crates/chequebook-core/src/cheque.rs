//! Cheques: cumulative payment authorizations from a chequebook to a
//! beneficiary.

use serde::{Deserialize, Serialize};

use crate::canonical::cheque_bytes;
use crate::crypto::{Blake3Hash, ChequeSigner, Ed25519PublicKey, Signature};
use crate::error::CoreError;
use crate::types::{Address, Amount};

/// A point-in-time payment authorization.
///
/// `cumulative_payout` is the total ever authorized to `beneficiary` from
/// `chequebook`; a newer cheque supersedes every older one for the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cheque {
    /// The escrow contract this cheque is drawn against.
    pub chequebook: Address,
    /// The payee.
    pub beneficiary: Address,
    /// Total value authorized to the beneficiary so far.
    pub cumulative_payout: Amount,
}

impl Cheque {
    pub fn new(chequebook: Address, beneficiary: Address, cumulative_payout: Amount) -> Self {
        Self {
            chequebook,
            beneficiary,
            cumulative_payout,
        }
    }

    /// Canonical encoding, see [`crate::canonical`].
    pub fn to_bytes(&self) -> Vec<u8> {
        cheque_bytes(self)
    }

    /// The message a signer commits to.
    pub fn digest(&self) -> Blake3Hash {
        Blake3Hash::hash(&self.to_bytes())
    }

    /// Sign this cheque, consuming it.
    pub fn sign(self, signer: &dyn ChequeSigner) -> Result<SignedCheque, CoreError> {
        let signature = signer.sign(&self)?;
        Ok(SignedCheque {
            cheque: self,
            signature,
        })
    }
}

/// A cheque together with the issuer's signature over its digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCheque {
    pub cheque: Cheque,
    pub signature: Signature,
}

impl SignedCheque {
    pub fn chequebook(&self) -> &Address {
        &self.cheque.chequebook
    }

    pub fn beneficiary(&self) -> &Address {
        &self.cheque.beneficiary
    }

    pub fn cumulative_payout(&self) -> Amount {
        self.cheque.cumulative_payout
    }

    /// Check the signature against an Ed25519 issuer key.
    pub fn verify(&self, issuer: &Ed25519PublicKey) -> Result<(), CoreError> {
        issuer.verify(self.cheque.digest().as_bytes(), &self.signature)
    }
}
