//! Golden test vectors for deterministic verification.
//!
//! These pin the exact bytes a cheque is signed over and the exact call
//! data sent to the token and escrow contracts.

use chequebook::calldata;
use chequebook_core::{cheque_bytes, Address, Amount, Cheque, CoreError};
use serde::Serialize;

/// What a vector encodes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorInput {
    /// Canonical cheque bytes.
    Cheque {
        chequebook: &'static str,
        beneficiary: &'static str,
        cumulative_payout: u128,
    },
    /// ERC-20 `transfer` call data.
    Transfer { to: &'static str, amount: u128 },
    /// Chequebook `withdraw` call data.
    Withdraw { amount: u128 },
}

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub input: VectorInput,
    /// Expected encoding (hex).
    pub expected_hex: &'static str,
}

impl GoldenVector {
    /// Encode the vector's input.
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let bytes = match &self.input {
            VectorInput::Cheque {
                chequebook,
                beneficiary,
                cumulative_payout,
            } => cheque_bytes(&Cheque::new(
                Address::from_hex(chequebook)?,
                Address::from_hex(beneficiary)?,
                Amount::new(*cumulative_payout),
            )),
            VectorInput::Transfer { to, amount } => {
                calldata::erc20_transfer(&Address::from_hex(to)?, Amount::new(*amount)).to_vec()
            }
            VectorInput::Withdraw { amount } => {
                calldata::chequebook_withdraw(Amount::new(*amount)).to_vec()
            }
        };
        Ok(bytes)
    }
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "cheque_minimal",
            input: VectorInput::Cheque {
                chequebook: "1111111111111111111111111111111111111111",
                beneficiary: "2222222222222222222222222222222222222222",
                cumulative_payout: 1,
            },
            expected_hex: "636865717565626f6f6b2e6368657175652f763100\
                1111111111111111111111111111111111111111\
                2222222222222222222222222222222222222222\
                0000000000000000000000000000000000000000000000000000000000000001",
        },
        GoldenVector {
            name: "cheque_one_token",
            input: VectorInput::Cheque {
                chequebook: "0x5b38da6a701c568545dcfcb03fcb875f56beddc4",
                beneficiary: "0xAb8483F64d9C6d1EcF9b849Ae677dD3315835cb2",
                cumulative_payout: 1_000_000_000_000_000_000,
            },
            expected_hex: "636865717565626f6f6b2e6368657175652f763100\
                5b38da6a701c568545dcfcb03fcb875f56beddc4\
                ab8483f64d9c6d1ecf9b849ae677dd3315835cb2\
                0000000000000000000000000000000000000000000000000de0b6b3a7640000",
        },
        GoldenVector {
            name: "cheque_max_payout",
            input: VectorInput::Cheque {
                chequebook: "0000000000000000000000000000000000000000",
                beneficiary: "ffffffffffffffffffffffffffffffffffffffff",
                cumulative_payout: u128::MAX,
            },
            expected_hex: "636865717565626f6f6b2e6368657175652f763100\
                0000000000000000000000000000000000000000\
                ffffffffffffffffffffffffffffffffffffffff\
                00000000000000000000000000000000ffffffffffffffffffffffffffffffff",
        },
        GoldenVector {
            name: "transfer_1000",
            input: VectorInput::Transfer {
                to: "5b38da6a701c568545dcfcb03fcb875f56beddc4",
                amount: 1000,
            },
            expected_hex: "a9059cbb\
                0000000000000000000000005b38da6a701c568545dcfcb03fcb875f56beddc4\
                00000000000000000000000000000000000000000000000000000000000003e8",
        },
        GoldenVector {
            name: "withdraw_one_token",
            input: VectorInput::Withdraw {
                amount: 1_000_000_000_000_000_000,
            },
            expected_hex: "2e1a7d4d\
                0000000000000000000000000000000000000000000000000de0b6b3a7640000",
        },
        GoldenVector {
            name: "withdraw_zero",
            input: VectorInput::Withdraw { amount: 0 },
            expected_hex: "2e1a7d4d\
                0000000000000000000000000000000000000000000000000000000000000000",
        },
    ]
}

/// Check every vector. Returns `(name, matches, actual hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match v.encode() {
            Ok(bytes) => {
                let actual = hex::encode(bytes);
                (v.name.to_string(), actual == v.expected_hex, actual)
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}

/// All vectors as pretty JSON, for comparison with other implementations.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
