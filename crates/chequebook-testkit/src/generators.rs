//! Proptest generators for property-based testing.

use proptest::prelude::*;

use chequebook_core::{Address, Amount, Cheque, Keypair};

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a positive amount no larger than `max`.
pub fn amount(max: u128) -> impl Strategy<Value = Amount> {
    (1..=max.max(1)).prop_map(Amount::new)
}

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate an unsigned cheque.
pub fn cheque() -> impl Strategy<Value = Cheque> {
    (address(), address(), any::<u128>())
        .prop_map(|(chequebook, beneficiary, payout)| {
            Cheque::new(chequebook, beneficiary, Amount::new(payout))
        })
}

/// A funded escrow followed by a sequence of issuance attempts.
///
/// Beneficiaries are drawn from a small pool so most scripts pay the same
/// beneficiary more than once.
#[derive(Debug, Clone)]
pub struct IssueScript {
    pub balance: u128,
    /// `(beneficiary index, amount)` pairs, in issue order.
    pub steps: Vec<(u8, u128)>,
}

impl IssueScript {
    /// Sum of every attempted amount.
    pub fn attempted(&self) -> u128 {
        self.steps.iter().map(|(_, amount)| amount).sum()
    }
}

impl Arbitrary for IssueScript {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            0u128..=1_000,                                           // balance
            prop::collection::vec((0u8..4, 1u128..=200), 0..=24),   // steps
        )
            .prop_map(|(balance, steps)| IssueScript { balance, steps })
            .boxed()
    }
}
