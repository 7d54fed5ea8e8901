//! # Chequebook Testkit
//!
//! Testing utilities for the chequebook.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scripted chain**: An in-process escrow contract, token and
//!   transaction pool whose state tests set directly
//! - **Deliveries**: Recording and failing [`ChequeDelivery`] doubles
//! - **Faulty store**: A memory store whose reads or writes can be made to fail
//! - **Fixtures**: A ready-wired [`TestChequebook`]
//! - **Golden vectors**: Fixed byte encodings of cheques and call data
//! - **Generators**: Proptest strategies for addresses, amounts and issuance
//!   scripts
//!
//! ## Test Fixtures
//!
//! ```rust
//! use chequebook_testkit::{beneficiary, RecordingDelivery, TestChequebook};
//! use chequebook::core::Amount;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let fixture = TestChequebook::funded(100);
//! let delivery = RecordingDelivery::new();
//!
//! let cheque = fixture
//!     .service
//!     .issue(beneficiary(1), Amount::new(30), &delivery)
//!     .await
//!     .unwrap();
//! assert_eq!(cheque.cumulative_payout(), Amount::new(30));
//! assert_eq!(delivery.delivered().len(), 1);
//! # });
//! ```
//!
//! [`ChequeDelivery`]: chequebook::ChequeDelivery

pub mod chain;
pub mod delivery;
pub mod fixtures;
pub mod generators;
pub mod store;
pub mod vectors;

pub use chain::ScriptedChain;
pub use delivery::{FailingDelivery, OverlapProbe, RecordingDelivery};
pub use fixtures::{
    beneficiary, TestChequebook, TestService, CHEQUEBOOK_ADDRESS, OWNER_ADDRESS, TOKEN_ADDRESS,
};
pub use generators::{address, amount, IssueScript};
pub use store::FaultyStore;
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};

/// Install a test-friendly tracing subscriber. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}
