//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use chequebook::{ChequebookConfig, ChequebookService};
use chequebook_core::{Address, Amount, Ed25519PublicKey, Keypair};

use crate::chain::ScriptedChain;
use crate::store::FaultyStore;

/// Escrow contract used by every fixture.
pub const CHEQUEBOOK_ADDRESS: Address = Address::from_bytes([0xc0; 20]);

/// Token backing the fixture chequebook.
pub const TOKEN_ADDRESS: Address = Address::from_bytes([0x70; 20]);

/// Issuer account funding the fixture chequebook.
pub const OWNER_ADDRESS: Address = Address::from_bytes([0x0e; 20]);

/// A distinct beneficiary per `n`.
pub fn beneficiary(n: u8) -> Address {
    let mut bytes = [0xbe; 20];
    bytes[19] = n;
    Address::from_bytes(bytes)
}

/// The service type every fixture wires up.
pub type TestService = ChequebookService<Arc<FaultyStore>, Arc<ScriptedChain>, Arc<ScriptedChain>>;

/// A chequebook service over a scripted chain and a faulty memory store.
pub struct TestChequebook {
    pub service: TestService,
    pub chain: Arc<ScriptedChain>,
    pub store: Arc<FaultyStore>,
    pub issuer: Ed25519PublicKey,
    seed: [u8; 32],
}

impl TestChequebook {
    /// Fixture with an empty escrow.
    pub fn new() -> Self {
        Self::funded(0)
    }

    /// Fixture with `balance` tokens in the escrow.
    pub fn funded(balance: u128) -> Self {
        Self::with_parts(
            [0x42; 32],
            Arc::new(ScriptedChain::with_balance(balance)),
            Arc::new(FaultyStore::new()),
        )
    }

    /// Fixture over existing chain and store, with a deterministic signer.
    pub fn with_parts(seed: [u8; 32], chain: Arc<ScriptedChain>, store: Arc<FaultyStore>) -> Self {
        let keypair = Keypair::from_seed(&seed);
        let issuer = keypair.public_key();
        let service = ChequebookService::new(
            Self::config(),
            Arc::clone(&store),
            Arc::clone(&chain),
            Arc::clone(&chain),
            keypair,
        )
        .unwrap_or_else(|e| panic!("fixture config rejected: {e}"));
        Self {
            service,
            chain,
            store,
            issuer,
            seed,
        }
    }

    /// Configuration shared by every fixture.
    pub fn config() -> ChequebookConfig {
        ChequebookConfig::new(CHEQUEBOOK_ADDRESS, TOKEN_ADDRESS, OWNER_ADDRESS)
    }

    /// A fresh service over the same chain and store, as after a restart.
    pub fn restart(&self) -> Self {
        Self::with_parts(self.seed, Arc::clone(&self.chain), Arc::clone(&self.store))
    }

    /// Give the owner account `balance` tokens to deposit.
    pub fn fund_owner(&self, balance: u128) {
        self.chain.set_token_balance(OWNER_ADDRESS, Amount::new(balance));
    }

    /// Every ledger entry in key order.
    pub async fn ledger(&self) -> Vec<(String, Vec<u8>)> {
        self.store
            .snapshot()
            .await
            .unwrap_or_else(|e| panic!("ledger snapshot failed: {e}"))
    }
}

impl Default for TestChequebook {
    fn default() -> Self {
        Self::new()
    }
}
