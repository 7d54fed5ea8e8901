//! Configuration for the chequebook service.

use chequebook_core::{Address, Amount};

use crate::error::{ChequebookError, Result};

/// Configuration for a [`ChequebookService`](crate::ChequebookService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChequebookConfig {
    /// The escrow contract cheques are drawn against.
    pub chequebook: Address,
    /// The ERC-20 token backing the chequebook.
    pub token: Address,
    /// The issuer's own account; deposits are paid from here.
    pub owner: Address,
    /// Gas price for submitted transactions. `None` lets the transaction
    /// service pick one.
    pub gas_price: Option<Amount>,
    /// Gas limit for submitted transactions. `0` lets the transaction
    /// service estimate.
    pub gas_limit: u64,
}

impl ChequebookConfig {
    pub fn new(chequebook: Address, token: Address, owner: Address) -> Self {
        Self {
            chequebook,
            token,
            owner,
            gas_price: None,
            gas_limit: 0,
        }
    }

    pub fn with_gas_price(mut self, gas_price: Amount) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Reject configurations that could only ever produce failing calls.
    pub fn validate(&self) -> Result<()> {
        if self.chequebook == Address::ZERO {
            return Err(ChequebookError::InvalidConfig(
                "chequebook address is zero".into(),
            ));
        }
        if self.token == Address::ZERO {
            return Err(ChequebookError::InvalidConfig("token address is zero".into()));
        }
        if self.chequebook == self.token {
            return Err(ChequebookError::InvalidConfig(
                "chequebook and token addresses are identical".into(),
            ));
        }
        Ok(())
    }
}
