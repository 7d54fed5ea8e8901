//! A scripted stand-in for the escrow contract, its token and the
//! transaction pool.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chequebook::calldata::{CHEQUEBOOK_WITHDRAW_SELECTOR, ERC20_TRANSFER_SELECTOR};
use chequebook::{
    ChainError, ChainOracle, ChainResult, TransactionService, TxHash, TxReceipt, TxRequest,
    TxStatus,
};
use chequebook_core::{Address, Amount};

#[derive(Debug, Default)]
struct ChainState {
    balance: Amount,
    total_paid_out: Amount,
    token_balances: HashMap<Address, Amount>,
    sent: Vec<TxRequest>,
    receipts: HashMap<TxHash, TxReceipt>,
    next_nonce: u64,
    revert_next: bool,
    rpc_down: bool,
}

/// Chain double whose balances are set by the test.
///
/// Sent transactions are recorded but have no effect on balances; tests
/// that want a deposit to land call [`ScriptedChain::set_balance`] or
/// [`ScriptedChain::fund`].
#[derive(Debug, Default)]
pub struct ScriptedChain {
    state: Mutex<ChainState>,
}

impl ScriptedChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain with `balance` tokens in the escrow.
    pub fn with_balance(balance: u128) -> Self {
        let chain = Self::new();
        chain.set_balance(Amount::new(balance));
        chain
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_balance(&self, balance: Amount) {
        self.state().balance = balance;
    }

    pub fn set_total_paid_out(&self, total_paid_out: Amount) {
        self.state().total_paid_out = total_paid_out;
    }

    pub fn set_token_balance(&self, owner: Address, balance: Amount) {
        self.state().token_balances.insert(owner, balance);
    }

    /// Add `amount` to the escrow balance.
    pub fn fund(&self, amount: Amount) {
        let mut state = self.state();
        state.balance = Amount::new(state.balance.get() + amount.get());
    }

    /// A beneficiary redeems `amount`: it leaves the escrow and counts as
    /// paid out.
    pub fn cash(&self, amount: Amount) {
        let mut state = self.state();
        state.balance = Amount::new(state.balance.get() - amount.get());
        state.total_paid_out = Amount::new(state.total_paid_out.get() + amount.get());
    }

    /// Make the next sent transaction fail when mined.
    pub fn revert_next(&self) {
        self.state().revert_next = true;
    }

    /// Make every call fail with an RPC error until cleared.
    pub fn set_rpc_down(&self, down: bool) {
        self.state().rpc_down = down;
    }

    /// Every transaction sent so far, in order.
    pub fn sent(&self) -> Vec<TxRequest> {
        self.state().sent.clone()
    }

    /// Sent transactions carrying an ERC-20 `transfer` call.
    pub fn transfers(&self) -> Vec<TxRequest> {
        self.sent_with_selector(&ERC20_TRANSFER_SELECTOR)
    }

    /// Sent transactions carrying a chequebook `withdraw` call.
    pub fn withdrawals(&self) -> Vec<TxRequest> {
        self.sent_with_selector(&CHEQUEBOOK_WITHDRAW_SELECTOR)
    }

    fn sent_with_selector(&self, selector: &[u8; 4]) -> Vec<TxRequest> {
        self.state()
            .sent
            .iter()
            .filter(|request| request.data.starts_with(selector))
            .cloned()
            .collect()
    }

    fn check_rpc(state: &ChainState) -> ChainResult<()> {
        if state.rpc_down {
            return Err(ChainError::Rpc("scripted node unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainOracle for ScriptedChain {
    async fn balance(&self) -> ChainResult<Amount> {
        let state = self.state();
        Self::check_rpc(&state)?;
        Ok(state.balance)
    }

    async fn total_paid_out(&self) -> ChainResult<Amount> {
        let state = self.state();
        Self::check_rpc(&state)?;
        Ok(state.total_paid_out)
    }

    async fn token_balance_of(&self, owner: &Address) -> ChainResult<Amount> {
        let state = self.state();
        Self::check_rpc(&state)?;
        Ok(state.token_balances.get(owner).copied().unwrap_or(Amount::ZERO))
    }
}

#[async_trait]
impl TransactionService for ScriptedChain {
    async fn send(&self, request: TxRequest) -> ChainResult<TxHash> {
        let mut state = self.state();
        Self::check_rpc(&state)?;

        state.next_nonce += 1;
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&state.next_nonce.to_be_bytes());
        let tx_hash = TxHash::from_bytes(hash);

        let status = if std::mem::take(&mut state.revert_next) {
            TxStatus::Failed
        } else {
            TxStatus::Success
        };
        let receipt = TxReceipt {
            tx_hash,
            block_number: state.next_nonce,
            status,
        };
        state.receipts.insert(tx_hash, receipt);
        state.sent.push(request);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> ChainResult<TxReceipt> {
        let state = self.state();
        Self::check_rpc(&state)?;
        state
            .receipts
            .get(tx_hash)
            .cloned()
            .ok_or(ChainError::UnknownTransaction(*tx_hash))
    }
}
