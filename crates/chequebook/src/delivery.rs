//! The capability through which an issued cheque reaches its beneficiary.

use std::future::Future;

use async_trait::async_trait;
use chequebook_core::SignedCheque;

/// Hands a freshly signed cheque to the beneficiary (or whatever sits in
/// front of them).
///
/// [`ChequebookService::issue`](crate::ChequebookService::issue) calls this
/// exactly once per cheque, while holding the issuance lock and before the
/// ledger is touched. A failure aborts the issuance and the ledger keeps its
/// previous state.
#[async_trait]
pub trait ChequeDelivery: Send + Sync {
    async fn deliver(&self, cheque: &SignedCheque) -> anyhow::Result<()>;
}

/// Delivery backed by an async closure. Built with [`deliver_fn`].
#[derive(Clone)]
pub struct DeliverFn<F>(F);

/// Wrap an async closure as a [`ChequeDelivery`].
///
/// ```rust
/// use chequebook::delivery::deliver_fn;
///
/// let delivery = deliver_fn(|cheque| async move {
///     println!("sending {} to {}", cheque.cumulative_payout(), cheque.beneficiary());
///     Ok::<_, anyhow::Error>(())
/// });
/// # let _ = delivery;
/// ```
pub fn deliver_fn<F, Fut>(f: F) -> DeliverFn<F>
where
    F: Fn(SignedCheque) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    DeliverFn(f)
}

#[async_trait]
impl<F, Fut> ChequeDelivery for DeliverFn<F>
where
    F: Fn(SignedCheque) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn deliver(&self, cheque: &SignedCheque) -> anyhow::Result<()> {
        (self.0)(cheque.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chequebook_core::{Address, Amount, Cheque, Keypair};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_deliver_fn_receives_each_cheque() {
        let seen = Arc::new(AtomicU32::new(0));
        let delivery = {
            let seen = Arc::clone(&seen);
            deliver_fn(move |cheque: SignedCheque| {
                let seen = Arc::clone(&seen);
                async move {
                    anyhow::ensure!(!cheque.cumulative_payout().is_zero(), "empty cheque");
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };

        let keypair = Keypair::from_seed(&[3; 32]);
        let cheque = |payout| {
            Cheque::new(Address::ZERO, Address::ZERO, Amount::new(payout))
                .sign(&keypair)
                .unwrap()
        };

        delivery.deliver(&cheque(5)).await.unwrap();
        assert!(delivery.deliver(&cheque(0)).await.is_err());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
