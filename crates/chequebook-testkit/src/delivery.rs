//! Delivery doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chequebook::ChequeDelivery;
use chequebook_core::SignedCheque;

/// Accepts every cheque and remembers it.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<SignedCheque>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivered cheque, oldest first.
    pub fn delivered(&self) -> Vec<SignedCheque> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<SignedCheque> {
        self.delivered().pop()
    }
}

#[async_trait]
impl ChequeDelivery for RecordingDelivery {
    async fn deliver(&self, cheque: &SignedCheque) -> anyhow::Result<()> {
        self.delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(cheque.clone());
        Ok(())
    }
}

/// Rejects every cheque with a fixed message.
#[derive(Debug)]
pub struct FailingDelivery {
    message: String,
    attempts: AtomicUsize,
}

impl FailingDelivery {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChequeDelivery for FailingDelivery {
    async fn deliver(&self, _cheque: &SignedCheque) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("{}", self.message))
    }
}

/// Sleeps inside every delivery and tracks how many overlap.
#[derive(Debug)]
pub struct OverlapProbe {
    pause: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl OverlapProbe {
    pub fn new(pause: Duration) -> Self {
        Self {
            pause,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    /// Largest number of deliveries ever running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChequeDelivery for OverlapProbe {
    async fn deliver(&self, _cheque: &SignedCheque) -> anyhow::Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.pause).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
