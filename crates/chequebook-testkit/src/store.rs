//! A memory store with switchable faults.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chequebook_store::{MemoryStore, Result, StateStore, StoreError, WriteBatch};

/// [`MemoryStore`] wrapper whose reads and writes can be made to fail.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying store. Bypasses fault injection.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `put` and `write_batch` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Every entry in key order.
    pub async fn snapshot(&self) -> Result<Vec<(String, Vec<u8>)>> {
        self.inner.scan_prefix("").await
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for FaultyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.check(&self.fail_writes, "write")?;
        self.inner.put(key, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        self.check(&self.fail_writes, "write")?;
        self.inner.write_batch(batch).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        self.check(&self.fail_reads, "read")?;
        self.inner.scan_prefix(prefix).await
    }
}
