//! StateStore trait: the abstract interface for ledger persistence.
//!
//! This trait allows the chequebook to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// A group of puts applied all-or-nothing by [`StateStore::write_batch`].
///
/// Puts are applied in insertion order; a later put to the same key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    puts: Vec<(String, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw put.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) -> &mut Self {
        self.puts.push((key.into(), value));
        self
    }

    /// Queue a CBOR-encoded put.
    pub fn put_value<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self> {
        let bytes = encode_value(value)?;
        Ok(self.put(key, bytes))
    }

    pub fn len(&self) -> usize {
        self.puts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.puts.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl IntoIterator for WriteBatch {
    type Item = (String, Vec<u8>);
    type IntoIter = std::vec::IntoIter<(String, Vec<u8>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.puts.into_iter()
    }
}

/// The StateStore trait: async key/value interface for ledger state.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, `spawn_blocking` is used internally to avoid blocking the
/// runtime.
///
/// # Design Notes
///
/// - **Absence is not an error**: `get` returns `Ok(None)` for a missing key.
/// - **Upserts**: `put` overwrites any existing value.
/// - **Atomic batches**: `write_batch` makes every put visible or none.
/// - **Ordered scans**: `scan_prefix` returns entries sorted by key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Insert or overwrite the value under `key`.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Apply every put in `batch` atomically.
    async fn write_batch(&self, batch: WriteBatch) -> Result<()>;

    /// All entries whose key starts with `prefix`, ordered by key.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;
}

#[async_trait]
impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).put(key, value).await
    }

    async fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        (**self).write_batch(batch).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        (**self).scan_prefix(prefix).await
    }
}

/// Extension trait for common store patterns.
pub trait StoreExt: StateStore {
    /// Get and CBOR-decode the value under `key`.
    fn get_value<T>(&self, key: &str) -> impl Future<Output = Result<Option<T>>> + Send
    where
        T: DeserializeOwned + Send;

    /// CBOR-encode `value` and put it under `key`.
    fn put_value<T>(&self, key: &str, value: &T) -> impl Future<Output = Result<()>> + Send
    where
        T: Serialize + Sync + ?Sized;

    /// Visit every entry under `prefix` in key order.
    ///
    /// The visitor returns `Ok(true)` to stop early. A visitor error aborts
    /// the iteration and is returned as-is.
    fn iterate<F, E>(
        &self,
        prefix: &str,
        visit: F,
    ) -> impl Future<Output = std::result::Result<(), E>> + Send
    where
        F: FnMut(&str, &[u8]) -> std::result::Result<bool, E> + Send,
        E: From<StoreError> + Send;
}

impl<S: StateStore + ?Sized> StoreExt for S {
    async fn get_value<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(bytes) => decode_value(&bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn put_value<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = encode_value(value)?;
        self.put(key, &bytes).await
    }

    async fn iterate<F, E>(&self, prefix: &str, mut visit: F) -> std::result::Result<(), E>
    where
        F: FnMut(&str, &[u8]) -> std::result::Result<bool, E> + Send,
        E: From<StoreError> + Send,
    {
        let entries = self.scan_prefix(prefix).await?;
        for (key, value) in &entries {
            if visit(key.as_str(), value.as_slice())? {
                break;
            }
        }
        Ok(())
    }
}

/// Encode a value as CBOR.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Decode a CBOR value.
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}
