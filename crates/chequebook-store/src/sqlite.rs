//! SQLite implementation of the StateStore trait.
//!
//! This is the primary storage backend for the chequebook. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migration::{self, now_millis};
use crate::traits::{StateStore, WriteBatch};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        // Full sync: a committed issuance must survive power loss.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "FULL")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let key = key.to_string();

        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM ledger_kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let key = key.to_string();
        let value = value.to_vec();

        self.with_conn(move |conn| {
            upsert(conn, &key, &value, now_millis())?;
            Ok(())
        })
        .await
    }

    async fn write_batch(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let now = now_millis();
            for (key, value) in batch {
                upsert(&tx, &key, &value, now)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let lower = prefix.to_string();
        let upper = prefix_upper_bound(prefix);

        self.with_conn(move |conn| {
            // A key range rather than LIKE: it walks the primary-key index,
            // and ledger prefixes contain '_' which LIKE treats as a wildcard.
            let entries = match upper {
                Some(upper) => {
                    let mut stmt = conn.prepare(
                        "SELECT key, value FROM ledger_kv
                         WHERE key >= ?1 AND key < ?2
                         ORDER BY key",
                    )?;
                    let rows = stmt
                        .query_map(params![lower, upper], |row| Ok((row.get(0)?, row.get(1)?)))?
                        .collect::<rusqlite::Result<Vec<(String, Vec<u8>)>>>()?;
                    rows
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT key, value FROM ledger_kv
                         WHERE key >= ?1
                         ORDER BY key",
                    )?;
                    let rows = stmt
                        .query_map(params![lower], |row| Ok((row.get(0)?, row.get(1)?)))?
                        .collect::<rusqlite::Result<Vec<(String, Vec<u8>)>>>()?;
                    rows
                }
            };

            Ok(entries)
        })
        .await
    }
}

/// Smallest string greater than every string starting with `prefix`.
///
/// UTF-8 byte order equals code point order, so bumping the last char that
/// has a successor is enough. `None` means the range is unbounded above.
fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let next = match last {
            '\u{d7ff}' => Some('\u{e000}'),
            c => char::from_u32(u32::from(c) + 1),
        };
        if let Some(next) = next {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

fn upsert(conn: &Connection, key: &str, value: &[u8], now: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO ledger_kv (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, now],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;

    #[tokio::test]
    async fn test_put_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get("missing").await.unwrap(), None);

        store.put("k", b"v1").await.unwrap();
        store.put("k", b"v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn test_prefix_scan_treats_underscore_literally() {
        let store = SqliteStore::open_memory().unwrap();
        store.put("cheque_b", b"2").await.unwrap();
        store.put("cheque_a", b"1").await.unwrap();
        // Would match "cheque_%" under LIKE.
        store.put("chequeXa", b"x").await.unwrap();
        store.put("total", b"t").await.unwrap();

        let entries = store.scan_prefix("cheque_").await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["cheque_a", "cheque_b"]);
    }

    #[test]
    fn test_prefix_upper_bound() {
        assert_eq!(
            prefix_upper_bound("chequebook_last_issued_cheque_").as_deref(),
            Some("chequebook_last_issued_cheque`")
        );
        assert_eq!(prefix_upper_bound("a\u{d7ff}").as_deref(), Some("a\u{e000}"));
        assert_eq!(prefix_upper_bound("a\u{10ffff}").as_deref(), Some("b"));
        assert_eq!(prefix_upper_bound(""), None);
        assert_eq!(prefix_upper_bound("\u{10ffff}"), None);
    }

    #[tokio::test]
    async fn test_batch_is_applied() {
        let store = SqliteStore::open_memory().unwrap();
        let mut batch = WriteBatch::new();
        batch.put("a", vec![1]).put("b", vec![2]).put("a", vec![3]);
        store.write_batch(batch).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(vec![3]));
        assert_eq!(store.get("b").await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put_value("total", &1234u128).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let total: Option<u128> = store.get_value("total").await.unwrap();
        assert_eq!(total, Some(1234));
    }

    mod scan_equivalence {
        use crate::memory::MemoryStore;
        use crate::sqlite::SqliteStore;
        use crate::traits::StateStore;
        use proptest::prelude::*;

        // Small alphabet so prefixes collide often; '_' and '%' exercise
        // the LIKE wildcards, '\x7f' and '\u{ff}' the range upper bound.
        fn key() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop::sample::select(vec!['a', 'b', '_', '%', '\x7f', '\u{ff}']),
                0..5,
            )
            .prop_map(|chars| chars.into_iter().collect())
        }

        fn runtime() -> tokio::runtime::Runtime {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_scan_matches_memory_store(
                keys in prop::collection::vec(key(), 0..24),
                prefix in key(),
            ) {
                let (expected, actual) = runtime().block_on(async {
                    let memory = MemoryStore::new();
                    let sqlite = SqliteStore::open_memory().unwrap();
                    for (i, key) in keys.iter().enumerate() {
                        let value = (i as u32).to_be_bytes();
                        memory.put(key, &value).await.unwrap();
                        sqlite.put(key, &value).await.unwrap();
                    }
                    (
                        memory.scan_prefix(&prefix).await.unwrap(),
                        sqlite.scan_prefix(&prefix).await.unwrap(),
                    )
                });
                prop_assert_eq!(actual, expected);
            }
        }
    }
}
