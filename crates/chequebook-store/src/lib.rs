//! # Chequebook Store
//!
//! The ledger store behind the chequebook. Provides a trait-based key/value
//! interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The chequebook keeps two kinds of durable state: the last cheque issued
//! to each beneficiary and a running total of everything issued. Both live
//! in a flat string-keyed store behind the [`StateStore`] trait, so the
//! service can be backed by [`SqliteStore`] in production and
//! [`MemoryStore`] in tests.
//!
//! ## Key Types
//!
//! - [`StateStore`] - The async trait for all storage operations
//! - [`StoreExt`] - Typed (CBOR) values and visitor-style iteration
//! - [`WriteBatch`] - A group of puts applied all-or-nothing
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chequebook_store::{SqliteStore, StateStore, StoreExt, WriteBatch};
//!
//! async fn example() {
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     store.put_value("counter", &7u64).await.unwrap();
//!     let counter: Option<u64> = store.get_value("counter").await.unwrap();
//!     assert_eq!(counter, Some(7));
//!
//!     let mut batch = WriteBatch::new();
//!     batch.put("a", vec![1]).put("b", vec![2]);
//!     store.write_batch(batch).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Batches are atomic**: either every put in a [`WriteBatch`] is visible
//!   or none is, including across a crash for [`SqliteStore`].
//! - **Prefix scans are ordered**: entries come back sorted by key.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{decode_value, encode_value, StateStore, StoreExt, WriteBatch};
