//! # Chequebook Core
//!
//! Pure primitives for the chequebook: addresses, token amounts, cheques and
//! their signatures.
//!
//! This crate contains no I/O, no storage, no chain access. It is pure
//! computation over the data a chequebook issues.
//!
//! ## Key Types
//!
//! - [`Address`] - 20-byte identity of an account or contract
//! - [`Amount`] - Unsigned token quantity
//! - [`Cheque`] - A cumulative payment authorization to one beneficiary
//! - [`SignedCheque`] - A cheque together with the issuer's signature
//! - [`ChequeSigner`] - The signing capability the issuer is built with
//!
//! ## Canonical Encoding
//!
//! Cheques are signed over a fixed-width binary encoding. See [`canonical`].

pub mod canonical;
pub mod cheque;
pub mod crypto;
pub mod error;
pub mod types;

pub use canonical::{cheque_bytes, CHEQUE_DOMAIN};
pub use cheque::{Cheque, SignedCheque};
pub use crypto::{Blake3Hash, ChequeSigner, Ed25519PublicKey, Keypair, Signature};
pub use error::CoreError;
pub use types::{Address, Amount};
