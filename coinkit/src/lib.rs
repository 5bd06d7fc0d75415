#![deny(missing_docs)]

//! coinkit - UTXO transaction construction and signing toolkit.
//!
//! Re-exports all coinkit components for convenient single-crate usage.

pub use coinkit_primitives as primitives;
pub use coinkit_script as script;
pub use coinkit_signer as signer;
pub use coinkit_transaction as transaction;
