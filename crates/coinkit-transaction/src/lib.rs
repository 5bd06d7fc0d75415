/// coinkit - Transaction model, wire serialization, and sighash.
///
/// Provides the `Transaction`, `TransactionInput`, and
/// `TransactionOutput` types with full wire-format encoding and
/// decoding (legacy and segregated-witness), transaction identifiers
/// (`txid`/`wtxid`), and the legacy and BIP143 signature hash
/// algorithms.

pub mod input;
pub mod output;
pub mod sighash;
pub mod transaction;

mod error;
pub use error::TransactionError;
pub use input::{OutPoint, TransactionInput, DEFAULT_SEQUENCE};
pub use output::TransactionOutput;
pub use transaction::Transaction;
