/// coinkit - Coin selection, fee planning, building, and signing.
///
/// The flow runs from request to plan to signed transaction:
///
/// 1. `select` / `select_max` pick unspent outputs to cover an amount
///    plus a fee that is re-evaluated as inputs are added.
/// 2. `TransactionBuilder` turns a `SigningRequest` into a
///    `SigningPlan` and the plan into an unsigned `Transaction`.
/// 3. `TransactionSigner` fills in unlocking scripts and witnesses,
///    either signing with registered private keys or compiling
///    externally produced signatures.

pub mod fee;
pub mod plan;
pub mod selector;
pub mod signer;

mod error;
pub use error::SignerError;
pub use plan::{SigningPlan, SigningRequest, TransactionBuilder, UnspentOutput};
pub use signer::{KeyRegistry, ScriptRegistry, TransactionSigner};
