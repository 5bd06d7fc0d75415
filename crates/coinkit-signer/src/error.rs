use coinkit_primitives::PrimitivesError;
use coinkit_script::ScriptError;
use coinkit_transaction::TransactionError;

/// Error types for selection, planning, and signing.
///
/// Per-input failures carry the index of the offending input so callers
/// can report which unspent output broke the signing run.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The unspent outputs cannot cover the requested amount plus fee.
    #[error("insufficient funds: {available} available, {required} required")]
    InsufficientFunds { available: u64, required: u64 },

    /// A destination or change script required by the plan is empty.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// No registered private key matches the input's locking script.
    #[error("no private key for input {input_index}")]
    MissingPrivateKey { input_index: usize },

    /// No registered redeem or witness script matches the script hash.
    #[error("no redeem script for input {input_index}")]
    MissingRedeemScript { input_index: usize },

    /// The input's locking script is not a spendable template.
    #[error("unsupported script type for input {input_index}: {template:?}")]
    UnsupportedScriptType {
        input_index: usize,
        template: coinkit_script::ScriptTemplate,
    },

    /// A supplied signature does not verify against the input's digest.
    #[error("signature verification failed for input {input_index}")]
    SignatureVerificationFailed { input_index: usize },

    /// Structurally invalid request: zero amount, mismatched list
    /// lengths, or similar.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Error from the transaction layer (sighash, serialization).
    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    /// Error from the script layer.
    #[error("script error: {0}")]
    Script(#[from] ScriptError),

    /// Error from the primitives layer (keys, signatures).
    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}
