use coinkit_primitives::PrimitivesError;
use coinkit_script::ScriptError;

/// Error types for transaction serialization, deserialization, and
/// signature hash computation.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Input index does not refer to an input of the transaction.
    #[error("input index {index} out of range ({count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// SIGHASH_SINGLE for an input with no matching output, or an
    /// output lookup past the end of the output list.
    #[error("output index {index} out of range ({count} outputs)")]
    OutputIndexOutOfRange { index: usize, count: usize },

    /// Decoded all fields but bytes remain in the buffer.
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    /// Segwit marker byte present but the flag byte is not 0x01.
    #[error("invalid segwit flag: {0:#04x}")]
    InvalidSegwitFlag(u8),

    /// Segwit marker and flag present but every witness stack is empty.
    #[error("witness flag set but no witness data")]
    EmptyWitnessData,

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Truncated or malformed wire data.
    #[error("wire format error: {0}")]
    Wire(#[from] PrimitivesError),

    /// Error from the script layer.
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
}
