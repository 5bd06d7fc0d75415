/// Error types for script operations.
///
/// Covers parsing errors, encoding/decoding failures, and script
/// construction problems.  Classification itself never errors: an
/// unrecognized pattern classifies as `ScriptTemplate::Unknown`.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Generic invalid script error.
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Attempted to use append_opcodes for a push data opcode.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data")]
    InvalidOpcodeData,

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A public key with an invalid length or prefix was supplied.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A multisig threshold outside 1..=key_count was supplied.
    #[error("invalid multisig threshold: {required} of {total}")]
    InvalidThreshold { required: usize, total: usize },

    /// Not enough data in script to complete a push operation.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds maximum allowed size.
    #[error("data too big")]
    DataTooBig,

    /// Script index is out of range.
    #[error("script index out of range")]
    IndexOutOfRange,

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] coinkit_primitives::PrimitivesError),
}
