/// coinkit - Script parsing, classification, and construction.
///
/// Provides the `Script` type, opcode definitions, script chunk parsing,
/// and the closed `ScriptTemplate` classification over the standard
/// locking script patterns (P2PKH, P2SH, P2WPKH, P2WSH, P2PK, multisig,
/// null-data).

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod template;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use chunk::ScriptChunk;
pub use template::{MultisigInfo, ScriptTemplate};
