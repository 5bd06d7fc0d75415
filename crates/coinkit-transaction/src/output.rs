/// Transaction output type.

use coinkit_primitives::util::{WireReader, WireWriter};
use coinkit_script::Script;
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// A transaction output: an amount locked by a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    /// Amount in base units (satoshis).
    pub value: u64,
    /// Locking script (scriptPubKey).
    pub script: Script,
}

impl TransactionOutput {
    /// Create a new output.
    ///
    /// # Arguments
    /// * `value` - Amount in base units.
    /// * `script` - The locking script.
    pub fn new(value: u64, script: Script) -> Self {
        TransactionOutput { value, script }
    }

    /// Serialize the output in wire format: value (8 bytes LE) then the
    /// var-length locking script.
    pub(crate) fn write(&self, writer: &mut WireWriter) {
        writer.write_u64_le(self.value);
        writer.write_bytes(&self.script.encode());
    }

    pub(crate) fn read(reader: &mut WireReader<'_>) -> Result<Self, TransactionError> {
        let value = reader.read_u64_le()?;
        let script = Script::from_bytes(reader.read_var_bytes()?);
        Ok(TransactionOutput { value, script })
    }

    /// Serialize the output to a standalone byte vector. Used by the
    /// BIP143 sighash for the SIGHASH_SINGLE output commitment.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(8 + 1 + self.script.len());
        self.write(&mut writer);
        writer.into_bytes()
    }
}
