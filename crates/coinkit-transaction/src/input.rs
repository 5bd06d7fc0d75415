/// Transaction input types.
///
/// An input spends a previous output identified by an `OutPoint` and
/// carries the unlocking script, the sequence number, and (for segwit
/// spends) the witness stack.

use std::fmt;

use coinkit_primitives::util::{VarInt, WireReader, WireWriter};
use coinkit_script::Script;
use serde::{Deserialize, Serialize};

use crate::TransactionError;

/// Default sequence number: final, no relative lock-time.
pub const DEFAULT_SEQUENCE: u32 = 0xFFFF_FFFF;

/// Reference to a specific output of a previous transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction id of the funding transaction, in internal byte order.
    #[serde(with = "txid_hex")]
    pub txid: [u8; 32],
    /// Index of the output being spent.
    pub index: u32,
}

impl OutPoint {
    /// Create a new outpoint.
    pub fn new(txid: [u8; 32], index: u32) -> Self {
        OutPoint { txid, index }
    }

    /// Parse an outpoint txid from its display (reversed hex) form.
    ///
    /// # Arguments
    /// * `txid_hex` - 64 hex characters, most significant byte first.
    /// * `index` - The output index.
    pub fn from_hex(txid_hex: &str, index: u32) -> Result<Self, TransactionError> {
        let bytes = hex::decode(txid_hex)
            .map_err(|e| TransactionError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TransactionError::InvalidHex(format!(
                "txid must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut txid = [0u8; 32];
        for (i, b) in bytes.iter().rev().enumerate() {
            txid[i] = *b;
        }
        Ok(OutPoint { txid, index })
    }

    pub(crate) fn write(&self, writer: &mut WireWriter) {
        writer.write_bytes(&self.txid);
        writer.write_u32_le(self.index);
    }

    pub(crate) fn read(reader: &mut WireReader<'_>) -> Result<Self, TransactionError> {
        let mut txid = [0u8; 32];
        txid.copy_from_slice(reader.read_bytes(32)?);
        let index = reader.read_u32_le()?;
        Ok(OutPoint { txid, index })
    }
}

impl fmt::Display for OutPoint {
    /// Display as `<reversed-hex txid>:<index>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.txid;
        reversed.reverse();
        write!(f, "{}:{}", hex::encode(reversed), self.index)
    }
}

mod txid_hex {
    //! Serde helpers: txids serialize as their display (reversed hex) form.

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(txid: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        let mut reversed = *txid;
        reversed.reverse();
        serializer.serialize_str(&hex::encode(reversed))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom("txid must be 32 bytes"));
        }
        let mut txid = [0u8; 32];
        for (i, b) in bytes.iter().rev().enumerate() {
            txid[i] = *b;
        }
        Ok(txid)
    }
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// The output being spent.
    pub previous_output: OutPoint,
    /// Unlocking script (scriptSig). Empty until the input is signed,
    /// and stays empty for native segwit spends.
    pub script: Script,
    /// Sequence number.
    pub sequence: u32,
    /// Witness stack. Empty for non-segwit spends.
    pub witness: Vec<Vec<u8>>,
}

impl TransactionInput {
    /// Create a new unsigned input with an empty unlocking script, the
    /// default sequence, and no witness.
    ///
    /// # Arguments
    /// * `previous_output` - The outpoint being spent.
    pub fn new(previous_output: OutPoint) -> Self {
        TransactionInput {
            previous_output,
            script: Script::new(),
            sequence: DEFAULT_SEQUENCE,
            witness: Vec::new(),
        }
    }

    /// Create a new unsigned input with an explicit sequence number.
    pub fn with_sequence(previous_output: OutPoint, sequence: u32) -> Self {
        TransactionInput {
            previous_output,
            script: Script::new(),
            sequence,
            witness: Vec::new(),
        }
    }

    /// Whether this input carries witness data.
    pub fn has_witness(&self) -> bool {
        !self.witness.is_empty()
    }

    /// Serialize the input in wire format (outpoint, var-length script,
    /// sequence). The witness stack is serialized separately by the
    /// transaction.
    pub(crate) fn write(&self, writer: &mut WireWriter) {
        self.previous_output.write(writer);
        writer.write_bytes(&self.script.encode());
        writer.write_u32_le(self.sequence);
    }

    pub(crate) fn read(reader: &mut WireReader<'_>) -> Result<Self, TransactionError> {
        let previous_output = OutPoint::read(reader)?;
        let script = Script::from_bytes(reader.read_var_bytes()?);
        let sequence = reader.read_u32_le()?;
        Ok(TransactionInput {
            previous_output,
            script,
            sequence,
            witness: Vec::new(),
        })
    }

    /// Serialize this input's witness stack: item count followed by
    /// var-length items. A witnessless input writes a zero count.
    pub(crate) fn write_witness(&self, writer: &mut WireWriter) {
        writer.write_varint(VarInt::from(self.witness.len()));
        for item in &self.witness {
            writer.write_var_bytes(item);
        }
    }

    pub(crate) fn read_witness(&mut self, reader: &mut WireReader<'_>) -> Result<(), TransactionError> {
        let count = reader.read_varint()?.value() as usize;
        let mut witness = Vec::with_capacity(count);
        for _ in 0..count {
            witness.push(reader.read_var_bytes()?.to_vec());
        }
        self.witness = witness;
        Ok(())
    }
}
