/// Transaction type and wire serialization.
///
/// Layout on the wire:
///
/// ```text
/// version (4 LE)
/// [marker 0x00, flag 0x01]        only when any input has a witness
/// input count (compactSize)
/// inputs
/// output count (compactSize)
/// outputs
/// [witness stacks, one per input] only when marker/flag present
/// lock_time (4 LE)
/// ```
///
/// `txid` is the double SHA-256 of the legacy (witness-stripped)
/// serialization, so witness data never changes a transaction's id.
/// `wtxid` covers the full serialization.

use coinkit_primitives::hash::sha256d;
use coinkit_primitives::util::{VarInt, WireReader, WireWriter};
use serde::{Deserialize, Serialize};

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::TransactionError;

/// Default transaction version.
pub const DEFAULT_VERSION: i32 = 1;

const SEGWIT_MARKER: u8 = 0x00;
const SEGWIT_FLAG: u8 = 0x01;

/// A transaction: versioned lists of inputs and outputs plus a lock time.
/// Input and output insertion order is preserved through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction version.
    pub version: i32,
    /// The inputs, in signing order.
    pub inputs: Vec<TransactionInput>,
    /// The outputs.
    pub outputs: Vec<TransactionOutput>,
    /// Earliest time or block height at which the transaction is valid.
    pub lock_time: u32,
}

impl Transaction {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create a new empty transaction with the default version and zero
    /// lock time.
    pub fn new() -> Self {
        Transaction {
            version: DEFAULT_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    /// Append an input, preserving order.
    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    /// Append an output, preserving order.
    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    /// Whether any input carries witness data. Decides the wire layout.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(TransactionInput::has_witness)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize in wire format. Emits the segwit marker/flag and
    /// witness stacks when any input has a witness, otherwise the legacy
    /// layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(self.has_witness())
    }

    /// Serialize in the legacy layout with witness data stripped. This
    /// is the byte stream the `txid` commits to.
    pub fn to_bytes_legacy(&self) -> Vec<u8> {
        self.serialize(false)
    }

    /// Hex-encode the wire serialization.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(self.estimate_capacity());
        writer.write_i32_le(self.version);
        if with_witness {
            writer.write_u8(SEGWIT_MARKER);
            writer.write_u8(SEGWIT_FLAG);
        }
        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write(&mut writer);
        }
        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write(&mut writer);
        }
        if with_witness {
            for input in &self.inputs {
                input.write_witness(&mut writer);
            }
        }
        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    fn estimate_capacity(&self) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|i| 41 + i.script.len() + i.witness.iter().map(|w| w.len() + 1).sum::<usize>())
            .sum();
        let outputs: usize = self.outputs.iter().map(|o| 9 + o.script.len()).sum();
        12 + inputs + outputs
    }

    // -----------------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------------

    /// Decode a transaction from wire bytes.
    ///
    /// Rejects trailing bytes, a segwit flag other than 0x01, a
    /// marker/flag pair with no witness data, and truncated input.
    ///
    /// # Arguments
    /// * `bytes` - The full wire serialization.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = WireReader::new(bytes);
        let version = reader.read_i32_le()?;

        let mut input_count = reader.read_varint()?.value() as usize;
        let mut segwit = false;
        if input_count == 0 {
            // A zero byte here is the segwit marker, not an input count.
            let flag = reader.read_u8()?;
            if flag != SEGWIT_FLAG {
                return Err(TransactionError::InvalidSegwitFlag(flag));
            }
            segwit = true;
            input_count = reader.read_varint()?.value() as usize;
        }

        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            inputs.push(TransactionInput::read(&mut reader)?);
        }

        let output_count = reader.read_varint()?.value() as usize;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput::read(&mut reader)?);
        }

        if segwit {
            for input in &mut inputs {
                input.read_witness(&mut reader)?;
            }
            if inputs.iter().all(|i| !i.has_witness()) {
                return Err(TransactionError::EmptyWitnessData);
            }
        }

        let lock_time = reader.read_u32_le()?;
        if reader.remaining() > 0 {
            return Err(TransactionError::TrailingBytes(reader.remaining()));
        }

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Decode a transaction from its hex serialization.
    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| TransactionError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    // -----------------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------------

    /// Transaction id: double SHA-256 of the legacy serialization, in
    /// internal byte order.
    pub fn txid(&self) -> [u8; 32] {
        sha256d(&self.to_bytes_legacy())
    }

    /// Witness transaction id: double SHA-256 of the full serialization.
    /// Equal to `txid` for transactions without witness data.
    pub fn wtxid(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// Transaction id in display order (reversed hex).
    pub fn txid_hex(&self) -> String {
        let mut id = self.txid();
        id.reverse();
        hex::encode(id)
    }

    /// Size of the wire serialization in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Sum of all output values.
    pub fn total_output_value(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
