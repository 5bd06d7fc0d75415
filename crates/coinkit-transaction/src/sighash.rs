/// Signature hash computation.
///
/// Two algorithms are provided, both pure functions over an immutable
/// transaction:
///
/// - `legacy_sighash`: snapshot the transaction, blank every other
///   input script, install the script code at the signed input, apply
///   NONE/SINGLE/ANYONECANPAY pruning, serialize without witness data,
///   append the 4-byte hash type, and double-hash.
/// - `segwit_sighash`: the BIP143 preimage built from the cached
///   prevouts/sequence/outputs commitments plus the spent amount.
///
/// The `_with` variants accept the chain's digest as a `HashFunction`;
/// the plain functions use double SHA-256.

use coinkit_primitives::hash::{sha256d, HashFunction};
use coinkit_primitives::util::WireWriter;
use coinkit_script::Script;

use crate::{Transaction, TransactionError};

/// Commit to all inputs and outputs.
pub const SIGHASH_ALL: u32 = 0x01;
/// Commit to no outputs.
pub const SIGHASH_NONE: u32 = 0x02;
/// Commit only to the output at the signed input's index.
pub const SIGHASH_SINGLE: u32 = 0x03;
/// Commit only to the signed input, letting others be added later.
pub const SIGHASH_ANYONECANPAY: u32 = 0x80;
/// Mask selecting the base hash type.
pub const SIGHASH_MASK: u32 = 0x1f;

fn check_indices(
    tx: &Transaction,
    input_index: usize,
    hash_type: u32,
) -> Result<(), TransactionError> {
    if input_index >= tx.inputs.len() {
        return Err(TransactionError::InputIndexOutOfRange {
            index: input_index,
            count: tx.inputs.len(),
        });
    }
    // SIGHASH_SINGLE past the last output is a hard error rather than
    // the historical one-hash quirk.
    if hash_type & SIGHASH_MASK == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return Err(TransactionError::OutputIndexOutOfRange {
            index: input_index,
            count: tx.outputs.len(),
        });
    }
    Ok(())
}

/// Compute the legacy (pre-segwit) signature hash for one input.
///
/// # Arguments
/// * `tx` - The transaction being signed. Not modified.
/// * `input_index` - Index of the input the signature is for.
/// * `script_code` - The locking script (or redeem script) being satisfied.
/// * `hash_type` - SIGHASH flags; appended to the preimage as 4 bytes LE.
///
/// # Returns
/// The 32-byte digest to sign, or an index error.
pub fn legacy_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    legacy_sighash_with(tx, input_index, script_code, hash_type, sha256d)
}

/// `legacy_sighash` with a caller-chosen double-hash function.
pub fn legacy_sighash_with(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: u32,
    hasher: HashFunction,
) -> Result<[u8; 32], TransactionError> {
    check_indices(tx, input_index, hash_type)?;

    let mut snapshot = tx.clone();
    let base = hash_type & SIGHASH_MASK;

    for (i, input) in snapshot.inputs.iter_mut().enumerate() {
        input.script = if i == input_index {
            script_code.clone()
        } else {
            Script::new()
        };
        input.witness.clear();
    }

    match base {
        SIGHASH_NONE => {
            snapshot.outputs.clear();
            zero_other_sequences(&mut snapshot, input_index);
        }
        SIGHASH_SINGLE => {
            snapshot.outputs.truncate(input_index + 1);
            for output in &mut snapshot.outputs[..input_index] {
                output.value = u64::MAX;
                output.script = Script::new();
            }
            zero_other_sequences(&mut snapshot, input_index);
        }
        _ => {}
    }

    if hash_type & SIGHASH_ANYONECANPAY != 0 {
        let signed = snapshot.inputs.swap_remove(input_index);
        snapshot.inputs = vec![signed];
    }

    let mut preimage = snapshot.to_bytes_legacy();
    preimage.extend_from_slice(&hash_type.to_le_bytes());
    Ok(hasher(&preimage))
}

fn zero_other_sequences(tx: &mut Transaction, input_index: usize) {
    for (i, input) in tx.inputs.iter_mut().enumerate() {
        if i != input_index {
            input.sequence = 0;
        }
    }
}

/// Compute the BIP143 segwit signature hash for one input.
///
/// # Arguments
/// * `tx` - The transaction being signed. Not modified.
/// * `input_index` - Index of the input the signature is for.
/// * `script_code` - For P2WPKH, the canonical P2PKH script of the key
///   hash; for P2WSH, the witness script.
/// * `amount` - Value of the output being spent, in base units.
/// * `hash_type` - SIGHASH flags.
///
/// # Returns
/// The 32-byte digest to sign, or an index error.
pub fn segwit_sighash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    amount: u64,
    hash_type: u32,
) -> Result<[u8; 32], TransactionError> {
    segwit_sighash_with(tx, input_index, script_code, amount, hash_type, sha256d)
}

/// `segwit_sighash` with a caller-chosen double-hash function.
pub fn segwit_sighash_with(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    amount: u64,
    hash_type: u32,
    hasher: HashFunction,
) -> Result<[u8; 32], TransactionError> {
    check_indices(tx, input_index, hash_type)?;

    let base = hash_type & SIGHASH_MASK;
    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;
    let zeros = [0u8; 32];

    let hash_prevouts = if anyone_can_pay {
        zeros
    } else {
        let mut writer = WireWriter::with_capacity(36 * tx.inputs.len());
        for input in &tx.inputs {
            input.previous_output.write(&mut writer);
        }
        hasher(writer.as_bytes())
    };

    let hash_sequence = if anyone_can_pay || base == SIGHASH_SINGLE || base == SIGHASH_NONE {
        zeros
    } else {
        let mut writer = WireWriter::with_capacity(4 * tx.inputs.len());
        for input in &tx.inputs {
            writer.write_u32_le(input.sequence);
        }
        hasher(writer.as_bytes())
    };

    let hash_outputs = match base {
        SIGHASH_NONE => zeros,
        SIGHASH_SINGLE => hasher(&tx.outputs[input_index].to_bytes()),
        _ => {
            let mut writer = WireWriter::new();
            for output in &tx.outputs {
                output.write(&mut writer);
            }
            hasher(writer.as_bytes())
        }
    };

    let input = &tx.inputs[input_index];
    let mut writer = WireWriter::with_capacity(156 + script_code.len());
    writer.write_i32_le(tx.version);
    writer.write_bytes(&hash_prevouts);
    writer.write_bytes(&hash_sequence);
    input.previous_output.write(&mut writer);
    writer.write_bytes(&script_code.encode());
    writer.write_u64_le(amount);
    writer.write_u32_le(input.sequence);
    writer.write_bytes(&hash_outputs);
    writer.write_u32_le(tx.lock_time);
    writer.write_u32_le(hash_type);
    Ok(hasher(writer.as_bytes()))
}
