/// Script template classification and construction.
///
/// Locking scripts follow a small set of well-known byte patterns.  This
/// module recognizes those patterns (classification and matchers) and
/// builds them from their components (builders).  Classification is pure
/// pattern matching over the script bytes; a script that fits no known
/// pattern classifies as `Unknown`, which is a valid answer, not an
/// error.

use crate::opcodes::*;
use crate::{Script, ScriptError};

/// The closed set of recognized locking script patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptTemplate {
    /// OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
    PayToPublicKeyHash,
    /// OP_HASH160 <20-byte hash> OP_EQUAL
    PayToScriptHash,
    /// OP_0 <20-byte hash>
    PayToWitnessPublicKeyHash,
    /// OP_0 <32-byte hash>
    PayToWitnessScriptHash,
    /// <pubkey> OP_CHECKSIG
    PayToPublicKey,
    /// OP_m <pubkeys...> OP_n OP_CHECKMULTISIG
    MultiSig,
    /// OP_RETURN <data...>
    NullData,
    /// Anything else.
    Unknown,
}

/// Threshold and ordered public keys recovered from a multisig script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigInfo {
    /// Number of signatures required to spend (`m` of `m`-of-`n`).
    pub required: usize,
    /// The public keys in script order.
    pub public_keys: Vec<Vec<u8>>,
}

fn is_pubkey_bytes(data: &[u8]) -> bool {
    match data.len() {
        33 => data[0] == 0x02 || data[0] == 0x03,
        65 => data[0] == 0x04,
        _ => false,
    }
}

impl Script {
    /// Classify the script against the known locking templates.
    ///
    /// # Returns
    /// The matching `ScriptTemplate`, or `ScriptTemplate::Unknown` if the
    /// script fits no recognized pattern.
    pub fn classify(&self) -> ScriptTemplate {
        if match_pay_to_pubkey_hash(self).is_some() {
            ScriptTemplate::PayToPublicKeyHash
        } else if match_pay_to_script_hash(self).is_some() {
            ScriptTemplate::PayToScriptHash
        } else if match_pay_to_witness_pubkey_hash(self).is_some() {
            ScriptTemplate::PayToWitnessPublicKeyHash
        } else if match_pay_to_witness_script_hash(self).is_some() {
            ScriptTemplate::PayToWitnessScriptHash
        } else if match_pay_to_pubkey(self).is_some() {
            ScriptTemplate::PayToPublicKey
        } else if match_multisig(self).is_some() {
            ScriptTemplate::MultiSig
        } else if !self.is_empty() && self.as_bytes()[0] == OP_RETURN {
            ScriptTemplate::NullData
        } else {
            ScriptTemplate::Unknown
        }
    }
}

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

/// Match a pay-to-pubkey-hash locking script.
///
/// # Returns
/// The 20-byte public key hash, or `None` if the script is not P2PKH.
pub fn match_pay_to_pubkey_hash(script: &Script) -> Option<[u8; 20]> {
    let bytes = script.as_bytes();
    if bytes.len() == 25
        && bytes[0] == OP_DUP
        && bytes[1] == OP_HASH160
        && bytes[2] == OP_DATA_20
        && bytes[23] == OP_EQUALVERIFY
        && bytes[24] == OP_CHECKSIG
    {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[3..23]);
        Some(hash)
    } else {
        None
    }
}

/// Match a pay-to-script-hash locking script.
///
/// # Returns
/// The 20-byte script hash, or `None` if the script is not P2SH.
pub fn match_pay_to_script_hash(script: &Script) -> Option<[u8; 20]> {
    let bytes = script.as_bytes();
    if bytes.len() == 23 && bytes[0] == OP_HASH160 && bytes[1] == OP_DATA_20 && bytes[22] == OP_EQUAL
    {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[2..22]);
        Some(hash)
    } else {
        None
    }
}

/// Match a version-0 pay-to-witness-pubkey-hash program.
///
/// # Returns
/// The 20-byte public key hash, or `None` if the script is not P2WPKH.
pub fn match_pay_to_witness_pubkey_hash(script: &Script) -> Option<[u8; 20]> {
    let bytes = script.as_bytes();
    if bytes.len() == 22 && bytes[0] == OP_0 && bytes[1] == OP_DATA_20 {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&bytes[2..22]);
        Some(hash)
    } else {
        None
    }
}

/// Match a version-0 pay-to-witness-script-hash program.
///
/// # Returns
/// The 32-byte witness script hash, or `None` if the script is not P2WSH.
pub fn match_pay_to_witness_script_hash(script: &Script) -> Option<[u8; 32]> {
    let bytes = script.as_bytes();
    if bytes.len() == 34 && bytes[0] == OP_0 && bytes[1] == OP_DATA_32 {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes[2..34]);
        Some(hash)
    } else {
        None
    }
}

/// Match a bare pay-to-pubkey locking script.
///
/// # Returns
/// The public key bytes (33 compressed or 65 uncompressed), or `None`.
pub fn match_pay_to_pubkey(script: &Script) -> Option<Vec<u8>> {
    let chunks = script.chunks().ok()?;
    if chunks.len() != 2 || chunks[1].op != OP_CHECKSIG {
        return None;
    }
    let data = chunks[0].data.as_ref()?;
    if is_pubkey_bytes(data) {
        Some(data.clone())
    } else {
        None
    }
}

/// Match a bare m-of-n multisig locking script.
///
/// Requires `OP_m <n pubkeys> OP_n OP_CHECKMULTISIG` with `1 <= m <= n`
/// and every pushed item a plausible public key.
///
/// # Returns
/// The threshold and keys, or `None` if the script is not multisig.
pub fn match_multisig(script: &Script) -> Option<MultisigInfo> {
    let chunks = script.chunks().ok()?;
    if chunks.len() < 4 {
        return None;
    }
    let last = chunks.len() - 1;
    if chunks[last].op != OP_CHECKMULTISIG {
        return None;
    }
    let required = small_int_value(chunks[0].op)?;
    let total = small_int_value(chunks[last - 1].op)?;
    let keys = &chunks[1..last - 1];
    if required == 0 || required > total || keys.len() != total {
        return None;
    }
    let mut public_keys = Vec::with_capacity(total);
    for chunk in keys {
        let data = chunk.data.as_ref()?;
        if !is_pubkey_bytes(data) {
            return None;
        }
        public_keys.push(data.clone());
    }
    Some(MultisigInfo {
        required,
        public_keys,
    })
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build a pay-to-pubkey-hash locking script from a 20-byte hash.
pub fn pay_to_pubkey_hash(hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(25);
    bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_DATA_20]);
    bytes.extend_from_slice(hash);
    bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    Script::from_bytes(&bytes)
}

/// Build a pay-to-script-hash locking script from a 20-byte hash.
pub fn pay_to_script_hash(hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(23);
    bytes.extend_from_slice(&[OP_HASH160, OP_DATA_20]);
    bytes.extend_from_slice(hash);
    bytes.push(OP_EQUAL);
    Script::from_bytes(&bytes)
}

/// Build a version-0 pay-to-witness-pubkey-hash program.
pub fn pay_to_witness_pubkey_hash(hash: &[u8; 20]) -> Script {
    let mut bytes = Vec::with_capacity(22);
    bytes.extend_from_slice(&[OP_0, OP_DATA_20]);
    bytes.extend_from_slice(hash);
    Script::from_bytes(&bytes)
}

/// Build a version-0 pay-to-witness-script-hash program.
pub fn pay_to_witness_script_hash(hash: &[u8; 32]) -> Script {
    let mut bytes = Vec::with_capacity(34);
    bytes.extend_from_slice(&[OP_0, OP_DATA_32]);
    bytes.extend_from_slice(hash);
    Script::from_bytes(&bytes)
}

/// Build a bare pay-to-pubkey locking script.
///
/// # Arguments
/// * `pubkey` - A 33-byte compressed or 65-byte uncompressed public key.
///
/// # Returns
/// The locking script, or `InvalidPublicKey` if the key bytes are not
/// a plausible encoding.
pub fn pay_to_pubkey(pubkey: &[u8]) -> Result<Script, ScriptError> {
    if !is_pubkey_bytes(pubkey) {
        return Err(ScriptError::InvalidPublicKey(hex::encode(pubkey)));
    }
    let mut script = Script::new();
    script.append_push_data(pubkey)?;
    script.append_opcodes(&[OP_CHECKSIG])?;
    Ok(script)
}

/// Build a provably unspendable data-carrier output script.
///
/// # Arguments
/// * `data` - The payload to embed after OP_RETURN.
pub fn null_data(data: &[u8]) -> Result<Script, ScriptError> {
    let mut script = Script::new();
    script.append_opcodes(&[OP_RETURN])?;
    if !data.is_empty() {
        script.append_push_data(data)?;
    }
    Ok(script)
}

/// Build a bare m-of-n multisig locking script.
///
/// # Arguments
/// * `required` - Signatures needed to spend (`m`).
/// * `public_keys` - The public keys in the desired script order (`n` of them).
///
/// # Returns
/// The locking script, or an error if the threshold is out of range or a
/// key is malformed.
pub fn multisig(required: usize, public_keys: &[Vec<u8>]) -> Result<Script, ScriptError> {
    let total = public_keys.len();
    if required == 0 || required > total || total > 16 {
        return Err(ScriptError::InvalidThreshold { required, total });
    }
    let m_op =
        small_int_opcode(required).ok_or(ScriptError::InvalidThreshold { required, total })?;
    let n_op = small_int_opcode(total).ok_or(ScriptError::InvalidThreshold { required, total })?;
    let mut script = Script::new();
    script.append_opcodes(&[m_op])?;
    for key in public_keys {
        if !is_pubkey_bytes(key) {
            return Err(ScriptError::InvalidPublicKey(hex::encode(key)));
        }
        script.append_push_data(key)?;
    }
    script.append_opcodes(&[n_op, OP_CHECKMULTISIG])?;
    Ok(script)
}

#[cfg(test)]
mod tests {
    //! Classification and matcher/builder tests over all recognized
    //! templates, including the roundtrip from builder back through the
    //! matcher.

    use super::*;

    fn compressed_key(prefix: u8, fill: u8) -> Vec<u8> {
        let mut key = vec![fill; 33];
        key[0] = prefix;
        key
    }

    /// P2PKH builder output matches back to the same hash and classifies
    /// correctly.
    #[test]
    fn test_p2pkh_roundtrip() {
        let hash = [0x11u8; 20];
        let script = pay_to_pubkey_hash(&hash);
        assert_eq!(script.classify(), ScriptTemplate::PayToPublicKeyHash);
        assert_eq!(match_pay_to_pubkey_hash(&script), Some(hash));
        assert_eq!(script.len(), 25);
    }

    /// P2SH builder output matches back and classifies correctly.
    #[test]
    fn test_p2sh_roundtrip() {
        let hash = [0x22u8; 20];
        let script = pay_to_script_hash(&hash);
        assert_eq!(script.classify(), ScriptTemplate::PayToScriptHash);
        assert_eq!(match_pay_to_script_hash(&script), Some(hash));
        assert_eq!(script.len(), 23);
    }

    /// P2WPKH builder output matches back and classifies correctly.
    #[test]
    fn test_p2wpkh_roundtrip() {
        let hash = [0x33u8; 20];
        let script = pay_to_witness_pubkey_hash(&hash);
        assert_eq!(script.classify(), ScriptTemplate::PayToWitnessPublicKeyHash);
        assert_eq!(match_pay_to_witness_pubkey_hash(&script), Some(hash));
        assert_eq!(script.len(), 22);
    }

    /// P2WSH builder output matches back and classifies correctly, and is
    /// not confused with P2WPKH despite the shared OP_0 prefix.
    #[test]
    fn test_p2wsh_roundtrip() {
        let hash = [0x44u8; 32];
        let script = pay_to_witness_script_hash(&hash);
        assert_eq!(script.classify(), ScriptTemplate::PayToWitnessScriptHash);
        assert_eq!(match_pay_to_witness_script_hash(&script), Some(hash));
        assert!(match_pay_to_witness_pubkey_hash(&script).is_none());
    }

    /// P2PK accepts compressed and uncompressed keys and rejects garbage.
    #[test]
    fn test_p2pk() {
        let compressed = compressed_key(0x02, 0xAB);
        let script = pay_to_pubkey(&compressed).expect("valid key");
        assert_eq!(script.classify(), ScriptTemplate::PayToPublicKey);
        assert_eq!(match_pay_to_pubkey(&script), Some(compressed));

        let mut uncompressed = vec![0xCDu8; 65];
        uncompressed[0] = 0x04;
        let script = pay_to_pubkey(&uncompressed).expect("valid key");
        assert_eq!(match_pay_to_pubkey(&script), Some(uncompressed));

        assert!(pay_to_pubkey(&[0x02; 10]).is_err());
        assert!(pay_to_pubkey(&vec![0x05; 33]).is_err());
    }

    /// 2-of-3 multisig roundtrips through the matcher with keys in order.
    #[test]
    fn test_multisig_roundtrip() {
        let keys = vec![
            compressed_key(0x02, 0x01),
            compressed_key(0x03, 0x02),
            compressed_key(0x02, 0x03),
        ];
        let script = multisig(2, &keys).expect("valid 2-of-3");
        assert_eq!(script.classify(), ScriptTemplate::MultiSig);
        let info = match_multisig(&script).expect("should match");
        assert_eq!(info.required, 2);
        assert_eq!(info.public_keys, keys);
    }

    /// Multisig builder rejects out-of-range thresholds.
    #[test]
    fn test_multisig_invalid_threshold() {
        let keys = vec![compressed_key(0x02, 0x01), compressed_key(0x03, 0x02)];
        assert!(matches!(
            multisig(0, &keys),
            Err(ScriptError::InvalidThreshold { required: 0, total: 2 })
        ));
        assert!(matches!(
            multisig(3, &keys),
            Err(ScriptError::InvalidThreshold { required: 3, total: 2 })
        ));
        assert!(multisig(1, &vec![compressed_key(0x02, 0x01); 17]).is_err());
    }

    /// OP_RETURN outputs classify as NullData, with and without payload.
    #[test]
    fn test_null_data() {
        let script = null_data(b"hello").expect("should build");
        assert_eq!(script.classify(), ScriptTemplate::NullData);
        assert_eq!(script.as_bytes()[0], OP_RETURN);

        let bare = null_data(&[]).expect("should build");
        assert_eq!(bare.classify(), ScriptTemplate::NullData);
        assert_eq!(bare.len(), 1);
    }

    /// Empty scripts, truncated patterns, and arbitrary bytes are Unknown.
    #[test]
    fn test_unknown() {
        assert_eq!(Script::new().classify(), ScriptTemplate::Unknown);
        // P2PKH with a 19-byte hash is not P2PKH.
        let script =
            Script::from_hex("76a913e2a623699e81b291c0327f408fea765d534baa88ac").unwrap();
        assert_eq!(script.classify(), ScriptTemplate::Unknown);
        // OP_0 with a 21-byte program is neither witness template.
        let mut bytes = vec![OP_0, 21];
        bytes.extend_from_slice(&[0x55; 21]);
        assert_eq!(Script::from_bytes(&bytes).classify(), ScriptTemplate::Unknown);
    }

    /// A real mainnet P2PKH script classifies correctly from hex.
    #[test]
    fn test_classify_real_p2pkh() {
        let script =
            Script::from_hex("76a914e2a623699e81b291c0327f408fea765d534baa2a88ac").unwrap();
        assert_eq!(script.classify(), ScriptTemplate::PayToPublicKeyHash);
    }
}
