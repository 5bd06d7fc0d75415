/// Transaction signing.
///
/// The signer walks the inputs of an unsigned transaction in index
/// order. For each input it classifies the locking script of the spent
/// output, resolves what it needs (a private key by public key hash, a
/// redeem or witness script by script hash), computes the right digest
/// (legacy or BIP143), signs, and assembles the unlocking script and
/// witness stack. The first failing input aborts the whole run with the
/// input index in the error; the caller never sees a half-signed
/// transaction.
///
/// Compile mode performs the same pipeline with externally produced
/// signatures: each (signature, public key) pair is verified against
/// the input's digest before assembly. `preimage_hashes` exposes the
/// digests so external signers can produce those signatures.

use std::collections::HashMap;

use coinkit_primitives::ec::{PrivateKey, PublicKey, Signature};
use coinkit_primitives::hash::{hash160, sha256, sha256d, HashFunction};
use coinkit_script::opcodes::OP_0;
use coinkit_script::template::{
    match_multisig, match_pay_to_pubkey, match_pay_to_pubkey_hash, match_pay_to_script_hash,
    match_pay_to_witness_pubkey_hash, match_pay_to_witness_script_hash, pay_to_pubkey_hash,
};
use coinkit_script::{MultisigInfo, Script, ScriptTemplate};
use coinkit_transaction::sighash::{legacy_sighash_with, segwit_sighash_with, SIGHASH_ALL};
use coinkit_transaction::Transaction;

use crate::plan::UnspentOutput;
use crate::SignerError;

/// Private keys indexed by the hash160 of their compressed public key.
#[derive(Default)]
pub struct KeyRegistry {
    keys: HashMap<[u8; 20], PrivateKey>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a private key under its compressed public key hash.
    pub fn register(&mut self, key: PrivateKey) {
        self.keys.insert(key.pub_key().hash160(), key);
    }

    /// Look up a key by public key hash.
    pub fn lookup(&self, hash: &[u8; 20]) -> Option<&PrivateKey> {
        self.keys.get(hash)
    }

    /// Look up a key by the serialized public key it belongs to.
    pub fn lookup_pubkey(&self, pubkey: &[u8]) -> Option<&PrivateKey> {
        self.keys.get(&hash160(pubkey))
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Redeem and witness scripts, indexed by both their hash160 (P2SH)
/// and their SHA-256 (P2WSH).
#[derive(Default)]
pub struct ScriptRegistry {
    scripts: HashMap<Vec<u8>, Script>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a redeem or witness script under both hash forms.
    pub fn register(&mut self, script: Script) {
        self.scripts
            .insert(hash160(script.as_bytes()).to_vec(), script.clone());
        self.scripts
            .insert(sha256(script.as_bytes()).to_vec(), script);
    }

    /// Look up a script by 20-byte or 32-byte hash.
    pub fn lookup(&self, hash: &[u8]) -> Option<&Script> {
        self.scripts.get(hash)
    }
}

/// Signs transactions input by input.
pub struct TransactionSigner {
    hash_type: u32,
    hasher: HashFunction,
    pad_multisig: bool,
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSigner {
    /// Create a signer using SIGHASH_ALL and double SHA-256.
    pub fn new() -> Self {
        TransactionSigner {
            hash_type: SIGHASH_ALL,
            hasher: sha256d,
            pad_multisig: false,
        }
    }

    /// Use a different SIGHASH type.
    pub fn with_hash_type(mut self, hash_type: u32) -> Self {
        self.hash_type = hash_type;
        self
    }

    /// Use the chain's digest function instead of double SHA-256.
    pub fn with_hasher(mut self, hasher: HashFunction) -> Self {
        self.hasher = hasher;
        self
    }

    /// Pad multisig unlocking data with an empty push for every public
    /// key that contributed no signature. Off by default.
    pub fn with_padded_multisig(mut self, pad: bool) -> Self {
        self.pad_multisig = pad;
        self
    }

    // -----------------------------------------------------------------------
    // Public entry points
    // -----------------------------------------------------------------------

    /// Sign every input with keys and scripts from the registries.
    ///
    /// # Arguments
    /// * `tx` - The unsigned transaction. Not modified.
    /// * `utxos` - The spent outputs, parallel to `tx.inputs`.
    /// * `keys` - Private keys by public key hash.
    /// * `scripts` - Redeem/witness scripts by script hash.
    ///
    /// # Returns
    /// A fully signed copy, or the first per-input error.
    pub fn sign(
        &self,
        tx: &Transaction,
        utxos: &[UnspentOutput],
        keys: &KeyRegistry,
        scripts: &ScriptRegistry,
    ) -> Result<Transaction, SignerError> {
        check_parallel(tx, utxos)?;
        let mut signed = tx.clone();
        for index in 0..tx.inputs.len() {
            let (script, witness) = self.sign_input(tx, index, &utxos[index], keys, scripts)?;
            signed.inputs[index].script = script;
            signed.inputs[index].witness = witness;
        }
        log::debug!("signed {} inputs, txid {}", tx.inputs.len(), signed.txid_hex());
        Ok(signed)
    }

    /// Assemble externally produced signatures after verifying each one
    /// against its input's digest.
    ///
    /// Supports single-key templates (P2PKH, P2PK, P2WPKH, and
    /// P2SH-wrapped P2WPKH); multisig inputs need `sign`.
    ///
    /// # Arguments
    /// * `tx` - The unsigned transaction. Not modified.
    /// * `utxos` - The spent outputs, parallel to `tx.inputs`.
    /// * `signatures` - DER signatures without the hash type byte, one
    ///   per input.
    /// * `public_keys` - Serialized public keys, one per input.
    /// * `scripts` - Redeem/witness scripts by script hash.
    pub fn compile(
        &self,
        tx: &Transaction,
        utxos: &[UnspentOutput],
        signatures: &[Vec<u8>],
        public_keys: &[Vec<u8>],
        scripts: &ScriptRegistry,
    ) -> Result<Transaction, SignerError> {
        check_parallel(tx, utxos)?;
        if signatures.len() != tx.inputs.len() || public_keys.len() != tx.inputs.len() {
            return Err(SignerError::MalformedInput(format!(
                "expected {} signatures and public keys, got {} and {}",
                tx.inputs.len(),
                signatures.len(),
                public_keys.len()
            )));
        }

        let mut signed = tx.clone();
        for index in 0..tx.inputs.len() {
            let (script, witness) = self.compile_input(
                tx,
                index,
                &utxos[index],
                &signatures[index],
                &public_keys[index],
                scripts,
            )?;
            signed.inputs[index].script = script;
            signed.inputs[index].witness = witness;
        }
        Ok(signed)
    }

    /// Compute the digest each input commits to, without signing.
    ///
    /// External signers produce signatures over these digests and feed
    /// them back through `compile`.
    pub fn preimage_hashes(
        &self,
        tx: &Transaction,
        utxos: &[UnspentOutput],
        scripts: &ScriptRegistry,
    ) -> Result<Vec<[u8; 32]>, SignerError> {
        check_parallel(tx, utxos)?;
        let mut digests = Vec::with_capacity(tx.inputs.len());
        for index in 0..tx.inputs.len() {
            let (script_code, segwit) =
                self.script_code_for(index, &utxos[index], scripts)?;
            digests.push(self.digest(tx, index, &utxos[index], &script_code, segwit)?);
        }
        Ok(digests)
    }

    // -----------------------------------------------------------------------
    // Per-input pipeline
    // -----------------------------------------------------------------------

    /// Resolve the script code the input's digest commits to, and
    /// whether the segwit digest applies.
    fn script_code_for(
        &self,
        index: usize,
        utxo: &UnspentOutput,
        scripts: &ScriptRegistry,
    ) -> Result<(Script, bool), SignerError> {
        let template = utxo.script.classify();
        match template {
            ScriptTemplate::PayToPublicKeyHash
            | ScriptTemplate::PayToPublicKey
            | ScriptTemplate::MultiSig => Ok((utxo.script.clone(), false)),
            ScriptTemplate::PayToWitnessPublicKeyHash => {
                let hash = match_pay_to_witness_pubkey_hash(&utxo.script)
                    .ok_or_else(|| malformed_template(index))?;
                Ok((pay_to_pubkey_hash(&hash), true))
            }
            ScriptTemplate::PayToScriptHash => {
                let redeem = self.redeem_for(index, utxo, scripts)?;
                if let Some(hash) = match_pay_to_witness_pubkey_hash(&redeem) {
                    Ok((pay_to_pubkey_hash(&hash), true))
                } else if let Some(hash) = match_pay_to_witness_script_hash(&redeem) {
                    let script = scripts
                        .lookup(&hash)
                        .ok_or(SignerError::MissingRedeemScript { input_index: index })?;
                    Ok((script.clone(), true))
                } else if match_multisig(&redeem).is_some() {
                    Ok((redeem, false))
                } else {
                    Err(SignerError::UnsupportedScriptType {
                        input_index: index,
                        template: redeem.classify(),
                    })
                }
            }
            ScriptTemplate::PayToWitnessScriptHash => {
                let hash = match_pay_to_witness_script_hash(&utxo.script)
                    .ok_or_else(|| malformed_template(index))?;
                let script = scripts
                    .lookup(&hash)
                    .ok_or(SignerError::MissingRedeemScript { input_index: index })?;
                Ok((script.clone(), true))
            }
            _ => Err(SignerError::UnsupportedScriptType {
                input_index: index,
                template,
            }),
        }
    }

    fn redeem_for(
        &self,
        index: usize,
        utxo: &UnspentOutput,
        scripts: &ScriptRegistry,
    ) -> Result<Script, SignerError> {
        let hash =
            match_pay_to_script_hash(&utxo.script).ok_or_else(|| malformed_template(index))?;
        scripts
            .lookup(&hash)
            .cloned()
            .ok_or(SignerError::MissingRedeemScript { input_index: index })
    }

    fn digest(
        &self,
        tx: &Transaction,
        index: usize,
        utxo: &UnspentOutput,
        script_code: &Script,
        segwit: bool,
    ) -> Result<[u8; 32], SignerError> {
        let digest = if segwit {
            segwit_sighash_with(tx, index, script_code, utxo.value, self.hash_type, self.hasher)?
        } else {
            legacy_sighash_with(tx, index, script_code, self.hash_type, self.hasher)?
        };
        Ok(digest)
    }

    /// DER signature with the hash type byte appended, as pushed into
    /// unlocking data.
    fn encode_signature(&self, sig: &Signature) -> Vec<u8> {
        let mut bytes = sig.to_der();
        bytes.push(self.hash_type as u8);
        bytes
    }

    fn sign_input(
        &self,
        tx: &Transaction,
        index: usize,
        utxo: &UnspentOutput,
        keys: &KeyRegistry,
        scripts: &ScriptRegistry,
    ) -> Result<(Script, Vec<Vec<u8>>), SignerError> {
        let template = utxo.script.classify();
        match template {
            ScriptTemplate::PayToPublicKeyHash => {
                let hash =
                    match_pay_to_pubkey_hash(&utxo.script).ok_or_else(|| malformed_template(index))?;
                let key = keys
                    .lookup(&hash)
                    .ok_or(SignerError::MissingPrivateKey { input_index: index })?;
                let digest = self.digest(tx, index, utxo, &utxo.script, false)?;
                let sig = self.encode_signature(&key.sign(&digest)?);
                let mut script = Script::new();
                script.append_push_data(&sig)?;
                script.append_push_data(&key.pub_key().to_compressed())?;
                Ok((script, Vec::new()))
            }
            ScriptTemplate::PayToPublicKey => {
                let pubkey =
                    match_pay_to_pubkey(&utxo.script).ok_or_else(|| malformed_template(index))?;
                let key = keys
                    .lookup_pubkey(&pubkey)
                    .ok_or(SignerError::MissingPrivateKey { input_index: index })?;
                let digest = self.digest(tx, index, utxo, &utxo.script, false)?;
                let sig = self.encode_signature(&key.sign(&digest)?);
                let mut script = Script::new();
                script.append_push_data(&sig)?;
                Ok((script, Vec::new()))
            }
            ScriptTemplate::PayToWitnessPublicKeyHash => {
                let hash = match_pay_to_witness_pubkey_hash(&utxo.script)
                    .ok_or_else(|| malformed_template(index))?;
                let key = keys
                    .lookup(&hash)
                    .ok_or(SignerError::MissingPrivateKey { input_index: index })?;
                let script_code = pay_to_pubkey_hash(&hash);
                let digest = self.digest(tx, index, utxo, &script_code, true)?;
                let sig = self.encode_signature(&key.sign(&digest)?);
                let witness = vec![sig, key.pub_key().to_compressed().to_vec()];
                Ok((Script::new(), witness))
            }
            ScriptTemplate::PayToScriptHash => {
                let redeem = self.redeem_for(index, utxo, scripts)?;
                if let Some(hash) = match_pay_to_witness_pubkey_hash(&redeem) {
                    // P2SH-wrapped P2WPKH: witness as native, redeem in
                    // the scriptSig.
                    let key = keys
                        .lookup(&hash)
                        .ok_or(SignerError::MissingPrivateKey { input_index: index })?;
                    let script_code = pay_to_pubkey_hash(&hash);
                    let digest = self.digest(tx, index, utxo, &script_code, true)?;
                    let sig = self.encode_signature(&key.sign(&digest)?);
                    let witness = vec![sig, key.pub_key().to_compressed().to_vec()];
                    let mut script = Script::new();
                    script.append_push_data(redeem.as_bytes())?;
                    Ok((script, witness))
                } else if let Some(hash) = match_pay_to_witness_script_hash(&redeem) {
                    // P2SH-wrapped P2WSH: witness program in the
                    // scriptSig, witness script closes the stack.
                    let witness_script = scripts
                        .lookup(&hash)
                        .cloned()
                        .ok_or(SignerError::MissingRedeemScript { input_index: index })?;
                    let info = match_multisig(&witness_script).ok_or(
                        SignerError::UnsupportedScriptType {
                            input_index: index,
                            template: witness_script.classify(),
                        },
                    )?;
                    let digest = self.digest(tx, index, utxo, &witness_script, true)?;
                    let slots = self.multisig_slots(&info, &digest, keys, index)?;
                    let mut witness = vec![Vec::new()];
                    for sig in slots {
                        witness.push(sig.unwrap_or_default());
                    }
                    witness.push(witness_script.as_bytes().to_vec());
                    let mut script = Script::new();
                    script.append_push_data(redeem.as_bytes())?;
                    Ok((script, witness))
                } else if let Some(info) = match_multisig(&redeem) {
                    let digest = self.digest(tx, index, utxo, &redeem, false)?;
                    let slots = self.multisig_slots(&info, &digest, keys, index)?;
                    let mut script = Script::new();
                    script.append_opcodes(&[OP_0])?;
                    for sig in slots {
                        match sig {
                            Some(sig) => script.append_push_data(&sig)?,
                            None => script.append_opcodes(&[OP_0])?,
                        }
                    }
                    script.append_push_data(redeem.as_bytes())?;
                    Ok((script, Vec::new()))
                } else {
                    Err(SignerError::UnsupportedScriptType {
                        input_index: index,
                        template: redeem.classify(),
                    })
                }
            }
            ScriptTemplate::PayToWitnessScriptHash => {
                let (witness_script, _) = self.script_code_for(index, utxo, scripts)?;
                let info = match_multisig(&witness_script).ok_or(
                    SignerError::UnsupportedScriptType {
                        input_index: index,
                        template: witness_script.classify(),
                    },
                )?;
                let digest = self.digest(tx, index, utxo, &witness_script, true)?;
                let slots = self.multisig_slots(&info, &digest, keys, index)?;
                // CHECKMULTISIG pops one extra element: lead with an
                // empty item.
                let mut witness = vec![Vec::new()];
                for sig in slots {
                    witness.push(sig.unwrap_or_default());
                }
                witness.push(witness_script.as_bytes().to_vec());
                Ok((Script::new(), witness))
            }
            ScriptTemplate::MultiSig => {
                let info =
                    match_multisig(&utxo.script).ok_or_else(|| malformed_template(index))?;
                let digest = self.digest(tx, index, utxo, &utxo.script, false)?;
                let slots = self.multisig_slots(&info, &digest, keys, index)?;
                let mut script = Script::new();
                script.append_opcodes(&[OP_0])?;
                for sig in slots {
                    match sig {
                        Some(sig) => script.append_push_data(&sig)?,
                        None => script.append_opcodes(&[OP_0])?,
                    }
                }
                Ok((script, Vec::new()))
            }
            _ => Err(SignerError::UnsupportedScriptType {
                input_index: index,
                template,
            }),
        }
    }

    /// Sign a multisig digest with every registered key, in the redeem
    /// script's public key order, stopping once the threshold is met.
    ///
    /// Without padding the result holds only the produced signatures;
    /// with padding it holds one slot per public key, `None` for keys
    /// that contributed nothing.
    fn multisig_slots(
        &self,
        info: &MultisigInfo,
        digest: &[u8; 32],
        keys: &KeyRegistry,
        index: usize,
    ) -> Result<Vec<Option<Vec<u8>>>, SignerError> {
        let mut slots = Vec::with_capacity(info.public_keys.len());
        let mut produced = 0usize;
        for pubkey in &info.public_keys {
            if produced < info.required {
                if let Some(key) = keys.lookup_pubkey(pubkey) {
                    slots.push(Some(self.encode_signature(&key.sign(digest)?)));
                    produced += 1;
                    continue;
                }
            }
            slots.push(None);
        }
        if produced < info.required {
            return Err(SignerError::MissingPrivateKey { input_index: index });
        }
        if !self.pad_multisig {
            slots.retain(Option::is_some);
        }
        Ok(slots)
    }

    fn compile_input(
        &self,
        tx: &Transaction,
        index: usize,
        utxo: &UnspentOutput,
        signature: &[u8],
        pubkey_bytes: &[u8],
        scripts: &ScriptRegistry,
    ) -> Result<(Script, Vec<Vec<u8>>), SignerError> {
        let template = utxo.script.classify();

        // The supplied public key must be the one the locking script
        // commits to.
        let matches_script = match template {
            ScriptTemplate::PayToPublicKeyHash => match_pay_to_pubkey_hash(&utxo.script)
                .map(|h| h == hash160(pubkey_bytes))
                .unwrap_or(false),
            ScriptTemplate::PayToPublicKey => match_pay_to_pubkey(&utxo.script)
                .map(|pk| pk == pubkey_bytes)
                .unwrap_or(false),
            ScriptTemplate::PayToWitnessPublicKeyHash => {
                match_pay_to_witness_pubkey_hash(&utxo.script)
                    .map(|h| h == hash160(pubkey_bytes))
                    .unwrap_or(false)
            }
            ScriptTemplate::PayToScriptHash => {
                let redeem = self.redeem_for(index, utxo, scripts)?;
                match match_pay_to_witness_pubkey_hash(&redeem) {
                    Some(hash) => hash == hash160(pubkey_bytes),
                    // Multisig redeems need sign(), not compile().
                    None => {
                        return Err(SignerError::UnsupportedScriptType {
                            input_index: index,
                            template: redeem.classify(),
                        })
                    }
                }
            }
            _ => {
                return Err(SignerError::UnsupportedScriptType {
                    input_index: index,
                    template,
                })
            }
        };
        if !matches_script {
            return Err(SignerError::SignatureVerificationFailed { input_index: index });
        }

        let (script_code, segwit) = self.script_code_for(index, utxo, scripts)?;
        let digest = self.digest(tx, index, utxo, &script_code, segwit)?;

        let pubkey = PublicKey::from_bytes(pubkey_bytes)
            .map_err(|_| SignerError::SignatureVerificationFailed { input_index: index })?;
        let sig = Signature::from_der(signature)
            .map_err(|_| SignerError::SignatureVerificationFailed { input_index: index })?;
        if !sig.verify(&digest, &pubkey) {
            return Err(SignerError::SignatureVerificationFailed { input_index: index });
        }

        let encoded = self.encode_signature(&sig);
        match template {
            ScriptTemplate::PayToPublicKeyHash => {
                let mut script = Script::new();
                script.append_push_data(&encoded)?;
                script.append_push_data(pubkey_bytes)?;
                Ok((script, Vec::new()))
            }
            ScriptTemplate::PayToPublicKey => {
                let mut script = Script::new();
                script.append_push_data(&encoded)?;
                Ok((script, Vec::new()))
            }
            ScriptTemplate::PayToWitnessPublicKeyHash => {
                Ok((Script::new(), vec![encoded, pubkey_bytes.to_vec()]))
            }
            ScriptTemplate::PayToScriptHash => {
                let redeem = self.redeem_for(index, utxo, scripts)?;
                let mut script = Script::new();
                script.append_push_data(redeem.as_bytes())?;
                Ok((script, vec![encoded, pubkey_bytes.to_vec()]))
            }
            _ => unreachable!("filtered above"),
        }
    }
}

fn check_parallel(tx: &Transaction, utxos: &[UnspentOutput]) -> Result<(), SignerError> {
    if utxos.len() != tx.inputs.len() {
        return Err(SignerError::MalformedInput(format!(
            "expected {} utxos, got {}",
            tx.inputs.len(),
            utxos.len()
        )));
    }
    Ok(())
}

fn malformed_template(index: usize) -> SignerError {
    SignerError::MalformedInput(format!("input {index}: locking script failed to re-match"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinkit_script::template;
    use coinkit_transaction::{OutPoint, TransactionInput, TransactionOutput};

    fn key(seed: u8) -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = seed;
        PrivateKey::from_bytes(&bytes).expect("valid scalar")
    }

    fn tx_spending(utxo: &UnspentOutput) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(TransactionInput::with_sequence(utxo.outpoint, utxo.sequence));
        tx.add_output(TransactionOutput::new(
            utxo.value - 500,
            template::pay_to_pubkey_hash(&[0xAA; 20]),
        ));
        tx
    }

    /// Signing a P2PKH input produces a two-push scriptSig whose
    /// signature verifies against the input's digest.
    #[test]
    fn test_sign_p2pkh() {
        let k = key(1);
        let utxo = UnspentOutput::new(
            OutPoint::new([1; 32], 0),
            100_000,
            template::pay_to_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        let mut keys = KeyRegistry::new();
        keys.register(k.clone());
        let signer = TransactionSigner::new();
        let signed = signer
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &ScriptRegistry::new())
            .expect("should sign");

        let chunks = signed.inputs[0].script.chunks().expect("parseable");
        assert_eq!(chunks.len(), 2);
        let sig_push = chunks[0].data.as_ref().expect("sig push");
        assert_eq!(*sig_push.last().unwrap(), SIGHASH_ALL as u8);
        assert_eq!(chunks[1].data.as_ref().map(Vec::len), Some(33));
        assert!(signed.inputs[0].witness.is_empty());

        let digest = signer
            .preimage_hashes(&tx, std::slice::from_ref(&utxo), &ScriptRegistry::new())
            .expect("digests")[0];
        let sig = Signature::from_der(&sig_push[..sig_push.len() - 1]).expect("der");
        assert!(sig.verify(&digest, &k.pub_key()));
    }

    /// Signing is deterministic: two runs produce identical bytes.
    #[test]
    fn test_sign_deterministic() {
        let k = key(2);
        let utxo = UnspentOutput::new(
            OutPoint::new([2; 32], 1),
            80_000,
            template::pay_to_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        let mut keys = KeyRegistry::new();
        keys.register(k);
        let signer = TransactionSigner::new();
        let scripts = ScriptRegistry::new();
        let a = signer.sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts).unwrap();
        let b = signer.sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    /// A P2WPKH input gets a two-item witness and an empty scriptSig.
    #[test]
    fn test_sign_p2wpkh() {
        let k = key(3);
        let utxo = UnspentOutput::new(
            OutPoint::new([3; 32], 0),
            70_000,
            template::pay_to_witness_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        let mut keys = KeyRegistry::new();
        keys.register(k.clone());
        let signed = TransactionSigner::new()
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &ScriptRegistry::new())
            .expect("should sign");

        assert!(signed.inputs[0].script.is_empty());
        assert_eq!(signed.inputs[0].witness.len(), 2);
        assert_eq!(signed.inputs[0].witness[1], k.pub_key().to_compressed().to_vec());
        assert!(signed.has_witness());
    }

    /// A P2SH-wrapped P2WPKH input carries the redeem script in the
    /// scriptSig and the signature in the witness.
    #[test]
    fn test_sign_p2sh_wrapped_p2wpkh() {
        let k = key(4);
        let redeem = template::pay_to_witness_pubkey_hash(&k.pub_key().hash160());
        let utxo = UnspentOutput::new(
            OutPoint::new([4; 32], 0),
            90_000,
            template::pay_to_script_hash(&hash160(redeem.as_bytes())),
        );
        let tx = tx_spending(&utxo);
        let mut keys = KeyRegistry::new();
        keys.register(k);
        let mut scripts = ScriptRegistry::new();
        scripts.register(redeem.clone());
        let signed = TransactionSigner::new()
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");

        let chunks = signed.inputs[0].script.chunks().expect("parseable");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data.as_deref(), Some(redeem.as_bytes()));
        assert_eq!(signed.inputs[0].witness.len(), 2);
    }

    /// 2-of-3 P2SH multisig with two registered keys: OP_0, both
    /// signatures in public key order, then the redeem script.
    #[test]
    fn test_sign_p2sh_multisig() {
        let (k0, k1, k2) = (key(5), key(6), key(7));
        let pubkeys: Vec<Vec<u8>> = [&k0, &k1, &k2]
            .iter()
            .map(|k| k.pub_key().to_compressed().to_vec())
            .collect();
        let redeem = template::multisig(2, &pubkeys).expect("2-of-3");
        let utxo = UnspentOutput::new(
            OutPoint::new([5; 32], 0),
            200_000,
            template::pay_to_script_hash(&hash160(redeem.as_bytes())),
        );
        let tx = tx_spending(&utxo);

        let mut keys = KeyRegistry::new();
        keys.register(k0.clone());
        keys.register(k2.clone());
        let mut scripts = ScriptRegistry::new();
        scripts.register(redeem.clone());

        let signer = TransactionSigner::new();
        let signed = signer
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");

        let chunks = signed.inputs[0].script.chunks().expect("parseable");
        // OP_0, sig(k0), sig(k2), redeem
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].op, OP_0);
        assert_eq!(chunks[3].data.as_deref(), Some(redeem.as_bytes()));

        let digest = signer
            .preimage_hashes(&tx, std::slice::from_ref(&utxo), &scripts)
            .expect("digests")[0];
        for (chunk, k) in chunks[1..3].iter().zip([&k0, &k2]) {
            let push = chunk.data.as_ref().expect("sig push");
            let sig = Signature::from_der(&push[..push.len() - 1]).expect("der");
            assert!(sig.verify(&digest, &k.pub_key()));
        }
    }

    /// Padding pins the slot layout: unpadded drops the empty slot,
    /// padded keeps one slot per public key.
    #[test]
    fn test_multisig_padding_option() {
        let (k0, k1, k2) = (key(8), key(9), key(10));
        let pubkeys: Vec<Vec<u8>> = [&k0, &k1, &k2]
            .iter()
            .map(|k| k.pub_key().to_compressed().to_vec())
            .collect();
        let redeem = template::multisig(2, &pubkeys).expect("2-of-3");
        let utxo = UnspentOutput::new(
            OutPoint::new([6; 32], 0),
            200_000,
            template::pay_to_script_hash(&hash160(redeem.as_bytes())),
        );
        let tx = tx_spending(&utxo);

        // Keys for slots 0 and 2, slot 1 stays empty.
        let mut keys = KeyRegistry::new();
        keys.register(k0);
        keys.register(k2);
        let mut scripts = ScriptRegistry::new();
        scripts.register(redeem);

        let unpadded = TransactionSigner::new()
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");
        assert_eq!(unpadded.inputs[0].script.chunks().unwrap().len(), 4);

        let padded = TransactionSigner::new()
            .with_padded_multisig(true)
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");
        let chunks = padded.inputs[0].script.chunks().unwrap();
        // OP_0, sig, empty slot, sig, redeem
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[2].op, OP_0);
        assert!(chunks[2].data.is_none());
    }

    /// P2WSH multisig: leading empty witness item, signatures, then the
    /// witness script.
    #[test]
    fn test_sign_p2wsh_multisig() {
        let (k0, k1) = (key(11), key(12));
        let pubkeys: Vec<Vec<u8>> = [&k0, &k1]
            .iter()
            .map(|k| k.pub_key().to_compressed().to_vec())
            .collect();
        let witness_script = template::multisig(2, &pubkeys).expect("2-of-2");
        let utxo = UnspentOutput::new(
            OutPoint::new([7; 32], 0),
            300_000,
            template::pay_to_witness_script_hash(&sha256(witness_script.as_bytes())),
        );
        let tx = tx_spending(&utxo);

        let mut keys = KeyRegistry::new();
        keys.register(k0);
        keys.register(k1);
        let mut scripts = ScriptRegistry::new();
        scripts.register(witness_script.clone());

        let signed = TransactionSigner::new()
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");

        let witness = &signed.inputs[0].witness;
        assert_eq!(witness.len(), 4);
        assert!(witness[0].is_empty());
        assert_eq!(witness[3], witness_script.as_bytes().to_vec());
        assert!(signed.inputs[0].script.is_empty());
    }

    /// A P2SH-wrapped P2WSH multisig input is routed through the segwit
    /// digest: the scriptSig pushes the witness program, the witness
    /// carries the multisig stack and the witness script.
    #[test]
    fn test_sign_p2sh_wrapped_p2wsh() {
        let k = key(20);
        let pubkeys = vec![k.pub_key().to_compressed().to_vec()];
        let witness_script = template::multisig(1, &pubkeys).expect("1-of-1");
        let program =
            template::pay_to_witness_script_hash(&sha256(witness_script.as_bytes()));
        let utxo = UnspentOutput::new(
            OutPoint::new([9; 32], 0),
            150_000,
            template::pay_to_script_hash(&hash160(program.as_bytes())),
        );
        let tx = tx_spending(&utxo);

        let mut keys = KeyRegistry::new();
        keys.register(k.clone());
        let mut scripts = ScriptRegistry::new();
        scripts.register(program.clone());
        scripts.register(witness_script.clone());

        let signer = TransactionSigner::new();
        let signed = signer
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");

        let chunks = signed.inputs[0].script.chunks().expect("parseable");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data.as_deref(), Some(program.as_bytes()));

        let witness = &signed.inputs[0].witness;
        assert_eq!(witness.len(), 3);
        assert!(witness[0].is_empty());
        assert_eq!(witness[2], witness_script.as_bytes().to_vec());

        // The signature commits to the BIP143 digest with the witness
        // script as scriptCode.
        let digest = segwit_sighash_with(
            &tx,
            0,
            &witness_script,
            utxo.value,
            SIGHASH_ALL,
            sha256d,
        )
        .expect("digest");
        let sig = Signature::from_der(&witness[1][..witness[1].len() - 1]).expect("der");
        assert!(sig.verify(&digest, &k.pub_key()));
    }

    /// Missing resources surface as typed errors carrying the index.
    #[test]
    fn test_missing_resources() {
        let k = key(13);
        let utxo = UnspentOutput::new(
            OutPoint::new([8; 32], 0),
            50_000,
            template::pay_to_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        let signer = TransactionSigner::new();

        // No key registered.
        assert!(matches!(
            signer.sign(&tx, std::slice::from_ref(&utxo), &KeyRegistry::new(), &ScriptRegistry::new()),
            Err(SignerError::MissingPrivateKey { input_index: 0 })
        ));

        // P2SH with no redeem script registered.
        let p2sh = UnspentOutput::new(
            OutPoint::new([8; 32], 1),
            50_000,
            template::pay_to_script_hash(&[0x77; 20]),
        );
        let tx2 = tx_spending(&p2sh);
        assert!(matches!(
            signer.sign(&tx2, std::slice::from_ref(&p2sh), &KeyRegistry::new(), &ScriptRegistry::new()),
            Err(SignerError::MissingRedeemScript { input_index: 0 })
        ));

        // 2-of-3 with only one key is still MissingPrivateKey.
        let (k0, k1, k2) = (key(14), key(15), key(16));
        let pubkeys: Vec<Vec<u8>> = [&k0, &k1, &k2]
            .iter()
            .map(|k| k.pub_key().to_compressed().to_vec())
            .collect();
        let redeem = template::multisig(2, &pubkeys).unwrap();
        let msig = UnspentOutput::new(
            OutPoint::new([8; 32], 2),
            50_000,
            template::pay_to_script_hash(&hash160(redeem.as_bytes())),
        );
        let tx3 = tx_spending(&msig);
        let mut keys = KeyRegistry::new();
        keys.register(k1);
        let mut scripts = ScriptRegistry::new();
        scripts.register(redeem);
        assert!(matches!(
            signer.sign(&tx3, std::slice::from_ref(&msig), &keys, &scripts),
            Err(SignerError::MissingPrivateKey { input_index: 0 })
        ));
    }

    /// Spending a null-data or unrecognized output is unsupported.
    #[test]
    fn test_unsupported_templates() {
        let utxo = UnspentOutput::new(
            OutPoint::new([9; 32], 0),
            50_000,
            template::null_data(b"data").unwrap(),
        );
        let tx = tx_spending(&utxo);
        assert!(matches!(
            TransactionSigner::new().sign(
                &tx,
                std::slice::from_ref(&utxo),
                &KeyRegistry::new(),
                &ScriptRegistry::new()
            ),
            Err(SignerError::UnsupportedScriptType { input_index: 0, .. })
        ));
    }

    /// Compile verifies and assembles an externally produced signature,
    /// and the result equals in-process signing.
    #[test]
    fn test_compile_matches_sign() {
        let k = key(17);
        let utxo = UnspentOutput::new(
            OutPoint::new([10; 32], 0),
            120_000,
            template::pay_to_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        let signer = TransactionSigner::new();
        let scripts = ScriptRegistry::new();

        let digests = signer
            .preimage_hashes(&tx, std::slice::from_ref(&utxo), &scripts)
            .expect("digests");
        let external_sig = k.sign(&digests[0]).expect("sign").to_der();
        let compiled = signer
            .compile(
                &tx,
                std::slice::from_ref(&utxo),
                &[external_sig],
                &[k.pub_key().to_compressed().to_vec()],
                &scripts,
            )
            .expect("should compile");

        let mut keys = KeyRegistry::new();
        keys.register(k);
        let signed = signer
            .sign(&tx, std::slice::from_ref(&utxo), &keys, &scripts)
            .expect("should sign");
        assert_eq!(compiled.to_bytes(), signed.to_bytes());
    }

    /// Compile rejects a signature over the wrong digest and a public
    /// key that does not match the locking script.
    #[test]
    fn test_compile_rejects_bad_pairs() {
        let k = key(18);
        let utxo = UnspentOutput::new(
            OutPoint::new([11; 32], 0),
            120_000,
            template::pay_to_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        let signer = TransactionSigner::new();
        let scripts = ScriptRegistry::new();

        let wrong_sig = k.sign(&[0xEE; 32]).expect("sign").to_der();
        assert!(matches!(
            signer.compile(
                &tx,
                std::slice::from_ref(&utxo),
                &[wrong_sig.clone()],
                &[k.pub_key().to_compressed().to_vec()],
                &scripts,
            ),
            Err(SignerError::SignatureVerificationFailed { input_index: 0 })
        ));

        let other = key(19);
        assert!(matches!(
            signer.compile(
                &tx,
                std::slice::from_ref(&utxo),
                &[wrong_sig],
                &[other.pub_key().to_compressed().to_vec()],
                &scripts,
            ),
            Err(SignerError::SignatureVerificationFailed { input_index: 0 })
        ));
    }

    /// Registry lengths must match the input list.
    #[test]
    fn test_parallel_list_check() {
        let k = key(20);
        let utxo = UnspentOutput::new(
            OutPoint::new([12; 32], 0),
            50_000,
            template::pay_to_pubkey_hash(&k.pub_key().hash160()),
        );
        let tx = tx_spending(&utxo);
        assert!(matches!(
            TransactionSigner::new().sign(&tx, &[], &KeyRegistry::new(), &ScriptRegistry::new()),
            Err(SignerError::MalformedInput(_))
        ));
        assert!(matches!(
            TransactionSigner::new().compile(
                &tx,
                std::slice::from_ref(&utxo),
                &[],
                &[],
                &ScriptRegistry::new()
            ),
            Err(SignerError::MalformedInput(_))
        ));
    }
}
