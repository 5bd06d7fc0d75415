//! ECDSA signature with DER serialization and low-S normalization.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{self};

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// An ECDSA signature over secp256k1.
///
/// Wraps a k256 signature and provides DER encoding/decoding, RFC 6979
/// deterministic signing, and low-S normalization per BIP-0062.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
}

impl Signature {
    /// Parse a signature from its DER encoding.
    ///
    /// # Arguments
    /// * `bytes` - The DER-encoded signature bytes.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if the DER is malformed.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = ecdsa::Signature::from_der(bytes)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }

    /// Serialize this signature to its DER encoding.
    ///
    /// # Returns
    /// The DER bytes (70-72 bytes for low-S signatures).
    pub fn to_der(&self) -> Vec<u8> {
        self.inner.to_der().as_bytes().to_vec()
    }

    /// Produce a low-S normalized signature over a digest.
    ///
    /// Signing is deterministic per RFC 6979.  Digests shorter than 32
    /// bytes are left-padded with zeros to the scalar width.
    ///
    /// # Arguments
    /// * `digest` - The message digest to sign (normally 32 bytes).
    /// * `priv_key` - The private key to sign with.
    ///
    /// # Returns
    /// `Ok(Signature)` on success, or an error if signing fails.
    pub fn sign(digest: &[u8], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let padded = normalize_digest(digest);
        let sig: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(&padded)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        // Low-S normalization per BIP-0062.
        let sig = sig.normalize_s().unwrap_or(sig);
        Ok(Signature { inner: sig })
    }

    /// Verify this signature against a digest and public key.
    ///
    /// # Arguments
    /// * `digest` - The message digest that was signed.
    /// * `pub_key` - The public key to verify against.
    ///
    /// # Returns
    /// `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, digest: &[u8], pub_key: &PublicKey) -> bool {
        let padded = normalize_digest(digest);
        pub_key
            .verifying_key()
            .verify_prehash(&padded, &self.inner)
            .is_ok()
    }
}

/// Pad or truncate a digest to the 32-byte secp256k1 scalar width.
fn normalize_digest(digest: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    if digest.len() >= 32 {
        padded.copy_from_slice(&digest[..32]);
    } else {
        padded[32 - digest.len()..].copy_from_slice(digest);
    }
    padded
}
