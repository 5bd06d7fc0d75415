//! secp256k1 public key with hash160 and signature verification.

use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;

use crate::ec::signature::Signature;
use crate::hash::hash160;
use crate::PrimitivesError;

/// Length of a compressed SEC1 public key.
const COMPRESSED_LEN: usize = 33;

/// A secp256k1 public key.
///
/// Wraps a k256 `VerifyingKey` and provides SEC1 serialization, the
/// 20-byte hash160 used by P2PKH/P2WPKH scripts, and ECDSA verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// The underlying k256 verifying key.
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a public key from SEC1-encoded bytes (compressed or uncompressed).
    ///
    /// # Arguments
    /// * `bytes` - 33-byte compressed or 65-byte uncompressed point encoding.
    ///
    /// # Returns
    /// `Ok(PublicKey)` if the bytes encode a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let inner = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| PrimitivesError::InvalidPublicKey(e.to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Create a public key from a hex-encoded SEC1 string.
    ///
    /// # Arguments
    /// * `hex_str` - Hex encoding of the compressed or uncompressed point.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the hex or point is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| PrimitivesError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Wrap an existing k256 verifying key.
    pub(crate) fn from_verifying_key(inner: VerifyingKey) -> Self {
        PublicKey { inner }
    }

    /// Serialize to the 33-byte compressed SEC1 encoding.
    ///
    /// # Returns
    /// The compressed point bytes.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize to a lowercase hex string of the compressed encoding.
    ///
    /// # Returns
    /// A 66-character hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Compute the hash160 (RIPEMD-160 of SHA-256) of the compressed encoding.
    ///
    /// This is the 20-byte value that P2PKH and P2WPKH locking scripts
    /// commit to, and the lookup key used by the signer's key registry.
    ///
    /// # Returns
    /// The 20-byte public key hash.
    pub fn hash160(&self) -> [u8; 20] {
        hash160(&self.to_compressed())
    }

    /// Verify an ECDSA signature over a digest.
    ///
    /// # Arguments
    /// * `digest` - The message digest that was signed.
    /// * `sig` - The signature to verify.
    ///
    /// # Returns
    /// `true` if the signature is valid for this key.
    pub fn verify(&self, digest: &[u8], sig: &Signature) -> bool {
        sig.verify(digest, self)
    }

    /// Access the underlying k256 verifying key.
    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.inner
    }
}
