//! Elliptic curve cryptography over secp256k1.
//!
//! Private keys, public keys, and ECDSA signatures, wrapped around the
//! `k256` crate.  The transaction engine consumes these as opaque
//! signing/verification capabilities; key derivation from seeds is out
//! of scope and lives with the caller.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::Signature;
