/// coinkit - Hashing, wire serialization, and secp256k1 primitives.
///
/// This crate provides the foundational building blocks for the coinkit
/// transaction engine:
/// - Hash functions (SHA-256, double SHA-256, RIPEMD-160, Hash160) and the
///   chain-selectable `HashFunction` capability type
/// - Wire serialization helpers (compactSize varints, cursor reader, buffer writer)
/// - Elliptic curve cryptography (secp256k1 keys and ECDSA signatures)

pub mod hash;
pub mod util;
pub mod ec;

mod error;
pub use error::PrimitivesError;
