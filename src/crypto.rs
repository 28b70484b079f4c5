//! # Cryptography module
//!
//! Thin adapters over the RustCrypto primitives. Nothing in here knows about
//! key file formats, only about key components and signature values.

use self::hash::HashAlgorithm;

pub mod dsa;
pub mod ecdsa;
pub mod ed25519;
pub mod rsa;

pub mod ecc_curve;
pub mod hash;
pub mod public_key;

/// Describes keys that can sign data.
pub trait Signer {
    /// Produces the raw signature components over `digest`.
    ///
    /// RSA yields the signature block, DSA and ECDSA yield `r` and `s`,
    /// Ed25519 yields `R` and `S`. For Ed25519 `digest` is the message itself.
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> crate::errors::Result<Vec<Vec<u8>>>;
}
