//! # Keys
//!
//! [`PublicKey`] and [`PrivateKey`] pair the algorithm parameters with the
//! optional comment carried by the OpenSSH formats. Both are immutable,
//! every conversion returns a new value.

mod builder;
mod public;
mod secret;

pub use self::builder::{DsaKeySize, KeyGenParams};
pub use self::public::PublicKey;
pub use self::secret::PrivateKey;
use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::KeyType;
use crate::errors::Result;
use crate::sign::Verifier;
use crate::types::{Fingerprint, PublicParams};

/// Metadata shared by public and private keys.
pub trait KeyDetails: std::fmt::Debug {
    /// Returns the parameters for the public portion of this key.
    fn public_params(&self) -> &PublicParams;

    fn comment(&self) -> Option<&str>;

    fn key_type(&self) -> KeyType {
        self.public_params().key_type()
    }

    /// Key size in bits: the RSA modulus, the DSA `p`, the ECDSA curve order.
    /// Ed25519 keys are 256 bits.
    fn size(&self) -> usize {
        self.public_params().size()
    }

    fn curve(&self) -> Option<EcdsaCurve> {
        self.public_params().curve()
    }

    /// Digest of the RFC 4253 encoding of the public key.
    fn fingerprint(&self, hash: HashAlgorithm) -> Result<Fingerprint> {
        Fingerprint::of_params(self.public_params(), hash)
    }

    /// Starts verifying a signature made over data hashed with `hash`.
    ///
    /// Ed25519 keys only accept [`HashAlgorithm::Sha512`].
    fn create_verify(&self, hash: HashAlgorithm) -> Result<Verifier<'_>> {
        Verifier::new(self.public_params(), hash)
    }
}

impl<T: KeyDetails> KeyDetails for &T {
    fn public_params(&self) -> &PublicParams {
        (*self).public_params()
    }

    fn comment(&self) -> Option<&str> {
        (*self).comment()
    }
}
