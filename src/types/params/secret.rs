use zeroize::ZeroizeOnDrop;

use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::KeyType;
use crate::crypto::{dsa, ecdsa, ed25519, rsa, Signer};
use crate::errors::Result;

/// The secret half of a key.
///
/// Every variant determines its public parameters, see
/// [`PublicParams`](super::PublicParams)'s `From<&SecretParams>`.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop, derive_more::Debug)]
pub enum SecretParams {
    Rsa(rsa::SecretKey),
    Dsa(dsa::SecretKey),
    Ecdsa(ecdsa::SecretKey),
    Ed25519(ed25519::SecretKey),
}

impl SecretParams {
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa(_) => KeyType::Rsa,
            Self::Dsa(_) => KeyType::Dsa,
            Self::Ecdsa(_) => KeyType::Ecdsa,
            Self::Ed25519(_) => KeyType::Ed25519,
        }
    }

    pub fn curve(&self) -> Option<EcdsaCurve> {
        match self {
            Self::Ecdsa(key) => Some(key.curve()),
            _ => None,
        }
    }
}

impl Signer for SecretParams {
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<Vec<u8>>> {
        match self {
            Self::Rsa(key) => key.sign(hash, digest),
            Self::Dsa(key) => key.sign(hash, digest),
            Self::Ecdsa(key) => key.sign(hash, digest),
            Self::Ed25519(key) => key.sign(hash, digest),
        }
    }
}
