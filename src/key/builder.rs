use rand::{CryptoRng, Rng};

use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::{dsa, ecdsa, ed25519, rsa};
use crate::errors::Result;
use crate::types::SecretParams;

/// What [`PrivateKey::generate`](super::PrivateKey::generate) creates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyGenParams {
    /// RSA with the given modulus size in bits.
    Rsa(u32),
    Dsa(DsaKeySize),
    Ecdsa(EcdsaCurve),
    Ed25519,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum DsaKeySize {
    /// DSA parameter size constant: L = 1024, N = 160
    B1024,
    /// DSA parameter size constant: L = 2048, N = 224
    B2048_224,
    /// DSA parameter size constant: L = 2048, N = 256
    B2048,
    /// DSA parameter size constant: L = 3072, N = 256
    B3072,
}

impl From<DsaKeySize> for dsa::KeySize {
    fn from(value: DsaKeySize) -> Self {
        match value {
            #[allow(deprecated)]
            DsaKeySize::B1024 => dsa::KeySize::DSA_1024_160,
            DsaKeySize::B2048_224 => dsa::KeySize::DSA_2048_224,
            DsaKeySize::B2048 => dsa::KeySize::DSA_2048_256,
            DsaKeySize::B3072 => dsa::KeySize::DSA_3072_256,
        }
    }
}

impl KeyGenParams {
    pub(crate) fn generate<R: Rng + CryptoRng>(&self, rng: R) -> Result<SecretParams> {
        let params = match self {
            KeyGenParams::Rsa(bit_size) => {
                SecretParams::Rsa(rsa::SecretKey::generate(rng, *bit_size as usize)?)
            }
            KeyGenParams::Dsa(key_size) => {
                SecretParams::Dsa(dsa::SecretKey::generate(rng, (*key_size).into()))
            }
            KeyGenParams::Ecdsa(curve) => {
                SecretParams::Ecdsa(ecdsa::SecretKey::generate(rng, *curve))
            }
            KeyGenParams::Ed25519 => SecretParams::Ed25519(ed25519::SecretKey::generate(rng)),
        };

        Ok(params)
    }
}
