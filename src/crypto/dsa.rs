use std::ops::Deref;

pub use dsa::KeySize;
use dsa::{Components, Signature, SigningKey, VerifyingKey};
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use signature::hazmat::PrehashVerifier;
use zeroize::ZeroizeOnDrop;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::Signer;
use crate::errors::{ensure, Result};
use crate::types::Mpi;

// NIST FIPS 186-4 (section 4.2) limits L and N to 3072/256, common
// tooling accepts moduli up to 4096 bits.
const MAX_L_BITS: usize = 4096;
const MAX_N_BITS: usize = 256;

/// Secret key for DSA.
#[derive(Clone, PartialEq, derive_more::Debug)]
pub struct SecretKey {
    #[debug("..")]
    key: SigningKey,
}

// `SigningKey` zeroizes `x` when dropped.
impl ZeroizeOnDrop for SecretKey {}

impl Deref for SecretKey {
    type Target = SigningKey;
    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

impl Eq for SecretKey {}

impl SecretKey {
    pub(crate) fn try_from_mpi(public: &VerifyingKey, x: &Mpi) -> Result<Self> {
        let key = SigningKey::from_components(public.clone(), x.into())?;
        Ok(Self { key })
    }

    /// Generate a DSA `SecretKey`.
    pub fn generate<R: Rng + CryptoRng>(mut rng: R, key_size: KeySize) -> Self {
        let components = Components::generate(&mut rng, key_size);
        let key = SigningKey::generate(&mut rng, components);

        Self { key }
    }

    pub fn x(&self) -> Mpi {
        self.key.x().into()
    }
}

/// Builds a verifying key from the domain parameters and `y`.
pub(crate) fn public_key_from_mpi(p: &Mpi, q: &Mpi, g: &Mpi, y: &Mpi) -> Result<VerifyingKey> {
    // Cap the lengths to avoid inputs that cause expensive validation.
    ensure!(p.bits() <= MAX_L_BITS, "p is too long ({} bits)", p.bits());
    ensure!(q.bits() <= MAX_N_BITS, "q is too long ({} bits)", q.bits());
    ensure!(g.len() <= p.len(), "g is longer than p ({} bytes)", g.len());
    ensure!(y.len() <= p.len(), "y is longer than p ({} bytes)", y.len());

    let components = Components::from_components(p.into(), q.into(), g.into())?;
    let key = VerifyingKey::from_components(components, y.into())?;

    Ok(key)
}

impl Signer for SecretKey {
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<Vec<u8>>> {
        let signing_key = &self.key;
        let signature = match hash {
            HashAlgorithm::Md5 => signing_key.sign_prehashed_rfc6979::<md5::Md5>(digest),
            HashAlgorithm::Sha1 => signing_key.sign_prehashed_rfc6979::<sha1::Sha1>(digest),
            HashAlgorithm::Sha256 => signing_key.sign_prehashed_rfc6979::<sha2::Sha256>(digest),
            HashAlgorithm::Sha384 => signing_key.sign_prehashed_rfc6979::<sha2::Sha384>(digest),
            HashAlgorithm::Sha512 => signing_key.sign_prehashed_rfc6979::<sha2::Sha512>(digest),
        }?;

        Ok(vec![
            signature.r().to_bytes_be(),
            signature.s().to_bytes_be(),
        ])
    }
}

/// Verify a DSA signature.
pub fn verify(key: &VerifyingKey, hashed: &[u8], r: BigUint, s: BigUint) -> Result<()> {
    let signature = Signature::from_components(r, s)?;
    key.verify_prehash(hashed, &signature)?;

    Ok(())
}
