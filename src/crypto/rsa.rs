use log::debug;
use md5::Md5;
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use zeroize::ZeroizeOnDrop;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::Signer;
use crate::errors::{ensure, unsupported_err, Result};
use crate::types::Mpi;

/// Largest modulus we accept, in bits.
pub const MAX_KEY_SIZE: usize = 16384;

/// Private key for RSA. Only the two prime form is supported.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct SecretKey {
    #[debug("..")]
    key: RsaPrivateKey,
}

// `RsaPrivateKey` zeroizes its components when dropped.
impl ZeroizeOnDrop for SecretKey {}

impl SecretKey {
    /// Builds a key from its components, validating them with the provider.
    pub(crate) fn try_from_components(n: &Mpi, e: &Mpi, d: &Mpi, p: &Mpi, q: &Mpi) -> Result<Self> {
        ensure!(
            n.bits() <= MAX_KEY_SIZE,
            "RSA modulus of {} bits is too large",
            n.bits()
        );
        let key = RsaPrivateKey::from_components(
            n.into(),
            e.into(),
            d.into(),
            vec![p.into(), q.into()],
        )?;
        key.validate()?;

        Ok(Self { key })
    }

    /// Generate an RSA `SecretKey`.
    pub fn generate<R: Rng + CryptoRng>(mut rng: R, bits: usize) -> Result<Self> {
        if bits > MAX_KEY_SIZE {
            unsupported_err!("RSA keys of {} bits", bits);
        }
        let key = RsaPrivateKey::new(&mut rng, bits)?;
        Ok(Self { key })
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.key.to_public_key()
    }

    pub fn d(&self) -> Mpi {
        self.key.d().into()
    }

    pub fn p(&self) -> Mpi {
        self.key.primes()[0].clone().into()
    }

    pub fn q(&self) -> Mpi {
        self.key.primes()[1].clone().into()
    }

    /// `d mod (p - 1)`
    pub fn dp(&self) -> Mpi {
        match self.key.dp() {
            Some(dp) => dp.into(),
            None => (self.key.d() % (&self.key.primes()[0] - BigUint::from(1u32))).into(),
        }
    }

    /// `d mod (q - 1)`
    pub fn dq(&self) -> Mpi {
        match self.key.dq() {
            Some(dq) => dq.into(),
            None => (self.key.d() % (&self.key.primes()[1] - BigUint::from(1u32))).into(),
        }
    }

    /// `q^-1 mod p`, called `iqmp` by OpenSSH and `coefficient` by PKCS#1.
    pub fn iqmp(&self) -> Result<Mpi> {
        match self.key.crt_coefficient() {
            Some(iqmp) => Ok(iqmp.into()),
            None => crate::corrupt_err!("RSA primes have no CRT coefficient"),
        }
    }
}

/// The PKCS#1 v1.5 signature scheme carrying the DigestInfo prefix of `hash`.
fn scheme(hash: HashAlgorithm) -> Pkcs1v15Sign {
    match hash {
        HashAlgorithm::Md5 => Pkcs1v15Sign::new::<Md5>(),
        HashAlgorithm::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
        HashAlgorithm::Sha256 => Pkcs1v15Sign::new::<sha2::Sha256>(),
        HashAlgorithm::Sha384 => Pkcs1v15Sign::new::<sha2::Sha384>(),
        HashAlgorithm::Sha512 => Pkcs1v15Sign::new::<sha2::Sha512>(),
    }
}

impl Signer for SecretKey {
    /// Returns the signature block, padded to the modulus length.
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<Vec<u8>>> {
        debug!("RSA sign with {} ({} bit modulus)", hash, self.key.n().bits());
        let sig = self
            .key
            .sign_with_rng(&mut rand::thread_rng(), scheme(hash), digest)?;
        let sig = Mpi::from_slice(&sig).to_padded(self.key.size())?;

        Ok(vec![sig])
    }
}

/// Verify a RSA, PKCS1v15 padded signature.
pub fn verify(key: &RsaPublicKey, hash: HashAlgorithm, hashed: &[u8], sig: &[u8]) -> Result<()> {
    // short encodings are accepted, the provider expects the full block
    let sig = Mpi::from_slice(sig).to_padded(key.size())?;
    key.verify(scheme(hash), hashed, &sig)?;

    Ok(())
}

pub(crate) fn public_key_from_mpi(n: &Mpi, e: &Mpi) -> Result<RsaPublicKey> {
    let key = RsaPublicKey::new_with_max_size(BigUint::from(n), BigUint::from(e), MAX_KEY_SIZE)?;
    Ok(key)
}
