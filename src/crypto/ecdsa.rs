use elliptic_curve::sec1::ToEncodedPoint;
use log::debug;
use rand::{CryptoRng, Rng};
use signature::hazmat::{PrehashSigner, PrehashVerifier};
use zeroize::ZeroizeOnDrop;

use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::Signer;
use crate::errors::{ensure, ensure_eq, Result};
use crate::types::Mpi;

/// Secret scalar for ECDSA on one of the supported curves.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop, derive_more::Debug)]
pub enum SecretKey {
    P256(#[debug("..")] p256::SecretKey),
    P384(#[debug("..")] p384::SecretKey),
    P521(#[debug("..")] p521::SecretKey),
}

impl SecretKey {
    /// Reads a big-endian scalar, left padding it to the field size.
    pub(crate) fn try_from_bytes(curve: EcdsaCurve, d: &[u8]) -> Result<Self> {
        let d = crate::types::strip_leading_zeros(d);
        ensure!(
            d.len() <= curve.field_size(),
            "{} scalar of {} bytes",
            curve,
            d.len()
        );
        let padded = zeroize::Zeroizing::new(Mpi::from_slice(d).to_padded(curve.field_size())?);

        let key = match curve {
            EcdsaCurve::NistP256 => Self::P256(p256::SecretKey::from_slice(&padded)?),
            EcdsaCurve::NistP384 => Self::P384(p384::SecretKey::from_slice(&padded)?),
            EcdsaCurve::NistP521 => Self::P521(p521::SecretKey::from_slice(&padded)?),
        };
        Ok(key)
    }

    /// Generate an ECDSA `SecretKey`.
    pub fn generate<R: Rng + CryptoRng>(mut rng: R, curve: EcdsaCurve) -> Self {
        match curve {
            EcdsaCurve::NistP256 => Self::P256(p256::SecretKey::random(&mut rng)),
            EcdsaCurve::NistP384 => Self::P384(p384::SecretKey::random(&mut rng)),
            EcdsaCurve::NistP521 => Self::P521(p521::SecretKey::random(&mut rng)),
        }
    }

    pub fn curve(&self) -> EcdsaCurve {
        match self {
            Self::P256(_) => EcdsaCurve::NistP256,
            Self::P384(_) => EcdsaCurve::NistP384,
            Self::P521(_) => EcdsaCurve::NistP521,
        }
    }

    /// The scalar, padded to the field size.
    pub fn to_bytes(&self) -> zeroize::Zeroizing<Vec<u8>> {
        let bytes = match self {
            Self::P256(key) => key.to_bytes().to_vec(),
            Self::P384(key) => key.to_bytes().to_vec(),
            Self::P521(key) => key.to_bytes().to_vec(),
        };
        zeroize::Zeroizing::new(bytes)
    }

    /// The uncompressed SEC1 encoding of the public point.
    pub fn public_point(&self) -> Vec<u8> {
        match self {
            Self::P256(key) => key.public_key().to_encoded_point(false).as_bytes().to_vec(),
            Self::P384(key) => key.public_key().to_encoded_point(false).as_bytes().to_vec(),
            Self::P521(key) => key.public_key().to_encoded_point(false).as_bytes().to_vec(),
        }
    }
}

/// Left pads digests shorter than the field, the provider rejects them otherwise.
fn prehash(curve: EcdsaCurve, digest: &[u8]) -> Vec<u8> {
    let size = curve.field_size();
    if digest.len() >= size {
        return digest.to_vec();
    }
    let mut out = vec![0u8; size];
    out[size - digest.len()..].copy_from_slice(digest);
    out
}

impl Signer for SecretKey {
    fn sign(&self, hash: HashAlgorithm, digest: &[u8]) -> Result<Vec<Vec<u8>>> {
        let curve = self.curve();
        debug!("ECDSA sign on {} with {}", curve, hash);
        let digest = prehash(curve, digest);

        let bytes = match self {
            Self::P256(key) => {
                let signature: p256::ecdsa::Signature =
                    p256::ecdsa::SigningKey::from(key).sign_prehash(&digest)?;
                signature.to_bytes().to_vec()
            }
            Self::P384(key) => {
                let signature: p384::ecdsa::Signature =
                    p384::ecdsa::SigningKey::from(key).sign_prehash(&digest)?;
                signature.to_bytes().to_vec()
            }
            Self::P521(key) => {
                let key = ecdsa::SigningKey::<p521::NistP521>::from(key);
                let signature: p521::ecdsa::Signature =
                    p521::ecdsa::SigningKey::from(key).sign_prehash(&digest)?;
                signature.to_bytes().to_vec()
            }
        };
        let (r, s) = bytes.split_at(curve.field_size());

        Ok(vec![r.to_vec(), s.to_vec()])
    }
}

/// Validates a SEC1 point on `curve`, returning its uncompressed encoding.
pub(crate) fn normalize_point(curve: EcdsaCurve, point: &[u8]) -> Result<Vec<u8>> {
    ensure!(!point.is_empty(), "empty {} point", curve);
    let point = match curve {
        EcdsaCurve::NistP256 => p256::PublicKey::from_sec1_bytes(point)?
            .to_encoded_point(false)
            .as_bytes()
            .to_vec(),
        EcdsaCurve::NistP384 => p384::PublicKey::from_sec1_bytes(point)?
            .to_encoded_point(false)
            .as_bytes()
            .to_vec(),
        EcdsaCurve::NistP521 => p521::PublicKey::from_sec1_bytes(point)?
            .to_encoded_point(false)
            .as_bytes()
            .to_vec(),
    };
    ensure_eq!(point.len(), curve.point_size(), "{} point length", curve);

    Ok(point)
}

/// Verify an ECDSA signature given as big-endian `r` and `s`.
pub fn verify(curve: EcdsaCurve, point: &[u8], hashed: &[u8], r: &Mpi, s: &Mpi) -> Result<()> {
    let flen = curve.field_size();
    ensure!(r.len() <= flen, "invalid R (len)");
    ensure!(s.len() <= flen, "invalid S (len)");

    let mut sig_bytes = r.to_padded(flen)?;
    sig_bytes.extend_from_slice(&s.to_padded(flen)?);
    let hashed = prehash(curve, hashed);

    match curve {
        EcdsaCurve::NistP256 => {
            let pk = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)?;
            let sig = p256::ecdsa::Signature::from_slice(&sig_bytes)?;
            pk.verify_prehash(&hashed, &sig)?;
        }
        EcdsaCurve::NistP384 => {
            let pk = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)?;
            let sig = p384::ecdsa::Signature::from_slice(&sig_bytes)?;
            pk.verify_prehash(&hashed, &sig)?;
        }
        EcdsaCurve::NistP521 => {
            let pk = p521::ecdsa::VerifyingKey::from_sec1_bytes(point)?;
            let sig = p521::ecdsa::Signature::from_slice(&sig_bytes)?;
            pk.verify_prehash(&hashed, &sig)?;
        }
    }

    Ok(())
}
