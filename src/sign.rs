//! Streaming signing and verification.
//!
//! A [`Signer`] or [`Verifier`] accumulates input through `update` (or
//! [`std::io::Write`]) and is consumed by its final `sign` / `verify` call,
//! so it can not be written to once finalized.

use std::io;

use digest::DynDigest;
use log::debug;

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::KeyType;
use crate::crypto::{dsa, ecdsa, ed25519, rsa, Signer as _};
use crate::errors::{Error, Result};
use crate::types::{PublicParams, SecretParams, Signature};

/// The input accumulated so far.
enum Accumulator {
    Digest(Box<dyn DynDigest + Send + Sync>),
    /// Ed25519 signs the message itself.
    Message(Vec<u8>),
}

impl Accumulator {
    fn new(key_type: KeyType, hash: HashAlgorithm) -> Result<Self> {
        match key_type {
            KeyType::Ed25519 => {
                ed25519::check_hash(hash)?;
                Ok(Self::Message(Vec::new()))
            }
            _ => Ok(Self::Digest(hash.new_hasher())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Digest(hasher) => hasher.update(data),
            Self::Message(buf) => buf.extend_from_slice(data),
        }
    }

    /// The digest, or the message for Ed25519.
    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Digest(hasher) => hasher.finalize().into_vec(),
            Self::Message(buf) => buf,
        }
    }
}

/// Signs the data written to it with a private key.
pub struct Signer<'a> {
    key: &'a SecretParams,
    hash: HashAlgorithm,
    acc: Accumulator,
}

impl<'a> Signer<'a> {
    /// Fails with [`Error::InvalidDigest`] if `hash` can not be used with `key`.
    pub(crate) fn new(key: &'a SecretParams, hash: HashAlgorithm) -> Result<Self> {
        let acc = Accumulator::new(key.key_type(), hash)?;
        Ok(Self { key, hash, acc })
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn update(&mut self, data: &[u8]) {
        self.acc.update(data);
    }

    pub fn sign(self) -> Result<Signature> {
        let key_type = self.key.key_type();
        debug!("signing with {} key and {}", key_type, self.hash);
        let data = self.acc.finalize();
        let components = self.key.sign(self.hash, &data)?;

        Signature::from_components(key_type, self.key.curve(), self.hash, components)
    }
}

impl io::Write for Signer<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Verifies a signature over the data written to it.
pub struct Verifier<'a> {
    key: &'a PublicParams,
    hash: HashAlgorithm,
    acc: Accumulator,
}

impl<'a> Verifier<'a> {
    /// Fails with [`Error::InvalidDigest`] if `hash` can not be used with `key`.
    pub(crate) fn new(key: &'a PublicParams, hash: HashAlgorithm) -> Result<Self> {
        let acc = Accumulator::new(key.key_type(), hash)?;
        Ok(Self { key, hash, acc })
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn update(&mut self, data: &[u8]) {
        self.acc.update(data);
    }

    /// Returns `Ok(false)` for a signature that does not verify, including
    /// one made by a key of another algorithm or curve.
    ///
    /// Fails with [`Error::MalformedSignature`] if the signature can not be
    /// decoded for the key's algorithm.
    pub fn verify(self, signature: &Signature) -> Result<bool> {
        if signature.key_type() != self.key.key_type() {
            debug!(
                "{} signature checked against a {} key",
                signature.key_type(),
                self.key.key_type()
            );
            return Ok(false);
        }
        if let (Some(sig_curve), Some(key_curve)) = (signature.curve(), self.key.curve()) {
            if sig_curve != key_curve {
                debug!("{} signature checked against a {} key", sig_curve, key_curve);
                return Ok(false);
            }
        }

        let data = self.acc.finalize();
        let res = match self.key {
            // longer than the modulus is a format error
            PublicParams::Rsa(params) => rsa::verify(&params.key, self.hash, &data, signature.as_bytes()),
            PublicParams::Dsa(params) => {
                let (r, s) = signature.r_s()?;
                dsa::verify(&params.key, &data, r.to_biguint(), s.to_biguint())
            }
            PublicParams::Ecdsa(params) => {
                let (r, s) = signature.r_s()?;
                ecdsa::verify(params.curve, params.point(), &data, &r, &s)
            }
            PublicParams::Ed25519(params) => {
                let sig = signature.ed25519_bytes()?;
                ed25519::verify(&params.key, &data, &sig)
            }
        };

        match res {
            Ok(()) => Ok(true),
            Err(Error::Signature { .. } | Error::Rsa { .. } | Error::EllipticCurve { .. }) => {
                debug!("signature does not verify");
                Ok(false)
            }
            Err(Error::Format { message }) => Err(Error::MalformedSignature { message }),
            Err(err) => Err(err),
        }
    }
}

impl io::Write for Verifier<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::crypto::ecc_curve::EcdsaCurve;
    use crate::crypto::{dsa, ecdsa, ed25519, rsa};
    use crate::types::SignatureFormat;

    fn keys() -> Vec<SecretParams> {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        #[allow(deprecated)]
        let keys = vec![
            SecretParams::Rsa(rsa::SecretKey::generate(&mut rng, 1024).unwrap()),
            SecretParams::Dsa(dsa::SecretKey::generate(&mut rng, dsa::KeySize::DSA_1024_160)),
            SecretParams::Ecdsa(ecdsa::SecretKey::generate(&mut rng, EcdsaCurve::NistP256)),
            SecretParams::Ecdsa(ecdsa::SecretKey::generate(&mut rng, EcdsaCurve::NistP521)),
            SecretParams::Ed25519(ed25519::SecretKey::generate(&mut rng)),
        ];
        keys
    }

    fn sign(key: &SecretParams, hash: HashAlgorithm, chunks: &[&[u8]]) -> Signature {
        let mut signer = Signer::new(key, hash).unwrap();
        for chunk in chunks {
            signer.update(chunk);
        }
        signer.sign().unwrap()
    }

    fn verify(key: &PublicParams, hash: HashAlgorithm, data: &[u8], sig: &Signature) -> bool {
        let mut verifier = Verifier::new(key, hash).unwrap();
        verifier.write_all(data).unwrap();
        verifier.verify(sig).unwrap()
    }

    #[test]
    fn test_sign_verify() {
        let _ = pretty_env_logger::try_init();
        for key in keys() {
            let public = PublicParams::from(&key);
            let hash = match key.key_type() {
                KeyType::Ed25519 => HashAlgorithm::Sha512,
                _ => HashAlgorithm::Sha256,
            };

            let sig = sign(&key, hash, &[b"hello ", b"world"]);
            assert_eq!(sig.key_type(), key.key_type());
            assert_eq!(sig.hash(), Some(hash));
            assert!(verify(&public, hash, b"hello world", &sig));
            assert!(!verify(&public, hash, b"hello world!", &sig));

            // the verifier does not need the metadata carried by `sig`
            let reparsed = Signature::parse(sig.as_bytes(), key.key_type(), SignatureFormat::Asn1).unwrap();
            assert!(verify(&public, hash, b"hello world", &reparsed));
        }
    }

    #[test]
    fn test_wrong_key_is_false() {
        let keys = keys();
        for (i, signing) in keys.iter().enumerate() {
            let hash = HashAlgorithm::Sha512;
            let sig = sign(signing, hash, &[b"data"]);
            for (j, other) in keys.iter().enumerate() {
                if i == j {
                    continue;
                }
                let public = PublicParams::from(other);
                assert!(!verify(&public, hash, b"data", &sig), "{} / {}", i, j);
            }
        }
    }

    #[test]
    fn test_ed25519_digest_restriction() {
        let key = SecretParams::Ed25519(ed25519::SecretKey::generate(ChaCha8Rng::seed_from_u64(2)));
        for hash in HashAlgorithm::ALL {
            let res = Signer::new(&key, hash);
            if hash == HashAlgorithm::Sha512 {
                assert!(res.is_ok());
            } else {
                assert!(matches!(res, Err(Error::InvalidDigest { .. })));
            }
        }
        let public = PublicParams::from(&key);
        assert!(matches!(
            Verifier::new(&public, HashAlgorithm::Sha1),
            Err(Error::InvalidDigest { .. })
        ));
    }

    #[test]
    fn test_oversized_rsa_signature() {
        let key = SecretParams::Rsa(rsa::SecretKey::generate(ChaCha8Rng::seed_from_u64(8), 1024).unwrap());
        let public = PublicParams::from(&key);
        let sig = Signature::parse(&[0xffu8; 129], KeyType::Rsa, SignatureFormat::Asn1).unwrap();
        let verifier = Verifier::new(&public, HashAlgorithm::Sha256).unwrap();
        assert!(matches!(
            verifier.verify(&sig),
            Err(Error::MalformedSignature { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        for key in keys() {
            let public = PublicParams::from(&key);
            let sig = sign(&key, HashAlgorithm::Sha512, &[]);
            assert!(verify(&public, HashAlgorithm::Sha512, b"", &sig));
        }
    }
}
