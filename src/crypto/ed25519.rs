//! Pure Ed25519 (RFC 8032).
//!
//! Unlike the other algorithms, Ed25519 signs the message itself. The sign
//! engine therefore hands over the accumulated message rather than a digest;
//! the only hash it will accept for these keys is SHA-512, the one Ed25519
//! uses internally.

use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use rand::{CryptoRng, Rng};
use signature::{Signer as _, Verifier};
use zeroize::{ZeroizeOnDrop, Zeroizing};

use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::KeyType;
use crate::crypto::Signer;
use crate::errors::{corrupt_err, ensure_eq, Error, Result};

/// Secret key for Ed25519.
#[derive(Clone, PartialEq, Eq, ZeroizeOnDrop, derive_more::Debug)]
pub struct SecretKey {
    /// The secret seed.
    #[debug("..")]
    pub secret: SigningKey,
}

impl SecretKey {
    /// Generate an Ed25519 `SecretKey`.
    pub fn generate<R: Rng + CryptoRng>(mut rng: R) -> Self {
        let mut bytes = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        rng.fill_bytes(&mut *bytes);
        let secret = SigningKey::from_bytes(&bytes);

        SecretKey { secret }
    }

    /// Reads a 32 byte seed.
    pub(crate) fn try_from_seed(seed: &[u8]) -> Result<Self> {
        ensure_eq!(seed.len(), SECRET_KEY_LENGTH, "ed25519 seed length");
        let mut raw = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        raw.copy_from_slice(seed);
        Ok(Self {
            secret: SigningKey::from_bytes(&raw),
        })
    }

    /// Reads the 64 byte `seed || public` form, checking the public half.
    pub(crate) fn try_from_keypair(raw: &[u8]) -> Result<Self> {
        ensure_eq!(
            raw.len(),
            SECRET_KEY_LENGTH + PUBLIC_KEY_LENGTH,
            "ed25519 keypair length"
        );
        let key = Self::try_from_seed(&raw[..SECRET_KEY_LENGTH])?;
        if key.secret.verifying_key().as_bytes() != &raw[SECRET_KEY_LENGTH..] {
            corrupt_err!("ed25519 public half does not match the seed");
        }
        Ok(key)
    }

    pub fn seed(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// `seed || public`, as stored by OpenSSH.
    pub fn keypair_bytes(&self) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.secret.to_keypair_bytes())
    }

    pub fn public_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }
}

/// Ed25519 only permits SHA-512.
pub fn check_hash(hash: HashAlgorithm) -> Result<()> {
    if hash != HashAlgorithm::Sha512 {
        return Err(Error::InvalidDigest {
            hash,
            key_type: KeyType::Ed25519,
        });
    }
    Ok(())
}

impl Signer for SecretKey {
    fn sign(&self, hash: HashAlgorithm, message: &[u8]) -> Result<Vec<Vec<u8>>> {
        check_hash(hash)?;

        let signature = self.secret.sign(message);
        let bytes = signature.to_bytes();

        let r = bytes[..32].to_vec();
        let s = bytes[32..].to_vec();

        Ok(vec![r, s])
    }
}

/// Verify an Ed25519 signature over `message`.
pub fn verify(key: &VerifyingKey, message: &[u8], sig_bytes: &[u8; 64]) -> Result<()> {
    let sig = ed25519_dalek::Signature::from_bytes(sig_bytes);
    key.verify(message, &sig)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    /// RFC 8032 section 7.1, TEST 2
    #[test]
    fn test_rfc8032_vector() {
        let seed = hex_literal::hex!("4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb");
        let key = SecretKey::try_from_seed(&seed).unwrap();
        assert_eq!(
            key.public_key().as_bytes(),
            &hex_literal::hex!("3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c")
        );

        let sig = key.sign(HashAlgorithm::Sha512, &[0x72]).unwrap();
        let expected = hex_literal::hex!(
            "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da"
            "085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00"
        );
        assert_eq!(sig.concat(), expected.to_vec());
        verify(&key.public_key(), &[0x72], &expected).unwrap();
        assert!(verify(&key.public_key(), &[0x73], &expected).is_err());
    }

    #[test]
    fn test_only_sha512() {
        let key = SecretKey::generate(ChaCha8Rng::seed_from_u64(3));
        for hash in HashAlgorithm::ALL {
            let res = key.sign(hash, b"foobar");
            if hash == HashAlgorithm::Sha512 {
                assert!(res.is_ok());
            } else {
                assert!(matches!(res, Err(Error::InvalidDigest { .. })));
            }
        }
    }

    #[test]
    fn test_keypair_public_half_checked() {
        let key = SecretKey::generate(ChaCha8Rng::seed_from_u64(4));
        let mut raw = *key.keypair_bytes();
        assert_eq!(SecretKey::try_from_keypair(&raw).unwrap(), key);

        raw[63] ^= 1;
        let err = SecretKey::try_from_keypair(&raw).unwrap_err();
        assert!(matches!(err, Error::CorruptKey { .. }));
    }
}
