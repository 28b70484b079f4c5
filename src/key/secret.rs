use log::debug;
use rand::{CryptoRng, Rng};

use crate::crypto::hash::HashAlgorithm;
use crate::errors::Result;
use crate::formats::{self, EncodeOptions, KeyFormat};
use crate::key::{KeyDetails, KeyGenParams, PublicKey};
use crate::sign::Signer;
use crate::types::{PublicParams, SecretParams};

/// A private key, its public projection and its optional comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: SecretParams,
    public: PublicParams,
    comment: Option<String>,
}

impl PrivateKey {
    pub fn new(secret: SecretParams, comment: Option<String>) -> Self {
        let public = PublicParams::from(&secret);
        Self {
            secret,
            public,
            comment,
        }
    }

    /// Creates a fresh key.
    pub fn generate<R: Rng + CryptoRng>(rng: R, params: KeyGenParams) -> Result<Self> {
        debug!("generating {:?} key", params);
        let secret = params.generate(rng)?;
        Ok(Self::new(secret, None))
    }

    /// Parses a private key encoded as `format`.
    pub fn parse(input: &[u8], format: KeyFormat) -> Result<Self> {
        let (secret, comment) = formats::parse_private(input, format)?;
        let key = Self::new(secret, comment);
        debug!("parsed {} private key ({} bits) from {}", key.key_type(), key.size(), format);
        Ok(key)
    }

    pub fn encode(&self, format: KeyFormat) -> Result<Vec<u8>> {
        self.encode_with(format, &EncodeOptions::default())
    }

    pub fn encode_with(&self, format: KeyFormat, options: &EncodeOptions) -> Result<Vec<u8>> {
        formats::encode_private(&self.secret, self.comment.as_deref(), format, options)
    }

    pub fn secret_params(&self) -> &SecretParams {
        &self.secret
    }

    /// The public half of this key, with the same comment.
    pub fn to_public(&self) -> PublicKey {
        PublicKey::new(self.public.clone(), self.comment.clone())
    }

    /// Returns a copy of this key carrying `comment`.
    pub fn with_comment(&self, comment: Option<String>) -> Self {
        Self {
            comment,
            ..self.clone()
        }
    }

    /// Starts signing data hashed with `hash`.
    ///
    /// Ed25519 keys only accept [`HashAlgorithm::Sha512`].
    pub fn create_sign(&self, hash: HashAlgorithm) -> Result<Signer<'_>> {
        Signer::new(&self.secret, hash)
    }
}

impl KeyDetails for PrivateKey {
    fn public_params(&self) -> &PublicParams {
        &self.public
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::crypto::ecc_curve::EcdsaCurve;
    use crate::crypto::public_key::KeyType;
    use crate::key::DsaKeySize;

    #[test]
    fn test_generate() {
        let _ = pretty_env_logger::try_init();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let cases = [
            (KeyGenParams::Rsa(1024), KeyType::Rsa, 1024),
            (KeyGenParams::Dsa(DsaKeySize::B1024), KeyType::Dsa, 1024),
            (KeyGenParams::Ecdsa(EcdsaCurve::NistP384), KeyType::Ecdsa, 384),
            (KeyGenParams::Ecdsa(EcdsaCurve::NistP521), KeyType::Ecdsa, 521),
            (KeyGenParams::Ed25519, KeyType::Ed25519, 256),
        ];

        for (params, key_type, size) in cases {
            let key = PrivateKey::generate(&mut rng, params).unwrap();
            assert_eq!(key.key_type(), key_type);
            assert_eq!(key.size(), size);
            assert_eq!(key.comment(), None);
        }
    }

    #[test]
    fn test_to_public() {
        let key = PrivateKey::generate(ChaCha8Rng::seed_from_u64(1), KeyGenParams::Ed25519)
            .unwrap()
            .with_comment(Some("test".to_string()));
        let public = key.to_public();

        assert_eq!(public.comment(), Some("test"));
        assert_eq!(public.public_params(), key.public_params());
        assert_eq!(
            key.fingerprint(HashAlgorithm::Sha256).unwrap(),
            public.fingerprint(HashAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn test_sign_and_self_verify() {
        let key = PrivateKey::generate(
            ChaCha8Rng::seed_from_u64(2),
            KeyGenParams::Ecdsa(EcdsaCurve::NistP256),
        )
        .unwrap();

        let mut signer = key.create_sign(HashAlgorithm::Sha256).unwrap();
        signer.update(b"message");
        let sig = signer.sign().unwrap();

        let mut verifier = key.create_verify(HashAlgorithm::Sha256).unwrap();
        verifier.update(b"message");
        assert!(verifier.verify(&sig).unwrap());
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PrivateKey>();
        assert_send_sync::<PublicKey>();
    }
}
