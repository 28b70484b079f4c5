use std::str::FromStr;

use digest::DynDigest;
use md5::Md5;
use sha1::Sha1;

use crate::errors::{bail, Error};

/// Digest algorithms available for fingerprints and signatures.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, derive_more::Display)]
pub enum HashAlgorithm {
    #[display("MD5")]
    Md5,
    #[display("SHA1")]
    Sha1,
    #[display("SHA256")]
    Sha256,
    #[display("SHA384")]
    Sha384,
    #[display("SHA512")]
    Sha512,
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => bail!("unknown hash {:?}", s),
        }
    }
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
    ];

    /// Lowercase name, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Create a new hasher.
    pub fn new_hasher(self) -> Box<dyn DynDigest + Send + Sync> {
        match self {
            Self::Md5 => Box::<Md5>::default(),
            Self::Sha1 => Box::<Sha1>::default(),
            Self::Sha256 => Box::<sha2::Sha256>::default(),
            Self::Sha384 => Box::<sha2::Sha384>::default(),
            Self::Sha512 => Box::<sha2::Sha512>::default(),
        }
    }

    /// Calculate the digest of the given input data.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        use digest::Digest;

        match self {
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha256 => sha2::Sha256::digest(data).to_vec(),
            Self::Sha384 => sha2::Sha384::digest(data).to_vec(),
            Self::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }

    /// Returns the digest size for the given algorithm.
    pub fn digest_size(self) -> usize {
        use digest::Digest;

        match self {
            Self::Md5 => <Md5 as Digest>::output_size(),
            Self::Sha1 => <Sha1 as Digest>::output_size(),
            Self::Sha256 => <sha2::Sha256 as Digest>::output_size(),
            Self::Sha384 => <sha2::Sha384 as Digest>::output_size(),
            Self::Sha512 => <sha2::Sha512 as Digest>::output_size(),
        }
    }
}
