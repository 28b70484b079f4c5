//! # keyfmt
//!
//! Reading, converting, fingerprinting and signing with SSH and PEM
//! encoded keys.
//!
//! Keys are parsed from an explicitly named [`KeyFormat`] into a
//! [`PrivateKey`] or [`PublicKey`], and can be written to any other
//! format able to represent them.
//!
//! ```no_run
//! use keyfmt::{HashAlgorithm, KeyDetails, KeyFormat, PrivateKey};
//!
//! # fn main() -> keyfmt::errors::Result<()> {
//! let pem = std::fs::read("id_ed25519")?;
//! let key = PrivateKey::parse(&pem, KeyFormat::OpenSsh)?;
//! println!("{}", key.fingerprint(HashAlgorithm::Sha256)?);
//!
//! let mut signer = key.create_sign(HashAlgorithm::Sha512)?;
//! signer.update(b"hello world");
//! let signature = signer.sign()?;
//!
//! let public = key.to_public();
//! let mut verifier = public.create_verify(HashAlgorithm::Sha512)?;
//! verifier.update(b"hello world");
//! assert!(verifier.verify(&signature)?);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![deny(unsafe_code)]

pub mod armor;
pub mod crypto;
pub mod der;
pub mod errors;
pub mod formats;
pub mod key;
pub mod sign;
pub mod types;
pub mod wire;

pub use self::crypto::{ecc_curve::EcdsaCurve, hash::HashAlgorithm, public_key::KeyType};
pub use self::errors::{Error, Result};
pub use self::formats::{sniff, EncodeOptions, EncodeOptionsBuilder, KeyFormat};
pub use self::key::{DsaKeySize, KeyDetails, KeyGenParams, PrivateKey, PublicKey};
pub use self::sign::{Signer, Verifier};
pub use self::types::{Fingerprint, FingerprintFormat, Signature, SignatureFormat};
