use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;

use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::hash::HashAlgorithm;
use crate::crypto::public_key::KeyType;
use crate::der::{DerReader, DerWriter};
use crate::errors::{bail, unsupported_err, Error, Result};
use crate::types::Mpi;
use crate::wire::{WireRead, WireWrite};

/// Length of each of `r` and `s` in an `ssh-dss` signature blob.
const DSS_COMPONENT_LEN: usize = 20;

/// Serialization of a [`Signature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum SignatureFormat {
    /// The algorithm's native form: the RSA block, a DER `SEQUENCE { r, s }`
    /// for DSA and ECDSA, the 64 raw bytes for Ed25519.
    #[default]
    #[display("asn1")]
    Asn1,
    /// `string(name) || string(blob)` as used inside the SSH protocol.
    #[display("ssh")]
    Ssh,
}

impl FromStr for SignatureFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asn1" | "der" => Ok(Self::Asn1),
            "ssh" => Ok(Self::Ssh),
            _ => bail!("unknown signature format {:?}", s),
        }
    }
}

/// A signature, stored in the native form of its algorithm.
#[derive(Clone, PartialEq, Eq, derive_more::Debug)]
pub struct Signature {
    key_type: KeyType,
    curve: Option<EcdsaCurve>,
    hash: Option<HashAlgorithm>,
    #[debug("{}", hex::encode(bytes))]
    bytes: Vec<u8>,
}

fn malformed(err: Error) -> Error {
    match err {
        Error::MalformedSignature { .. } => err,
        other => Error::MalformedSignature {
            message: other.to_string(),
        },
    }
}

macro_rules! malformed {
    ($($arg:tt)+) => {
        return Err(Error::MalformedSignature { message: format!($($arg)+) })
    };
}

impl Signature {
    /// Assembles the components produced by a [`Signer`](crate::crypto::Signer).
    pub(crate) fn from_components(
        key_type: KeyType,
        curve: Option<EcdsaCurve>,
        hash: HashAlgorithm,
        components: Vec<Vec<u8>>,
    ) -> Result<Self> {
        let bytes = match (key_type, components.as_slice()) {
            (KeyType::Rsa, [block]) => block.clone(),
            (KeyType::Dsa | KeyType::Ecdsa, [r, s]) => {
                encode_der_rs(&Mpi::from_slice(r), &Mpi::from_slice(s))?
            }
            (KeyType::Ed25519, [r, s]) => [r.as_slice(), s.as_slice()].concat(),
            _ => malformed!("{} signature with {} components", key_type, components.len()),
        };

        Ok(Self {
            key_type,
            curve,
            hash: Some(hash),
            bytes,
        })
    }

    /// Decodes a signature for a key of type `key_type`.
    pub fn parse(input: &[u8], key_type: KeyType, format: SignatureFormat) -> Result<Self> {
        match format {
            SignatureFormat::Asn1 => Self::parse_native(input, key_type),
            SignatureFormat::Ssh => Self::parse_ssh(input, key_type).map_err(malformed),
        }
    }

    fn parse_native(input: &[u8], key_type: KeyType) -> Result<Self> {
        match key_type {
            KeyType::Rsa => {
                if input.is_empty() {
                    malformed!("empty RSA signature");
                }
            }
            KeyType::Dsa | KeyType::Ecdsa => {
                decode_der_rs(input)?;
            }
            KeyType::Ed25519 => {
                if input.len() != 64 {
                    malformed!("ed25519 signature of {} bytes", input.len());
                }
            }
        }

        Ok(Self {
            key_type,
            curve: None,
            hash: None,
            bytes: input.to_vec(),
        })
    }

    fn parse_ssh(input: &[u8], key_type: KeyType) -> Result<Self> {
        let mut i = Bytes::copy_from_slice(input);
        let name = i.read_utf8()?;
        let blob = i.read_string()?;
        i.finish("ssh signature")?;

        let (actual, curve, hash) = match name.as_str() {
            "ssh-rsa" => (KeyType::Rsa, None, Some(HashAlgorithm::Sha1)),
            "rsa-sha2-256" => (KeyType::Rsa, None, Some(HashAlgorithm::Sha256)),
            "rsa-sha2-512" => (KeyType::Rsa, None, Some(HashAlgorithm::Sha512)),
            "ssh-dss" => (KeyType::Dsa, None, Some(HashAlgorithm::Sha1)),
            "ssh-ed25519" => (KeyType::Ed25519, None, Some(HashAlgorithm::Sha512)),
            other => match EcdsaCurve::from_ssh_key_type(other) {
                Some(curve) => (KeyType::Ecdsa, Some(curve), Some(curve.ssh_hash())),
                None => malformed!("unknown signature type {:?}", other),
            },
        };
        if actual != key_type {
            malformed!("{} signature for a {} key", actual, key_type);
        }

        let bytes = match key_type {
            KeyType::Rsa => blob.to_vec(),
            KeyType::Dsa => {
                if blob.len() != 2 * DSS_COMPONENT_LEN {
                    malformed!("ssh-dss signature of {} bytes", blob.len());
                }
                let (r, s) = blob.split_at(DSS_COMPONENT_LEN);
                encode_der_rs(&Mpi::from_slice(r), &Mpi::from_slice(s))?
            }
            KeyType::Ecdsa => {
                let mut blob = blob;
                let r = blob.read_mpint()?;
                let s = blob.read_mpint()?;
                blob.finish("ecdsa signature")?;
                encode_der_rs(&r, &s)?
            }
            KeyType::Ed25519 => {
                if blob.len() != 64 {
                    malformed!("ed25519 signature of {} bytes", blob.len());
                }
                blob.to_vec()
            }
        };

        Ok(Self {
            key_type,
            curve,
            hash,
            bytes,
        })
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn curve(&self) -> Option<EcdsaCurve> {
        self.curve
    }

    pub fn hash(&self) -> Option<HashAlgorithm> {
        self.hash
    }

    /// The native encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self, format: SignatureFormat) -> Result<Vec<u8>> {
        match format {
            SignatureFormat::Asn1 => Ok(self.bytes.clone()),
            SignatureFormat::Ssh => self.to_ssh(),
        }
    }

    fn ssh_name(&self) -> Result<&'static str> {
        let name = match (self.key_type, self.hash) {
            (KeyType::Rsa, Some(HashAlgorithm::Sha1)) => "ssh-rsa",
            (KeyType::Rsa, Some(HashAlgorithm::Sha256)) => "rsa-sha2-256",
            (KeyType::Rsa, Some(HashAlgorithm::Sha512)) => "rsa-sha2-512",
            (KeyType::Rsa, hash) => {
                unsupported_err!("RSA signatures with {:?} have no SSH name", hash)
            }
            (KeyType::Dsa, _) => "ssh-dss",
            (KeyType::Ecdsa, _) => match self.curve {
                Some(curve) => curve.ssh_key_type(),
                None => unsupported_err!("ECDSA signature without a curve has no SSH name"),
            },
            (KeyType::Ed25519, _) => "ssh-ed25519",
        };
        Ok(name)
    }

    fn to_ssh(&self) -> Result<Vec<u8>> {
        let mut blob = Vec::new();
        match self.key_type {
            KeyType::Rsa | KeyType::Ed25519 => blob.extend_from_slice(&self.bytes),
            KeyType::Dsa => {
                let (r, s) = self.r_s()?;
                blob.extend_from_slice(&r.to_padded(DSS_COMPONENT_LEN).map_err(malformed)?);
                blob.extend_from_slice(&s.to_padded(DSS_COMPONENT_LEN).map_err(malformed)?);
            }
            KeyType::Ecdsa => {
                let (r, s) = self.r_s()?;
                blob.write_mpint(&r)?;
                blob.write_mpint(&s)?;
            }
        }

        let mut out = Vec::new();
        out.write_string(self.ssh_name()?.as_bytes())?;
        out.write_string(&blob)?;
        Ok(out)
    }

    /// `r` and `s` of a DSA or ECDSA signature.
    pub fn r_s(&self) -> Result<(Mpi, Mpi)> {
        match self.key_type {
            KeyType::Dsa | KeyType::Ecdsa => decode_der_rs(&self.bytes),
            other => malformed!("{} signatures have no (r, s) pair", other),
        }
    }

    pub(crate) fn ed25519_bytes(&self) -> Result<[u8; 64]> {
        match self.bytes.as_slice().try_into() {
            Ok(bytes) => Ok(bytes),
            Err(_) => malformed!("ed25519 signature of {} bytes", self.bytes.len()),
        }
    }
}

fn encode_der_rs(r: &Mpi, s: &Mpi) -> Result<Vec<u8>> {
    let mut w = DerWriter::new();
    w.sequence(|w| {
        w.integer(r);
        w.integer(s);
        Ok(())
    })?;
    Ok(w.into_bytes())
}

fn decode_der_rs(input: &[u8]) -> Result<(Mpi, Mpi)> {
    let inner = || -> Result<(Mpi, Mpi)> {
        let mut outer = DerReader::new(input);
        let mut seq = outer.read_sequence("signature")?;
        outer.finish("signature")?;
        let r = seq.read_integer("r")?;
        let s = seq.read_integer("s")?;
        seq.finish("signature")?;
        Ok((r, s))
    };
    inner().map_err(malformed)
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(&self.bytes))
    }
}
