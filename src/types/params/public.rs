use std::io;

use bytes::Bytes;
use log::debug;

use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::public_key::KeyType;
use crate::errors::{unsupported_err, Result};
use crate::wire::{WireEncode, WireRead};

mod dsa;
mod ecdsa;
mod ed25519;
mod rsa;

pub use self::{
    dsa::DsaPublicParams, ecdsa::EcdsaPublicParams, ed25519::Ed25519PublicParams,
    rsa::RsaPublicParams,
};
use super::SecretParams;

/// Represent the public parameters for the different algorithms.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum PublicParams {
    Rsa(RsaPublicParams),
    Dsa(DsaPublicParams),
    Ecdsa(EcdsaPublicParams),
    Ed25519(Ed25519PublicParams),
}

impl From<&SecretParams> for PublicParams {
    fn from(secret: &SecretParams) -> Self {
        match secret {
            SecretParams::Rsa(key) => Self::Rsa(key.public_key().into()),
            SecretParams::Dsa(key) => Self::Dsa(DsaPublicParams {
                key: key.verifying_key().clone(),
            }),
            SecretParams::Ecdsa(key) => Self::Ecdsa(EcdsaPublicParams::from(key)),
            SecretParams::Ed25519(key) => Self::Ed25519(Ed25519PublicParams {
                key: key.public_key(),
            }),
        }
    }
}

impl PublicParams {
    /// Parses a complete RFC 4253 public key blob.
    pub fn try_from_wire(mut i: Bytes) -> Result<Self> {
        let name = i.read_utf8()?;
        debug!("public key blob of type {}", name);

        let params = match name.as_str() {
            rsa::SSH_RSA => Self::Rsa(RsaPublicParams::try_from_wire(&mut i)?),
            dsa::SSH_DSS => Self::Dsa(DsaPublicParams::try_from_wire(&mut i)?),
            ed25519::SSH_ED25519 => Self::Ed25519(Ed25519PublicParams::try_from_wire(&mut i)?),
            other => match EcdsaCurve::from_ssh_key_type(other) {
                Some(curve) => Self::Ecdsa(EcdsaPublicParams::try_from_wire(curve, &mut i)?),
                None => unsupported_err!("key type {:?}", other),
            },
        };
        i.finish("public key blob")?;

        Ok(params)
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Rsa(_) => KeyType::Rsa,
            Self::Dsa(_) => KeyType::Dsa,
            Self::Ecdsa(_) => KeyType::Ecdsa,
            Self::Ed25519(_) => KeyType::Ed25519,
        }
    }

    /// The SSH key type name, e.g. `ssh-ed25519`.
    pub fn ssh_key_type(&self) -> &'static str {
        match self {
            Self::Rsa(_) => rsa::SSH_RSA,
            Self::Dsa(_) => dsa::SSH_DSS,
            Self::Ecdsa(params) => params.curve.ssh_key_type(),
            Self::Ed25519(_) => ed25519::SSH_ED25519,
        }
    }

    /// Key size in bits.
    pub fn size(&self) -> usize {
        match self {
            Self::Rsa(params) => params.bits(),
            Self::Dsa(params) => params.p().bits(),
            Self::Ecdsa(params) => params.curve.nbits(),
            Self::Ed25519(_) => 256,
        }
    }

    pub fn curve(&self) -> Option<EcdsaCurve> {
        match self {
            Self::Ecdsa(params) => Some(params.curve),
            _ => None,
        }
    }
}

impl WireEncode for PublicParams {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Self::Rsa(params) => params.to_wire(writer),
            Self::Dsa(params) => params.to_wire(writer),
            Self::Ecdsa(params) => params.to_wire(writer),
            Self::Ed25519(params) => params.to_wire(writer),
        }
    }

    fn wire_len(&self) -> usize {
        match self {
            Self::Rsa(params) => params.wire_len(),
            Self::Dsa(params) => params.wire_len(),
            Self::Ecdsa(params) => params.wire_len(),
            Self::Ed25519(params) => params.wire_len(),
        }
    }
}

impl From<&crate::crypto::ecdsa::SecretKey> for EcdsaPublicParams {
    fn from(key: &crate::crypto::ecdsa::SecretKey) -> Self {
        // the provider always yields a valid uncompressed point
        Self::from_valid_point(key.curve(), key.public_point())
    }
}
