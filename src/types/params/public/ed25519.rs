use std::io;

use bytes::Bytes;

use crate::errors::Result;
use crate::wire::{string_len, WireEncode, WireRead, WireWrite};

pub(crate) const SSH_ED25519: &str = "ssh-ed25519";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Ed25519PublicParams {
    pub key: ed25519_dalek::VerifyingKey,
}

impl Ed25519PublicParams {
    pub fn try_from_slice(raw: &[u8]) -> Result<Self> {
        let raw: [u8; 32] = match raw.try_into() {
            Ok(raw) => raw,
            Err(_) => crate::bail!("ed25519 public key of {} bytes", raw.len()),
        };
        let key = ed25519_dalek::VerifyingKey::from_bytes(&raw)?;
        Ok(Self { key })
    }

    /// Reads `string pub`, the body of an `ssh-ed25519` blob.
    pub fn try_from_wire(i: &mut Bytes) -> Result<Self> {
        let raw: [u8; 32] = i.read_fixed("ed25519 public key")?;
        Self::try_from_slice(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.key.as_bytes()
    }
}

impl WireEncode for Ed25519PublicParams {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_string(SSH_ED25519.as_bytes())?;
        writer.write_string(self.key.as_bytes())?;
        Ok(())
    }

    fn wire_len(&self) -> usize {
        string_len(SSH_ED25519.len()) + string_len(32)
    }
}
