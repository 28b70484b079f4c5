use std::io;

use bytes::Bytes;
use rsa::traits::PublicKeyParts;

use crate::errors::Result;
use crate::types::Mpi;
use crate::wire::{mpint_wire_len, string_len, WireEncode, WireRead, WireWrite};

pub(crate) const SSH_RSA: &str = "ssh-rsa";

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RsaPublicParams {
    pub key: rsa::RsaPublicKey,
}

impl RsaPublicParams {
    pub fn try_from_mpi(n: &Mpi, e: &Mpi) -> Result<Self> {
        let key = crate::crypto::rsa::public_key_from_mpi(n, e)?;
        Ok(RsaPublicParams { key })
    }

    /// Reads `mpint e, mpint n`, the body of an `ssh-rsa` blob.
    pub fn try_from_wire(i: &mut Bytes) -> Result<Self> {
        let e = i.read_mpint()?;
        let n = i.read_mpint()?;
        Self::try_from_mpi(&n, &e)
    }

    pub fn n(&self) -> Mpi {
        self.key.n().into()
    }

    pub fn e(&self) -> Mpi {
        self.key.e().into()
    }

    /// Modulus length in bits.
    pub fn bits(&self) -> usize {
        self.n().bits()
    }
}

impl From<rsa::RsaPublicKey> for RsaPublicParams {
    fn from(key: rsa::RsaPublicKey) -> Self {
        RsaPublicParams { key }
    }
}

impl WireEncode for RsaPublicParams {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_string(SSH_RSA.as_bytes())?;
        writer.write_mpint(&self.e())?;
        writer.write_mpint(&self.n())?;
        Ok(())
    }

    fn wire_len(&self) -> usize {
        string_len(SSH_RSA.len()) + mpint_wire_len(&self.e()) + mpint_wire_len(&self.n())
    }
}
