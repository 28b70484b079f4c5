use std::io;

use bytes::Bytes;

use crate::errors::Result;
use crate::types::Mpi;
use crate::wire::{mpint_wire_len, string_len, WireEncode, WireRead, WireWrite};

pub(crate) const SSH_DSS: &str = "ssh-dss";

/// Raw DSA public key material
#[derive(Debug, PartialEq, Clone)]
pub struct DsaPublicParams {
    pub key: dsa::VerifyingKey,
}

// Missing currently, see https://github.com/RustCrypto/signatures/issues/881.
impl Eq for DsaPublicParams {}

impl DsaPublicParams {
    pub fn try_from_mpi(p: &Mpi, q: &Mpi, g: &Mpi, y: &Mpi) -> Result<Self> {
        let key = crate::crypto::dsa::public_key_from_mpi(p, q, g, y)?;
        Ok(DsaPublicParams { key })
    }

    /// Reads `mpint p, q, g, y`, the body of an `ssh-dss` blob.
    pub fn try_from_wire(i: &mut Bytes) -> Result<Self> {
        let p = i.read_mpint()?;
        let q = i.read_mpint()?;
        let g = i.read_mpint()?;
        let y = i.read_mpint()?;
        Self::try_from_mpi(&p, &q, &g, &y)
    }

    pub fn p(&self) -> Mpi {
        self.key.components().p().into()
    }

    pub fn q(&self) -> Mpi {
        self.key.components().q().into()
    }

    pub fn g(&self) -> Mpi {
        self.key.components().g().into()
    }

    pub fn y(&self) -> Mpi {
        self.key.y().into()
    }

    fn mpis(&self) -> [Mpi; 4] {
        [self.p(), self.q(), self.g(), self.y()]
    }
}

impl WireEncode for DsaPublicParams {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_string(SSH_DSS.as_bytes())?;
        for mpi in self.mpis() {
            writer.write_mpint(&mpi)?;
        }
        Ok(())
    }

    fn wire_len(&self) -> usize {
        let mut sum = string_len(SSH_DSS.len());
        for mpi in self.mpis() {
            sum += mpint_wire_len(&mpi);
        }
        sum
    }
}
