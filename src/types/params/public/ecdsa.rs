use std::io;

use bytes::Bytes;

use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::ecdsa::normalize_point;
use crate::errors::{ensure_eq, Result};
use crate::wire::{string_len, WireEncode, WireRead, WireWrite};

/// Raw ECDSA public key material
#[derive(derive_more::Debug, PartialEq, Eq, Clone)]
pub struct EcdsaPublicParams {
    pub curve: EcdsaCurve,
    /// Uncompressed SEC1 point.
    #[debug("{}", hex::encode(point))]
    point: Vec<u8>,
}

impl EcdsaPublicParams {
    /// Validates `point` on `curve`. Compressed points are expanded.
    pub fn try_from_point(curve: EcdsaCurve, point: &[u8]) -> Result<Self> {
        let point = normalize_point(curve, point)?;
        Ok(Self { curve, point })
    }

    pub(crate) fn from_valid_point(curve: EcdsaCurve, point: Vec<u8>) -> Self {
        Self { curve, point }
    }

    /// Reads `string curve, string Q`, the body of an `ecdsa-sha2-*` blob.
    pub fn try_from_wire(curve: EcdsaCurve, i: &mut Bytes) -> Result<Self> {
        let name = i.read_utf8()?;
        ensure_eq!(name.as_str(), curve.ssh_name(), "curve name of {} key", curve.ssh_key_type());
        let point = i.read_string()?;
        Self::try_from_point(curve, &point)
    }

    pub fn point(&self) -> &[u8] {
        &self.point
    }
}

impl WireEncode for EcdsaPublicParams {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_string(self.curve.ssh_key_type().as_bytes())?;
        writer.write_string(self.curve.ssh_name().as_bytes())?;
        writer.write_string(&self.point)?;
        Ok(())
    }

    fn wire_len(&self) -> usize {
        string_len(self.curve.ssh_key_type().len())
            + string_len(self.curve.ssh_name().len())
            + string_len(self.point.len())
    }
}
