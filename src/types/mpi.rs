use num_bigint::BigUint;
use zeroize::Zeroize;

use crate::errors::{ensure, Result};

/// Number of bits we accept when reading integers from any encoding.
/// The value is the same as OpenSSH's `SSHBUF_MAX_BIGNUM` in bits.
pub const MAX_MPI_BITS: usize = 16384;

/// An unsigned big integer, stored big-endian without leading zero octets.
///
/// This is the common currency between the DER and SSH wire codecs: the
/// sign byte those encodings require is added on write and stripped on read.
#[derive(Default, Clone, PartialEq, Eq, Hash, Zeroize, derive_more::Debug)]
pub struct Mpi(#[debug("{}", hex::encode(_0))] Vec<u8>);

impl Mpi {
    /// Represent the data in `raw` as an Mpi.
    ///
    /// Strips leading zeros.
    pub fn from_slice(raw: &[u8]) -> Self {
        Self(strip_leading_zeros(raw).to_vec())
    }

    /// Like [`Mpi::from_slice`], but rejects values larger than [`MAX_MPI_BITS`].
    pub fn try_from_slice(raw: &[u8]) -> Result<Self> {
        let mpi = Self::from_slice(raw);
        ensure!(
            mpi.bits() <= MAX_MPI_BITS,
            "integer too large ({} bits)",
            mpi.bits()
        );
        Ok(mpi)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bit length of the value.
    pub fn bits(&self) -> usize {
        bit_size(&self.0)
    }

    /// True when the first octet has its high bit set, i.e. a two's complement
    /// encoding needs an extra leading zero to stay positive.
    pub fn needs_sign_byte(&self) -> bool {
        self.0.first().is_some_and(|b| b & 0x80 != 0)
    }

    /// Left pads the value with zeros to exactly `len` bytes.
    pub fn to_padded(&self, len: usize) -> Result<Vec<u8>> {
        ensure!(
            self.0.len() <= len,
            "integer of {} bytes does not fit into {} bytes",
            self.0.len(),
            len
        );
        let mut out = vec![0u8; len];
        out[len - self.0.len()..].copy_from_slice(&self.0);
        Ok(out)
    }

    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

/// Returns the bit length of a given slice.
#[inline]
fn bit_size(val: &[u8]) -> usize {
    if val.is_empty() {
        0
    } else {
        (val.len() * 8) - val[0].leading_zeros() as usize
    }
}

#[inline]
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    bytes
        .iter()
        .position(|b| b != &0)
        .map_or(&[], |offset| &bytes[offset..])
}

impl AsRef<[u8]> for Mpi {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<BigUint> for Mpi {
    fn from(other: BigUint) -> Self {
        Mpi::from(&other)
    }
}

impl From<&BigUint> for Mpi {
    fn from(other: &BigUint) -> Self {
        // `to_bytes_be` renders zero as a single zero octet
        Mpi::from_slice(&other.to_bytes_be())
    }
}

impl From<&Mpi> for BigUint {
    fn from(other: &Mpi) -> Self {
        other.to_biguint()
    }
}

impl From<Mpi> for BigUint {
    fn from(other: Mpi) -> Self {
        other.to_biguint()
    }
}
