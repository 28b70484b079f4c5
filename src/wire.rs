//! SSH wire encoding, as described in RFC 4251 section 5.
//!
//! Public key blobs (RFC 4253), the `openssh-key-v1` container and SSH
//! signature blobs are all sequences of `uint32`, `string` and `mpint`
//! values. Reading is done through [`WireRead`] on any [`bytes::Buf`],
//! writing through [`WireWrite`] on any [`std::io::Write`].

use std::io;

use byteorder::{BigEndian, WriteBytesExt};
use bytes::{Buf, Bytes};
use log::trace;

use crate::errors::{bail, ensure, Result};
use crate::types::Mpi;

/// Values that have an SSH wire representation.
pub trait WireEncode {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()>;
    fn wire_len(&self) -> usize;

    fn to_wire_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.wire_len());
        self.to_wire(&mut buf)?;

        Ok(buf)
    }
}

impl<T: WireEncode> WireEncode for &T {
    fn to_wire<W: io::Write>(&self, writer: &mut W) -> Result<()> {
        (*self).to_wire(writer)
    }

    fn wire_len(&self) -> usize {
        (*self).wire_len()
    }
}

pub trait WireRead: Buf + Sized {
    fn read_uint32(&mut self) -> Result<u32> {
        ensure!(
            self.remaining() >= 4,
            "truncated uint32 ({} bytes left)",
            self.remaining()
        );
        Ok(self.get_u32())
    }

    /// Reads a length prefixed `string`.
    fn read_string(&mut self) -> Result<Bytes> {
        let len = self.read_uint32()? as usize;
        ensure!(
            self.remaining() >= len,
            "string of {} bytes exceeds remaining input ({} bytes)",
            len,
            self.remaining()
        );
        trace!("wire: string of {} bytes", len);
        Ok(self.copy_to_bytes(len))
    }

    /// Reads a `string` which must be valid UTF-8.
    fn read_utf8(&mut self) -> Result<String> {
        let raw = self.read_string()?;
        let s = std::str::from_utf8(&raw)?;
        Ok(s.to_string())
    }

    /// Reads a positive `mpint`.
    fn read_mpint(&mut self) -> Result<Mpi> {
        let raw = self.read_string()?;
        if raw.first().is_some_and(|b| b & 0x80 != 0) {
            bail!("negative mpint");
        }
        Mpi::try_from_slice(&raw)
    }

    /// Reads a `string` that must be exactly `N` bytes long.
    fn read_fixed<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let raw = self.read_string()?;
        match <[u8; N]>::try_from(raw.as_ref()) {
            Ok(arr) => Ok(arr),
            Err(_) => bail!("{}: expected {} bytes, found {}", what, N, raw.len()),
        }
    }

    /// Fails if any input is left.
    fn finish(&self, what: &str) -> Result<()> {
        ensure!(
            !self.has_remaining(),
            "{} trailing bytes after {}",
            self.remaining(),
            what
        );
        Ok(())
    }
}

impl<B: Buf> WireRead for B {}

pub trait WireWrite: io::Write {
    fn write_uint32(&mut self, val: u32) -> Result<()> {
        self.write_u32::<BigEndian>(val)?;
        Ok(())
    }

    fn write_string(&mut self, val: &[u8]) -> Result<()> {
        self.write_uint32(val.len().try_into()?)?;
        self.write_all(val)?;
        Ok(())
    }

    fn write_mpint(&mut self, val: &Mpi) -> Result<()> {
        self.write_uint32(mpint_len(val).try_into()?)?;
        if val.needs_sign_byte() {
            self.write_u8(0)?;
        }
        self.write_all(val.as_bytes())?;
        Ok(())
    }
}

impl<W: io::Write + ?Sized> WireWrite for W {}

fn mpint_len(val: &Mpi) -> usize {
    val.len() + usize::from(val.needs_sign_byte())
}

/// Encoded length of a `string` holding `len` bytes.
pub fn string_len(len: usize) -> usize {
    4 + len
}

/// Encoded length of an `mpint`.
pub fn mpint_wire_len(val: &Mpi) -> usize {
    4 + mpint_len(val)
}
