//! A minimal DER codec for the structures used by PKCS#1, PKCS#8 and SEC1.
//!
//! Only definite lengths and single-octet tags are supported, which covers
//! every structure those standards define for key material.

use const_oid::ObjectIdentifier;
use log::trace;

use crate::errors::{bail, ensure, format_err, Result};
use crate::types::Mpi;

pub const INTEGER: u8 = 0x02;
pub const BIT_STRING: u8 = 0x03;
pub const OCTET_STRING: u8 = 0x04;
pub const NULL: u8 = 0x05;
pub const OBJECT_IDENTIFIER: u8 = 0x06;
pub const SEQUENCE: u8 = 0x30;

/// Tag of an explicit, constructed context specific field `[n]`.
pub const fn context(n: u8) -> u8 {
    0xA0 | n
}

/// Cursor over a DER encoded byte slice.
#[derive(Debug, Clone)]
pub struct DerReader<'a> {
    input: &'a [u8],
}

impl<'a> DerReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn peek_tag(&self) -> Option<u8> {
        self.input.first().copied()
    }

    /// Reads one tag-length-value triple.
    pub fn read_tlv(&mut self) -> Result<(u8, &'a [u8])> {
        let Some((&tag, rest)) = self.input.split_first() else {
            bail!("unexpected end of DER input");
        };
        ensure!(tag & 0x1f != 0x1f, "multi-octet DER tags are not supported");

        let Some((&first, mut rest)) = rest.split_first() else {
            bail!("missing DER length");
        };
        let len = if first & 0x80 == 0 {
            usize::from(first)
        } else {
            let count = usize::from(first & 0x7f);
            ensure!(count != 0, "indefinite DER length");
            ensure!(count <= 4, "DER length of {} octets", count);
            ensure!(rest.len() >= count, "truncated DER length");
            let (len_bytes, tail) = rest.split_at(count);
            rest = tail;
            ensure!(len_bytes[0] != 0, "non-minimal DER length");
            let len = len_bytes
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
            ensure!(len >= 0x80, "non-minimal DER length");
            len
        };

        ensure!(
            rest.len() >= len,
            "DER value of {} bytes exceeds remaining input ({} bytes)",
            len,
            rest.len()
        );
        let (value, tail) = rest.split_at(len);
        self.input = tail;
        trace!("der: tag {:#04x}, {} bytes", tag, len);

        Ok((tag, value))
    }

    /// Reads a value that must carry `expected` as its tag.
    pub fn read_expected(&mut self, expected: u8, what: &str) -> Result<&'a [u8]> {
        let (tag, value) = self.read_tlv()?;
        ensure!(
            tag == expected,
            "{}: expected DER tag {:#04x}, found {:#04x}",
            what,
            expected,
            tag
        );
        Ok(value)
    }

    pub fn read_sequence(&mut self, what: &str) -> Result<DerReader<'a>> {
        self.read_expected(SEQUENCE, what).map(DerReader::new)
    }

    /// Reads a non negative INTEGER.
    pub fn read_integer(&mut self, what: &str) -> Result<Mpi> {
        let value = self.read_expected(INTEGER, what)?;
        ensure!(!value.is_empty(), "{}: empty INTEGER", what);
        ensure!(value[0] & 0x80 == 0, "{}: negative INTEGER", what);
        Mpi::try_from_slice(value)
    }

    /// Reads an INTEGER that is used as a version or small counter.
    pub fn read_small_integer(&mut self, what: &str) -> Result<u32> {
        let value = self.read_integer(what)?;
        ensure!(value.len() <= 4, "{}: INTEGER out of range", what);
        Ok(value
            .as_bytes()
            .iter()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
    }

    pub fn read_oid(&mut self, what: &str) -> Result<ObjectIdentifier> {
        let value = self.read_expected(OBJECT_IDENTIFIER, what)?;
        ObjectIdentifier::from_bytes(value)
            .map_err(|err| format_err!("{}: invalid OBJECT IDENTIFIER: {}", what, err))
    }

    pub fn read_octet_string(&mut self, what: &str) -> Result<&'a [u8]> {
        self.read_expected(OCTET_STRING, what)
    }

    /// Reads a BIT STRING, which must not have unused bits.
    pub fn read_bit_string(&mut self, what: &str) -> Result<&'a [u8]> {
        let value = self.read_expected(BIT_STRING, what)?;
        let Some((&unused, bits)) = value.split_first() else {
            bail!("{}: empty BIT STRING", what);
        };
        ensure!(unused == 0, "{}: BIT STRING with {} unused bits", what, unused);
        Ok(bits)
    }

    pub fn read_null(&mut self, what: &str) -> Result<()> {
        let value = self.read_expected(NULL, what)?;
        ensure!(value.is_empty(), "{}: NULL with content", what);
        Ok(())
    }

    /// Reads the optional explicit context field `[n]`, if it is next.
    pub fn read_optional_context(&mut self, n: u8, what: &str) -> Result<Option<DerReader<'a>>> {
        if self.peek_tag() != Some(context(n)) {
            return Ok(None);
        }
        self.read_expected(context(n), what)
            .map(|value| Some(DerReader::new(value)))
    }

    pub fn finish(&self, what: &str) -> Result<()> {
        ensure!(
            self.input.is_empty(),
            "{} trailing bytes after {}",
            self.input.len(),
            what
        );
        Ok(())
    }
}

/// Builds DER output front to back.
#[derive(Debug, Default)]
pub struct DerWriter {
    buf: Vec<u8>,
}

impl DerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_tlv(&mut self, tag: u8, value: &[u8]) {
        write_header(&mut self.buf, tag, value.len());
        self.buf.extend_from_slice(value);
    }

    /// Writes a non negative INTEGER, adding a sign octet where needed.
    pub fn integer(&mut self, value: &Mpi) {
        if value.is_empty() {
            self.write_tlv(INTEGER, &[0]);
        } else if value.needs_sign_byte() {
            write_header(&mut self.buf, INTEGER, value.len() + 1);
            self.buf.push(0);
            self.buf.extend_from_slice(value.as_bytes());
        } else {
            self.write_tlv(INTEGER, value.as_bytes());
        }
    }

    pub fn small_integer(&mut self, value: u32) {
        self.integer(&Mpi::from_slice(&value.to_be_bytes()));
    }

    pub fn oid(&mut self, oid: &ObjectIdentifier) {
        self.write_tlv(OBJECT_IDENTIFIER, oid.as_bytes());
    }

    pub fn octet_string(&mut self, value: &[u8]) {
        self.write_tlv(OCTET_STRING, value);
    }

    pub fn bit_string(&mut self, value: &[u8]) {
        write_header(&mut self.buf, BIT_STRING, value.len() + 1);
        self.buf.push(0);
        self.buf.extend_from_slice(value);
    }

    pub fn null(&mut self) {
        self.write_tlv(NULL, &[]);
    }

    /// Writes a SEQUENCE whose content is produced by `f`.
    pub fn sequence<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut DerWriter) -> Result<()>,
    {
        self.constructed(SEQUENCE, f)
    }

    /// Writes the explicit context field `[n]` whose content is produced by `f`.
    pub fn context<F>(&mut self, n: u8, f: F) -> Result<()>
    where
        F: FnOnce(&mut DerWriter) -> Result<()>,
    {
        self.constructed(context(n), f)
    }

    fn constructed<F>(&mut self, tag: u8, f: F) -> Result<()>
    where
        F: FnOnce(&mut DerWriter) -> Result<()>,
    {
        let mut inner = DerWriter::new();
        f(&mut inner)?;
        self.write_tlv(tag, &inner.buf);
        Ok(())
    }
}

fn write_header(buf: &mut Vec<u8>, tag: u8, len: usize) {
    buf.push(tag);
    if len < 0x80 {
        buf.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        buf.push(0x80 | (bytes.len() - skip) as u8);
        buf.extend_from_slice(&bytes[skip..]);
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_integer_sign_octet() {
        let mut w = DerWriter::new();
        w.integer(&Mpi::from_slice(&[0x80]));
        w.integer(&Mpi::from_slice(&[0x7f]));
        w.integer(&Mpi::from_slice(&[]));
        assert_eq!(w.into_bytes(), hex!("020200800201 7f020100"));
    }

    #[test]
    fn test_long_length() {
        let value = vec![0xAAu8; 300];
        let mut w = DerWriter::new();
        w.octet_string(&value);
        let out = w.into_bytes();
        assert_eq!(&out[..4], &hex!("0482012c"));

        let mut r = DerReader::new(&out);
        assert_eq!(r.read_octet_string("value").unwrap(), &value[..]);
        r.finish("value").unwrap();
    }

    #[test]
    fn test_rejects_non_minimal_length() {
        let mut r = DerReader::new(&hex!("04810100"));
        assert!(r.read_octet_string("value").is_err());

        let mut r = DerReader::new(&hex!("0480"));
        assert!(r.read_octet_string("value").is_err());
    }

    #[test]
    fn test_rejects_negative_integer() {
        let mut r = DerReader::new(&hex!("0201ff"));
        assert!(r.read_integer("n").unwrap_err().is_format());
    }

    #[test]
    fn test_nested_structure() {
        let oid = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
        let mut w = DerWriter::new();
        w.sequence(|w| {
            w.small_integer(1);
            w.octet_string(&[1, 2, 3]);
            w.context(0, |w| {
                w.oid(&oid);
                Ok(())
            })?;
            w.context(1, |w| {
                w.bit_string(&[4, 5]);
                Ok(())
            })
        })
        .unwrap();
        let out = w.into_bytes();

        let mut outer = DerReader::new(&out);
        let mut seq = outer.read_sequence("ec key").unwrap();
        outer.finish("ec key").unwrap();
        assert_eq!(seq.read_small_integer("version").unwrap(), 1);
        assert_eq!(seq.read_octet_string("d").unwrap(), &[1, 2, 3]);
        let mut params = seq.read_optional_context(0, "params").unwrap().unwrap();
        assert_eq!(params.read_oid("curve").unwrap(), oid);
        assert!(seq.read_optional_context(2, "missing").unwrap().is_none());
        let mut public = seq.read_optional_context(1, "public").unwrap().unwrap();
        assert_eq!(public.read_bit_string("q").unwrap(), &[4, 5]);
        seq.finish("ec key").unwrap();
    }

    proptest! {
        #[test]
        fn integer_roundtrip(value: Vec<u8>) {
            let mpi = Mpi::from_slice(&value);
            let mut w = DerWriter::new();
            w.integer(&mpi);
            let out = w.into_bytes();
            let mut r = DerReader::new(&out);
            prop_assert_eq!(r.read_integer("n")?, mpi);
        }
    }
}
