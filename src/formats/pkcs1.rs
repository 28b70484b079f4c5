//! PKCS#1 (RFC 8017) RSA keys and the OpenSSL DSA private key layout.

use log::debug;

use crate::crypto::{dsa, rsa};
use crate::der::{DerReader, DerWriter};
use crate::errors::{corrupt_err, ensure_eq, unsupported_err, Result};
use crate::types::{DsaPublicParams, PublicParams, RsaPublicParams, SecretParams};

/// `RSAPrivateKey ::= SEQUENCE { version, n, e, d, p, q, dP, dQ, qInv }`
pub fn decode_rsa_private(der: &[u8]) -> Result<SecretParams> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.read_sequence("RSAPrivateKey")?;
    outer.finish("RSAPrivateKey")?;
    let key = read_rsa_private(&mut seq)?;
    seq.finish("RSAPrivateKey")?;

    Ok(SecretParams::Rsa(key))
}

/// Reads the fields of an `RSAPrivateKey`, leaving the reader after `qInv`.
pub(crate) fn read_rsa_private(seq: &mut DerReader<'_>) -> Result<rsa::SecretKey> {
    match seq.read_small_integer("RSAPrivateKey version")? {
        0 => {}
        1 => unsupported_err!("multi-prime RSA keys"),
        v => unsupported_err!("RSAPrivateKey version {}", v),
    }

    let n = seq.read_integer("n")?;
    let e = seq.read_integer("e")?;
    let d = seq.read_integer("d")?;
    let p = seq.read_integer("p")?;
    let q = seq.read_integer("q")?;
    let _dp = seq.read_integer("dP")?;
    let _dq = seq.read_integer("dQ")?;
    let qinv = seq.read_integer("qInv")?;
    debug!("PKCS#1 RSA key, {} bit modulus", n.bits());

    let key = rsa::SecretKey::try_from_components(&n, &e, &d, &p, &q)?;
    if key.iqmp()? != qinv {
        corrupt_err!("RSA coefficient does not match the primes");
    }

    Ok(key)
}

pub fn encode_rsa_private(key: &rsa::SecretKey) -> Result<Vec<u8>> {
    let mut w = DerWriter::new();
    write_rsa_private(&mut w, key)?;
    Ok(w.into_bytes())
}

pub(crate) fn write_rsa_private(w: &mut DerWriter, key: &rsa::SecretKey) -> Result<()> {
    let public = RsaPublicParams::from(key.public_key());
    let iqmp = key.iqmp()?;
    w.sequence(|w| {
        w.small_integer(0);
        w.integer(&public.n());
        w.integer(&public.e());
        w.integer(&key.d());
        w.integer(&key.p());
        w.integer(&key.q());
        w.integer(&key.dp());
        w.integer(&key.dq());
        w.integer(&iqmp);
        Ok(())
    })
}

/// `RSAPublicKey ::= SEQUENCE { n, e }`
pub fn decode_rsa_public(der: &[u8]) -> Result<PublicParams> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.read_sequence("RSAPublicKey")?;
    outer.finish("RSAPublicKey")?;
    let n = seq.read_integer("n")?;
    let e = seq.read_integer("e")?;
    seq.finish("RSAPublicKey")?;

    Ok(PublicParams::Rsa(RsaPublicParams::try_from_mpi(&n, &e)?))
}

pub fn encode_rsa_public(params: &RsaPublicParams) -> Result<Vec<u8>> {
    let mut w = DerWriter::new();
    w.sequence(|w| {
        w.integer(&params.n());
        w.integer(&params.e());
        Ok(())
    })?;
    Ok(w.into_bytes())
}

/// OpenSSL's `DSAPrivateKey ::= SEQUENCE { 0, p, q, g, y, x }`
pub fn decode_dsa_private(der: &[u8]) -> Result<SecretParams> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.read_sequence("DSAPrivateKey")?;
    outer.finish("DSAPrivateKey")?;

    let version = seq.read_small_integer("DSAPrivateKey version")?;
    ensure_eq!(version, 0, "DSAPrivateKey version");
    let p = seq.read_integer("p")?;
    let q = seq.read_integer("q")?;
    let g = seq.read_integer("g")?;
    let y = seq.read_integer("y")?;
    let x = seq.read_integer("x")?;
    seq.finish("DSAPrivateKey")?;
    debug!("OpenSSL DSA key, {} bit p", p.bits());

    let public = dsa::public_key_from_mpi(&p, &q, &g, &y)?;
    let key = dsa::SecretKey::try_from_mpi(&public, &x)?;
    Ok(SecretParams::Dsa(key))
}

pub fn encode_dsa_private(key: &dsa::SecretKey) -> Result<Vec<u8>> {
    let public = DsaPublicParams {
        key: key.verifying_key().clone(),
    };
    let mut w = DerWriter::new();
    w.sequence(|w| {
        w.small_integer(0);
        w.integer(&public.p());
        w.integer(&public.q());
        w.integer(&public.g());
        w.integer(&public.y());
        w.integer(&key.x());
        Ok(())
    })?;

    Ok(w.into_bytes())
}
