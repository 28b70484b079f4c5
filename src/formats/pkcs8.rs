//! PKCS#8 (RFC 5208, RFC 5958) private keys and X.509 SubjectPublicKeyInfo.

use const_oid::ObjectIdentifier;
use log::{debug, warn};

use crate::crypto::ecdsa::normalize_point;
use crate::crypto::{dsa, ed25519};
use crate::der::{DerReader, DerWriter};
use crate::errors::{bail, corrupt_err, ensure, unsupported_err, Result};
use crate::formats::{pkcs1, sec1};
use crate::types::{
    DsaPublicParams, EcdsaPublicParams, Ed25519PublicParams, Mpi, PublicParams, SecretParams,
};

const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const ID_DSA: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10040.4.1");
const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const ID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// `[1] IMPLICIT BIT STRING` of RFC 5958.
const PUBLIC_KEY: u8 = 0x81;

/// The parameters of an `AlgorithmIdentifier`, by algorithm.
enum Algorithm<'a> {
    Rsa,
    /// `Dss-Parms` content
    Dsa(DerReader<'a>),
    /// `ECParameters`
    Ec(DerReader<'a>),
    Ed25519,
}

fn read_algorithm<'a>(r: &mut DerReader<'a>) -> Result<Algorithm<'a>> {
    let mut alg = r.read_sequence("AlgorithmIdentifier")?;
    let oid = alg.read_oid("algorithm")?;
    debug!("PKCS#8 algorithm {}", oid);

    let algorithm = if oid == RSA_ENCRYPTION {
        if !alg.is_empty() {
            alg.read_null("rsaEncryption parameters")?;
        }
        Algorithm::Rsa
    } else if oid == ID_DSA {
        Algorithm::Dsa(alg.read_sequence("Dss-Parms")?)
    } else if oid == ID_EC_PUBLIC_KEY {
        let params = alg.clone();
        alg.read_tlv()?;
        Algorithm::Ec(params)
    } else if oid == ID_ED25519 {
        Algorithm::Ed25519
    } else {
        unsupported_err!("key algorithm {}", oid);
    };
    alg.finish("AlgorithmIdentifier")?;

    Ok(algorithm)
}

fn read_dss_parms(params: &mut DerReader<'_>) -> Result<(Mpi, Mpi, Mpi)> {
    let p = params.read_integer("p")?;
    let q = params.read_integer("q")?;
    let g = params.read_integer("g")?;
    params.finish("Dss-Parms")?;
    Ok((p, q, g))
}

/// Decodes a `PrivateKeyInfo` / `OneAsymmetricKey`.
pub fn decode_private(der: &[u8]) -> Result<SecretParams> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.read_sequence("PrivateKeyInfo")?;
    outer.finish("PrivateKeyInfo")?;

    let version = seq.read_small_integer("PrivateKeyInfo version")?;
    ensure!(version <= 1, "PrivateKeyInfo version {}", version);
    let algorithm = read_algorithm(&mut seq)?;
    let private_key = seq.read_octet_string("privateKey")?;

    let mut public_key = None;
    while !seq.is_empty() {
        let (tag, value) = seq.read_tlv()?;
        if tag == PUBLIC_KEY {
            public_key = Some(value);
        } else {
            warn!("ignoring PKCS#8 field with tag {:#04x}", tag);
        }
    }

    let params = match algorithm {
        Algorithm::Rsa => pkcs1::decode_rsa_private(private_key)?,
        Algorithm::Dsa(mut params) => {
            let (p, q, g) = read_dss_parms(&mut params)?;
            let mut inner = DerReader::new(private_key);
            let x = inner.read_integer("x")?;
            inner.finish("DSA private key")?;

            ensure!(p.bits() > 1, "invalid DSA modulus");
            // y = g^x mod p
            let y = Mpi::from(g.to_biguint().modpow(&x.to_biguint(), &p.to_biguint()));
            let public = dsa::public_key_from_mpi(&p, &q, &g, &y)?;
            SecretParams::Dsa(dsa::SecretKey::try_from_mpi(&public, &x)?)
        }
        Algorithm::Ec(mut params) => {
            let curve = sec1::read_ec_parameters(&mut params)?;
            params.finish("ECParameters")?;
            sec1::decode(private_key, Some(curve))?
        }
        Algorithm::Ed25519 => {
            let mut inner = DerReader::new(private_key);
            let seed = inner.read_octet_string("CurvePrivateKey")?;
            inner.finish("CurvePrivateKey")?;
            SecretParams::Ed25519(ed25519::SecretKey::try_from_seed(seed)?)
        }
    };
    if let Some(value) = public_key {
        check_public_key(&params, value)?;
    }

    Ok(params)
}

/// Compares the `[1] publicKey` of a `OneAsymmetricKey` with the key
/// derived from the private half.
fn check_public_key(params: &SecretParams, value: &[u8]) -> Result<()> {
    let Some((&0, bits)) = value.split_first() else {
        bail!("publicKey: malformed BIT STRING");
    };
    let matches = match params {
        SecretParams::Ecdsa(key) => normalize_point(key.curve(), bits)
            .map(|point| point == key.public_point())
            .unwrap_or(false),
        _ => subject_public_key(&PublicParams::from(params))? == bits,
    };
    if !matches {
        corrupt_err!("PKCS#8 public key does not match the private key");
    }
    Ok(())
}

pub fn encode_private(params: &SecretParams) -> Result<Vec<u8>> {
    let mut w = DerWriter::new();
    w.sequence(|w| {
        w.small_integer(0);
        write_algorithm(w, &PublicParams::from(params))?;
        let private_key = match params {
            SecretParams::Rsa(key) => pkcs1::encode_rsa_private(key)?,
            SecretParams::Dsa(key) => {
                let mut inner = DerWriter::new();
                inner.integer(&key.x());
                inner.into_bytes()
            }
            SecretParams::Ecdsa(key) => sec1::encode(key, false)?,
            SecretParams::Ed25519(key) => {
                let mut inner = DerWriter::new();
                inner.octet_string(&key.seed()[..]);
                inner.into_bytes()
            }
        };
        w.octet_string(&private_key);
        Ok(())
    })?;

    Ok(w.into_bytes())
}

fn write_algorithm(w: &mut DerWriter, params: &PublicParams) -> Result<()> {
    w.sequence(|w| {
        match params {
            PublicParams::Rsa(_) => {
                w.oid(&RSA_ENCRYPTION);
                w.null();
            }
            PublicParams::Dsa(params) => {
                w.oid(&ID_DSA);
                w.sequence(|w| {
                    w.integer(&params.p());
                    w.integer(&params.q());
                    w.integer(&params.g());
                    Ok(())
                })?;
            }
            PublicParams::Ecdsa(params) => {
                w.oid(&ID_EC_PUBLIC_KEY);
                w.oid(&params.curve.oid());
            }
            PublicParams::Ed25519(_) => {
                w.oid(&ID_ED25519);
            }
        }
        Ok(())
    })
}

/// Decodes a `SubjectPublicKeyInfo`.
pub fn decode_public(der: &[u8]) -> Result<PublicParams> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.read_sequence("SubjectPublicKeyInfo")?;
    outer.finish("SubjectPublicKeyInfo")?;

    let algorithm = read_algorithm(&mut seq)?;
    let key = seq.read_bit_string("subjectPublicKey")?;
    seq.finish("SubjectPublicKeyInfo")?;

    let params = match algorithm {
        Algorithm::Rsa => pkcs1::decode_rsa_public(key)?,
        Algorithm::Dsa(mut params) => {
            let (p, q, g) = read_dss_parms(&mut params)?;
            let mut inner = DerReader::new(key);
            let y = inner.read_integer("y")?;
            inner.finish("DSA public key")?;
            PublicParams::Dsa(DsaPublicParams::try_from_mpi(&p, &q, &g, &y)?)
        }
        Algorithm::Ec(mut params) => {
            let curve = sec1::read_ec_parameters(&mut params)?;
            params.finish("ECParameters")?;
            PublicParams::Ecdsa(EcdsaPublicParams::try_from_point(curve, key)?)
        }
        Algorithm::Ed25519 => PublicParams::Ed25519(Ed25519PublicParams::try_from_slice(key)?),
    };

    Ok(params)
}

/// The content of the `subjectPublicKey` BIT STRING.
fn subject_public_key(params: &PublicParams) -> Result<Vec<u8>> {
    let key = match params {
        PublicParams::Rsa(params) => pkcs1::encode_rsa_public(params)?,
        PublicParams::Dsa(params) => {
            let mut inner = DerWriter::new();
            inner.integer(&params.y());
            inner.into_bytes()
        }
        PublicParams::Ecdsa(params) => params.point().to_vec(),
        PublicParams::Ed25519(params) => params.as_bytes().to_vec(),
    };
    Ok(key)
}

pub fn encode_public(params: &PublicParams) -> Result<Vec<u8>> {
    let key = subject_public_key(params)?;

    let mut w = DerWriter::new();
    w.sequence(|w| {
        write_algorithm(w, params)?;
        w.bit_string(&key);
        Ok(())
    })?;

    Ok(w.into_bytes())
}
