//! SEC1 (RFC 5915) elliptic curve private keys.

use const_oid::ObjectIdentifier;
use log::debug;
use num_bigint::BigUint;

use crate::crypto::ecc_curve::{ecc_curve_from_domain, ecc_curve_from_oid, EcdsaCurve};
use crate::crypto::ecdsa::{normalize_point, SecretKey};
use crate::der::{self, DerReader, DerWriter};
use crate::errors::{bail, corrupt_err, ensure, ensure_eq, unsupported_err, Result};
use crate::types::SecretParams;

/// `prime-field` from ANSI X9.62.
const PRIME_FIELD: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.1.1");

/// Decodes an `ECPrivateKey`.
///
/// `outer_curve` is the curve named by an enclosing PKCS#8 structure. At
/// least one of it and the inner `parameters` field must be present, and
/// they must agree.
pub fn decode(der: &[u8], outer_curve: Option<EcdsaCurve>) -> Result<SecretParams> {
    let mut outer = DerReader::new(der);
    let mut seq = outer.read_sequence("ECPrivateKey")?;
    outer.finish("ECPrivateKey")?;

    let version = seq.read_small_integer("ECPrivateKey version")?;
    ensure_eq!(version, 1, "ECPrivateKey version");
    let d = seq.read_octet_string("privateKey")?;

    let inner_curve = match seq.read_optional_context(0, "parameters")? {
        Some(mut params) => {
            let curve = read_ec_parameters(&mut params)?;
            params.finish("parameters")?;
            Some(curve)
        }
        None => None,
    };
    let curve = match (outer_curve, inner_curve) {
        (Some(outer), Some(inner)) => {
            ensure!(
                outer == inner,
                "ECPrivateKey on {} wrapped as a {} key",
                inner,
                outer
            );
            inner
        }
        (Some(curve), None) | (None, Some(curve)) => curve,
        (None, None) => bail!("ECPrivateKey without curve parameters"),
    };
    debug!("SEC1 key on {}", curve);

    let key = SecretKey::try_from_bytes(curve, d)?;

    if let Some(mut public) = seq.read_optional_context(1, "publicKey")? {
        let point = public.read_bit_string("publicKey")?;
        public.finish("publicKey")?;
        if normalize_point(curve, point)? != key.public_point() {
            corrupt_err!("SEC1 public key does not match the private scalar");
        }
    }
    seq.finish("ECPrivateKey")?;

    Ok(SecretParams::Ecdsa(key))
}

/// Reads `ECParameters`, a named curve OID or a `SpecifiedECDomain`.
pub(crate) fn read_ec_parameters(r: &mut DerReader<'_>) -> Result<EcdsaCurve> {
    match r.peek_tag() {
        Some(der::OBJECT_IDENTIFIER) => {
            let oid = r.read_oid("namedCurve")?;
            match ecc_curve_from_oid(&oid) {
                Some(curve) => Ok(curve),
                None => unsupported_err!("curve {}", oid),
            }
        }
        Some(der::SEQUENCE) => {
            let mut domain = r.read_sequence("SpecifiedECDomain")?;
            read_specified_domain(&mut domain)
        }
        Some(der::NULL) => unsupported_err!("implicitly defined curves"),
        Some(tag) => bail!("unexpected ECParameters tag {:#04x}", tag),
        None => bail!("missing ECParameters"),
    }
}

/// Resolves explicit curve parameters to one of the named curves.
fn read_specified_domain(domain: &mut DerReader<'_>) -> Result<EcdsaCurve> {
    let version = domain.read_small_integer("SpecifiedECDomain version")?;
    ensure!(
        (1..=3).contains(&version),
        "SpecifiedECDomain version {}",
        version
    );

    let mut field = domain.read_sequence("fieldID")?;
    let field_type = field.read_oid("fieldType")?;
    if field_type != PRIME_FIELD {
        unsupported_err!("curves over field type {}", field_type);
    }
    let prime = field.read_integer("prime")?;
    field.finish("fieldID")?;

    // the optional seed is ignored
    let mut coefficients = domain.read_sequence("curve")?;
    let a = coefficients.read_octet_string("a")?;
    let b = coefficients.read_octet_string("b")?;
    let base = domain.read_octet_string("base")?;
    let order = domain.read_integer("order")?;
    // cofactor and hash are optional and implied by the curve

    let Some(curve) = ecc_curve_from_domain(prime.as_bytes(), order.as_bytes()) else {
        unsupported_err!("explicit curve with a {} bit prime", prime.bits());
    };
    check_domain(curve, &prime.to_biguint(), a, b, base)?;
    debug!("explicit parameters resolved to {}", curve);

    Ok(curve)
}

/// Checks the coefficients and generator of an explicit domain against
/// the named curve sharing its prime and order.
fn check_domain(curve: EcdsaCurve, p: &BigUint, a: &[u8], b: &[u8], base: &[u8]) -> Result<()> {
    let generator = SecretKey::try_from_bytes(curve, &[1])?.public_point();
    let size = curve.field_size();
    let x = BigUint::from_bytes_be(&generator[1..1 + size]);
    let y = BigUint::from_bytes_be(&generator[1 + size..]);

    // all supported curves have a = -3, so b = y^2 - x^3 + 3x
    let three = BigUint::from(3u32);
    let expected_a = p - &three;
    let x3 = x.modpow(&three, p);
    let expected_b = ((&y * &y + &three * &x) % p + p - x3) % p;

    if BigUint::from_bytes_be(a) != expected_a || BigUint::from_bytes_be(b) != expected_b {
        corrupt_err!("explicit {} parameters with wrong coefficients", curve);
    }
    match normalize_point(curve, base) {
        Ok(point) if point == generator => Ok(()),
        _ => corrupt_err!("explicit {} parameters with wrong generator", curve),
    }
}

/// Encodes `key` as an `ECPrivateKey`, with the named curve OID when
/// `with_parameters` is set.
pub fn encode(key: &SecretKey, with_parameters: bool) -> Result<Vec<u8>> {
    let curve = key.curve();
    let d = key.to_bytes();
    let point = key.public_point();

    let mut w = DerWriter::new();
    w.sequence(|w| {
        w.small_integer(1);
        w.octet_string(&d);
        if with_parameters {
            w.context(0, |w| {
                w.oid(&curve.oid());
                Ok(())
            })?;
        }
        w.context(1, |w| {
            w.bit_string(&point);
            Ok(())
        })
    })?;

    Ok(w.into_bytes())
}
