use std::str::FromStr;

use const_oid::ObjectIdentifier;
use hex_literal::hex;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::{Error, Result};

/// Named curves usable with ECDSA keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EcdsaCurve {
    #[display("nistp256")]
    NistP256,
    #[display("nistp384")]
    NistP384,
    #[display("nistp521")]
    NistP521,
}

const P256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const P384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const P521_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.35");

const P256_PRIME: [u8; 32] =
    hex!("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
const P256_ORDER: [u8; 32] =
    hex!("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551");
const P384_PRIME: [u8; 48] = hex!(
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe"
    "ffffffff0000000000000000ffffffff"
);
const P384_ORDER: [u8; 48] = hex!(
    "ffffffffffffffffffffffffffffffffffffffffffffffffc7634d81f4372ddf"
    "581a0db248b0a77aecec196accc52973"
);
const P521_PRIME: [u8; 66] = hex!(
    "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "ffff"
);
const P521_ORDER: [u8; 66] = hex!(
    "01ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
    "fffa51868783bf2f966b7fcc0148f709a5d03bb5c9b8899c47aebb6fb71e9138"
    "6409"
);

impl EcdsaCurve {
    pub const ALL: [EcdsaCurve; 3] = [Self::NistP256, Self::NistP384, Self::NistP521];

    /// Curve identifier used inside SSH key blobs.
    pub fn ssh_name(&self) -> &'static str {
        match self {
            Self::NistP256 => "nistp256",
            Self::NistP384 => "nistp384",
            Self::NistP521 => "nistp521",
        }
    }

    /// SSH key type, e.g. `ecdsa-sha2-nistp256`.
    pub fn ssh_key_type(&self) -> &'static str {
        match self {
            Self::NistP256 => "ecdsa-sha2-nistp256",
            Self::NistP384 => "ecdsa-sha2-nistp384",
            Self::NistP521 => "ecdsa-sha2-nistp521",
        }
    }

    pub fn from_ssh_key_type(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.ssh_key_type() == name)
    }

    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::NistP256 => P256_OID,
            Self::NistP384 => P384_OID,
            Self::NistP521 => P521_OID,
        }
    }

    /// Nominal bit length of the curve order.
    pub const fn nbits(&self) -> usize {
        match self {
            Self::NistP256 => 256,
            Self::NistP384 => 384,
            Self::NistP521 => 521,
        }
    }

    /// Size of a field element, and of the secret scalar, in bytes.
    pub const fn field_size(&self) -> usize {
        match self {
            Self::NistP256 => 32,
            Self::NistP384 => 48,
            Self::NistP521 => 66,
        }
    }

    /// Length of an uncompressed SEC1 point.
    pub const fn point_size(&self) -> usize {
        1 + 2 * self.field_size()
    }

    /// Hash mandated for SSH signatures on this curve (RFC 5656 section 6.2.1).
    pub const fn ssh_hash(&self) -> HashAlgorithm {
        match self {
            Self::NistP256 => HashAlgorithm::Sha256,
            Self::NistP384 => HashAlgorithm::Sha384,
            Self::NistP521 => HashAlgorithm::Sha512,
        }
    }

    fn prime_and_order(&self) -> (&'static [u8], &'static [u8]) {
        match self {
            Self::NistP256 => (&P256_PRIME, &P256_ORDER),
            Self::NistP384 => (&P384_PRIME, &P384_ORDER),
            Self::NistP521 => (&P521_PRIME, &P521_ORDER),
        }
    }
}

/// Get the right curve given an oid.
pub fn ecc_curve_from_oid(oid: &ObjectIdentifier) -> Option<EcdsaCurve> {
    EcdsaCurve::ALL.into_iter().find(|c| &c.oid() == oid)
}

/// Resolve explicit curve parameters by field prime and group order.
///
/// Both values are big-endian without leading zeros.
pub fn ecc_curve_from_domain(prime: &[u8], order: &[u8]) -> Option<EcdsaCurve> {
    let strip = crate::types::strip_leading_zeros;
    EcdsaCurve::ALL.into_iter().find(|c| {
        let (p, n) = c.prime_and_order();
        strip(p) == strip(prime) && strip(n) == strip(order)
    })
}

impl FromStr for EcdsaCurve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "nistp256" | "p256" | "p-256" | "secp256r1" | "prime256v1" => Ok(Self::NistP256),
            "nistp384" | "p384" | "p-384" | "secp384r1" => Ok(Self::NistP384),
            "nistp521" | "p521" | "p-521" | "secp521r1" => Ok(Self::NistP521),
            _ => crate::unsupported_err!("curve {:?}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_lookup() {
        for curve in EcdsaCurve::ALL {
            assert_eq!(ecc_curve_from_oid(&curve.oid()), Some(curve));
            assert_eq!(EcdsaCurve::from_ssh_key_type(curve.ssh_key_type()), Some(curve));
            assert_eq!(curve.ssh_name().parse::<EcdsaCurve>().unwrap(), curve);
        }

        // secp224r1
        let oid = ObjectIdentifier::new_unwrap("1.3.132.0.33");
        assert_eq!(ecc_curve_from_oid(&oid), None);
        assert!("secp224r1".parse::<EcdsaCurve>().unwrap_err().is_unsupported_algorithm());
    }

    #[test]
    fn test_domain_lookup() {
        assert_eq!(
            ecc_curve_from_domain(&P384_PRIME, &P384_ORDER),
            Some(EcdsaCurve::NistP384)
        );
        let mut padded = vec![0u8];
        padded.extend_from_slice(&P256_PRIME);
        assert_eq!(
            ecc_curve_from_domain(&padded, &P256_ORDER),
            Some(EcdsaCurve::NistP256)
        );
        assert_eq!(ecc_curve_from_domain(&P256_PRIME, &P384_ORDER), None);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(EcdsaCurve::NistP521.point_size(), 133);
        assert_eq!(EcdsaCurve::NistP256.nbits(), 256);
        assert_eq!(EcdsaCurve::NistP384.to_string(), "nistp384");
    }
}
