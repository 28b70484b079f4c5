use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;

use crate::crypto::hash::HashAlgorithm;
use crate::errors::{bail, ensure_eq, Error, Result};
use crate::key::KeyDetails;
use crate::types::PublicParams;
use crate::wire::WireEncode;

/// How a [`Fingerprint`] is rendered as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum FingerprintFormat {
    /// `SHA256:` followed by unpadded base64.
    #[display("base64")]
    Base64,
    /// `MD5:` followed by colon separated lowercase hex.
    #[display("hex")]
    Hex,
}

impl FromStr for FingerprintFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            _ => bail!("unknown fingerprint format {:?}", s),
        }
    }
}

/// Digest over the RFC 4253 blob of a public key.
#[derive(Clone, PartialEq, Eq, Hash, derive_more::Debug)]
pub struct Fingerprint {
    hash: HashAlgorithm,
    #[debug("{}", hex::encode(digest))]
    digest: Vec<u8>,
}

impl Fingerprint {
    pub fn new(hash: HashAlgorithm, digest: Vec<u8>) -> Result<Self> {
        ensure_eq!(digest.len(), hash.digest_size(), "{} fingerprint length", hash);
        Ok(Self { hash, digest })
    }

    pub(crate) fn of_params(params: &PublicParams, hash: HashAlgorithm) -> Result<Self> {
        let blob = params.to_wire_bytes()?;
        Ok(Self {
            hash,
            digest: hash.digest(&blob),
        })
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Recomputes the fingerprint of `key` with this fingerprint's hash and
    /// compares the full digests.
    pub fn matches<K: KeyDetails + ?Sized>(&self, key: &K) -> bool {
        match key.fingerprint(self.hash) {
            Ok(other) => other.digest == self.digest,
            Err(_) => false,
        }
    }

    pub fn to_string_as(&self, format: FingerprintFormat) -> String {
        match format {
            FingerprintFormat::Base64 => {
                format!("{}:{}", self.hash, STANDARD_NO_PAD.encode(&self.digest))
            }
            FingerprintFormat::Hex => format!("{}:{}", self.hash, colon_hex(&self.digest)),
        }
    }

    /// The format `ssh-keygen -l` uses for this hash.
    pub fn default_format(&self) -> FingerprintFormat {
        match self.hash {
            HashAlgorithm::Md5 => FingerprintFormat::Hex,
            _ => FingerprintFormat::Base64,
        }
    }

    /// Parses either rendering, or the legacy bare colon-hex MD5 form.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (hash, body) = match s.split_once(':') {
            Some((name, body)) if !is_hex_byte(name) => (name.parse::<HashAlgorithm>()?, body),
            _ => (HashAlgorithm::Md5, s),
        };

        let digest = if body.len() == hash.digest_size() * 3 - 1 && body.contains(':') {
            parse_colon_hex(body)?
        } else {
            STANDARD_NO_PAD.decode(body.trim_end_matches('='))?
        };

        Self::new(hash, digest)
    }
}

fn is_hex_byte(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn parse_colon_hex(s: &str) -> Result<Vec<u8>> {
    s.split(':')
        .map(|part| {
            if !is_hex_byte(part) {
                bail!("invalid fingerprint byte {:?}", part);
            }
            u8::from_str_radix(part, 16).map_err(|_| crate::format_err!("invalid hex {:?}", part))
        })
        .collect()
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_as(self.default_format()))
    }
}

impl FromStr for Fingerprint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn test_render_and_parse() {
        let fp = Fingerprint::new(
            HashAlgorithm::Md5,
            hex!("eab233bd28fdb01f18f07d4eaa144833").to_vec(),
        )
        .unwrap();
        let text = "MD5:ea:b2:33:bd:28:fd:b0:1f:18:f0:7d:4e:aa:14:48:33";
        assert_eq!(fp.to_string(), text);
        assert_eq!(Fingerprint::parse(text).unwrap(), fp);
        assert_eq!(Fingerprint::parse(&text[4..]).unwrap(), fp);
        assert_eq!(Fingerprint::parse(&fp.to_string_as(FingerprintFormat::Base64)).unwrap(), fp);

        let text = "SHA256:FdnBVPto1S/ITGOMm017P+2mNeH+h6rdQ58wC0LfUhY";
        let fp = Fingerprint::parse(text).unwrap();
        assert_eq!(fp.hash(), HashAlgorithm::Sha256);
        assert_eq!(fp.to_string(), text);
        assert_eq!(Fingerprint::parse(&fp.to_string_as(FingerprintFormat::Hex)).unwrap(), fp);
        assert_eq!(Fingerprint::parse("sha256:FdnBVPto1S/ITGOMm017P+2mNeH+h6rdQ58wC0LfUhY=").unwrap(), fp);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Fingerprint::parse("SHA256:abc").is_err());
        assert!(Fingerprint::parse("SHA3:FdnBVPto1S/ITGOMm017P+2mNeH+h6rdQ58wC0LfUhY").is_err());
        assert!(Fingerprint::parse("ea:b2:33").is_err());
        assert!(Fingerprint::parse("zz:b2:33:bd:28:fd:b0:1f:18:f0:7d:4e:aa:14:48:33").is_err());
    }
}
