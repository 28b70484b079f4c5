//! # Armor module
//!
//! PEM armor as described in RFC 7468, with the RFC 1421 style headers
//! OpenSSL writes in front of encrypted legacy keys.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};

use crate::errors::{bail, ensure, unsupported_err, Error, Result};

/// Default body width of PEM armor, in characters.
pub const PEM_LINE_WIDTH: usize = 64;
/// Body width `ssh-keygen` uses for `OPENSSH PRIVATE KEY` armor.
pub const OPENSSH_LINE_WIDTH: usize = 70;

/// OpenSSL PKCS#1 style armor types
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Pkcs1Type {
    Rsa,
    Dsa,
    Ec,
}

impl fmt::Display for Pkcs1Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pkcs1Type::Rsa => f.write_str("RSA"),
            Pkcs1Type::Dsa => f.write_str("DSA"),
            Pkcs1Type::Ec => f.write_str("EC"),
        }
    }
}

/// The label between `-----BEGIN ` and `-----`.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BlockType {
    /// `RSA PUBLIC KEY`
    PublicKeyPkcs1(Pkcs1Type),
    /// `PUBLIC KEY`, a SubjectPublicKeyInfo
    PublicKeyPkcs8,
    /// `RSA PRIVATE KEY`, `DSA PRIVATE KEY` or `EC PRIVATE KEY`
    PrivateKeyPkcs1(Pkcs1Type),
    /// `PRIVATE KEY`
    PrivateKeyPkcs8,
    /// `ENCRYPTED PRIVATE KEY`
    EncryptedPrivateKeyPkcs8,
    /// `OPENSSH PRIVATE KEY`
    PrivateKeyOpenssh,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::PublicKeyPkcs1(typ) => write!(f, "{typ} PUBLIC KEY"),
            BlockType::PublicKeyPkcs8 => f.write_str("PUBLIC KEY"),
            BlockType::PrivateKeyPkcs1(typ) => write!(f, "{typ} PRIVATE KEY"),
            BlockType::PrivateKeyPkcs8 => f.write_str("PRIVATE KEY"),
            BlockType::EncryptedPrivateKeyPkcs8 => f.write_str("ENCRYPTED PRIVATE KEY"),
            BlockType::PrivateKeyOpenssh => f.write_str("OPENSSH PRIVATE KEY"),
        }
    }
}

impl FromStr for BlockType {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        let typ = match label {
            "RSA PUBLIC KEY" => Self::PublicKeyPkcs1(Pkcs1Type::Rsa),
            "PUBLIC KEY" => Self::PublicKeyPkcs8,
            "RSA PRIVATE KEY" => Self::PrivateKeyPkcs1(Pkcs1Type::Rsa),
            "DSA PRIVATE KEY" => Self::PrivateKeyPkcs1(Pkcs1Type::Dsa),
            "EC PRIVATE KEY" => Self::PrivateKeyPkcs1(Pkcs1Type::Ec),
            "PRIVATE KEY" => Self::PrivateKeyPkcs8,
            "ENCRYPTED PRIVATE KEY" => Self::EncryptedPrivateKeyPkcs8,
            "OPENSSH PRIVATE KEY" => Self::PrivateKeyOpenssh,
            _ => bail!("unknown PEM label {:?}", label),
        };
        Ok(typ)
    }
}

/// A decoded armor block.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Armored {
    pub typ: BlockType,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

const BEGIN: &str = "-----BEGIN ";
const END: &str = "-----END ";
const DASHES: &str = "-----";

/// Returns true if `input`, after leading whitespace, starts an armor block.
pub fn is_armored(input: &[u8]) -> bool {
    input.trim_ascii_start().starts_with(BEGIN.as_bytes())
}

/// Returns the label of the first armor block, without decoding the body.
pub fn peek_label(input: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(input).ok()?.trim_start();
    let rest = text.strip_prefix(BEGIN)?;
    let (label, _) = rest.split_once(DASHES)?;
    Some(label)
}

/// Decodes the first armor block in `input`.
///
/// Encrypted legacy PEM (`Proc-Type: 4,ENCRYPTED`) and the
/// `ENCRYPTED PRIVATE KEY` label are rejected as unsupported.
pub fn decode(input: &[u8]) -> Result<Armored> {
    let text = std::str::from_utf8(input)?;
    let mut lines = text.trim_start().lines().map(str::trim_end);

    let Some(first) = lines.next() else {
        bail!("empty PEM input");
    };
    let Some(label) = first
        .strip_prefix(BEGIN)
        .and_then(|rest| rest.strip_suffix(DASHES))
    else {
        bail!("missing PEM header line");
    };
    let typ: BlockType = label.parse()?;
    debug!("armor block {:?}", typ);
    if typ == BlockType::EncryptedPrivateKeyPkcs8 {
        unsupported_err!("encrypted PKCS#8 private keys");
    }

    let mut headers = BTreeMap::new();
    let mut body = String::new();
    let mut in_headers = true;
    let mut last_header: Option<String> = None;
    let mut footer = None;

    for line in lines {
        if let Some(rest) = line.strip_prefix(END) {
            footer = Some(rest);
            break;
        }
        if in_headers {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim().to_string();
                headers.insert(key.clone(), value.trim().to_string());
                last_header = Some(key);
                continue;
            }
            // RFC 1421 continuation lines start with whitespace
            if let (Some(key), Some(b' ' | b'\t')) = (&last_header, line.bytes().next()) {
                if let Some(value) = headers.get_mut(key) {
                    value.push_str(line.trim());
                }
                continue;
            }
            in_headers = false;
            if line.is_empty() {
                continue;
            }
        }
        body.push_str(line.trim());
    }

    let Some(footer) = footer else {
        bail!("missing PEM footer for {}", typ);
    };
    ensure!(
        footer.strip_suffix(DASHES) == Some(label),
        "PEM footer {:?} does not match header {:?}",
        footer,
        label
    );

    if let Some(proc_type) = headers.get("Proc-Type") {
        if proc_type.contains("ENCRYPTED") {
            unsupported_err!("encrypted PEM ({})", proc_type);
        }
        warn!("ignoring PEM Proc-Type {:?}", proc_type);
    }

    let body = STANDARD.decode(body.as_bytes())?;

    Ok(Armored { typ, headers, body })
}

/// Armors `body` with `typ`, wrapping the base64 text at `line_width`.
pub fn write(body: &[u8], typ: BlockType, line_width: usize) -> Result<String> {
    ensure!(line_width > 0, "armor line width must be positive");
    let encoded = STANDARD.encode(body);

    let mut out = String::with_capacity(encoded.len() + encoded.len() / line_width + 64);
    out.push_str(BEGIN);
    out.push_str(&typ.to_string());
    out.push_str(DASHES);
    out.push('\n');

    // base64 output is ascii
    for chunk in encoded.as_bytes().chunks(line_width) {
        out.push_str(std::str::from_utf8(chunk)?);
        out.push('\n');
    }

    out.push_str(END);
    out.push_str(&typ.to_string());
    out.push_str(DASHES);
    out.push('\n');

    Ok(out)
}
