//! Key encodings.
//!
//! Every format module converts between bytes and the parameter model in
//! [`crate::types`]. This module maps a caller supplied [`KeyFormat`] to
//! those modules. Parsing never guesses: [`sniff`] is a separate hint.

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;
use log::debug;

use crate::armor::{self, BlockType, Pkcs1Type, OPENSSH_LINE_WIDTH, PEM_LINE_WIDTH};
use crate::errors::{bail, ensure, Error, Result};
use crate::types::{PublicParams, SecretParams};

pub mod pkcs1;
pub mod pkcs8;
pub mod rfc4253;
pub mod sec1;
pub mod ssh_private;
pub mod ssh_public;

/// The encodings keys can be parsed from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFormat {
    /// Any PEM armored key. Writes the conventional OpenSSL form per algorithm.
    Pem,
    /// `RSA PRIVATE KEY`, `DSA PRIVATE KEY`, `EC PRIVATE KEY`, `RSA PUBLIC KEY`.
    Pkcs1,
    /// `PRIVATE KEY` and `PUBLIC KEY`, armored or raw DER.
    Pkcs8,
    /// The `openssh-key-v1` container.
    SshPrivate,
    /// `openssh-key-v1` for private keys, the `authorized_keys` line for public keys.
    OpenSsh,
    /// The RFC 4253 public key blob.
    Rfc4253,
}

impl KeyFormat {
    pub const ALL: [KeyFormat; 6] = [
        Self::Pem,
        Self::Pkcs1,
        Self::Pkcs8,
        Self::SshPrivate,
        Self::OpenSsh,
        Self::Rfc4253,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pem => "pem",
            Self::Pkcs1 => "pkcs1",
            Self::Pkcs8 => "pkcs8",
            Self::SshPrivate => "ssh-private",
            Self::OpenSsh => "openssh",
            Self::Rfc4253 => "rfc4253",
        }
    }
}

impl fmt::Display for KeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "ssh" => Ok(Self::OpenSsh),
            name => match Self::ALL.iter().find(|f| f.name() == name) {
                Some(format) => Ok(*format),
                None => bail!("unknown key format {:?}", s),
            },
        }
    }
}

/// Options for writing keys.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(build_fn(validate = "Self::validate", error = "crate::errors::Error"))]
pub struct EncodeOptions {
    /// Replaces the key's own comment.
    #[builder(default, setter(into, strip_option))]
    comment: Option<String>,
    #[builder(default = "PEM_LINE_WIDTH")]
    pem_line_width: usize,
    #[builder(default = "OPENSSH_LINE_WIDTH")]
    openssh_line_width: usize,
    /// Fixed `openssh-key-v1` check integer. A random one is used when unset.
    #[builder(default, setter(strip_option))]
    check_int: Option<u32>,
}

impl EncodeOptionsBuilder {
    fn validate(&self) -> Result<()> {
        for width in [self.pem_line_width, self.openssh_line_width].into_iter().flatten() {
            ensure!(width > 0, "armor line width must be positive");
        }
        Ok(())
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            comment: None,
            pem_line_width: PEM_LINE_WIDTH,
            openssh_line_width: OPENSSH_LINE_WIDTH,
            check_int: None,
        }
    }
}

impl EncodeOptions {
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn pem_line_width(&self) -> usize {
        self.pem_line_width
    }

    pub fn openssh_line_width(&self) -> usize {
        self.openssh_line_width
    }

    pub fn check_int(&self) -> Option<u32> {
        self.check_int
    }
}

/// Guesses the format of `input` from its envelope alone.
///
/// Looks at the PEM label, the `openssh-key-v1` magic, the key type prefix
/// of a one-line public key and the leading name of an RFC 4253 blob.
pub fn sniff(input: &[u8]) -> Option<KeyFormat> {
    if let Some(label) = armor::peek_label(input) {
        return match label.parse::<BlockType>() {
            Ok(BlockType::PrivateKeyOpenssh) => Some(KeyFormat::SshPrivate),
            Ok(BlockType::PrivateKeyPkcs1(_) | BlockType::PublicKeyPkcs1(_)) => {
                Some(KeyFormat::Pkcs1)
            }
            Ok(BlockType::PrivateKeyPkcs8 | BlockType::PublicKeyPkcs8) => Some(KeyFormat::Pkcs8),
            _ => Some(KeyFormat::Pem),
        };
    }
    if input.starts_with(ssh_private::MAGIC) {
        return Some(KeyFormat::SshPrivate);
    }
    if ssh_public::looks_like_line(input) {
        return Some(KeyFormat::OpenSsh);
    }
    if rfc4253::looks_like_blob(input) {
        return Some(KeyFormat::Rfc4253);
    }
    if input.first() == Some(&crate::der::SEQUENCE) {
        return Some(KeyFormat::Pkcs8);
    }

    None
}

/// Parsed key material and the comment the encoding carried, if any.
pub(crate) type Decoded<P> = (P, Option<String>);

pub(crate) fn parse_private(input: &[u8], format: KeyFormat) -> Result<Decoded<SecretParams>> {
    debug!("parsing private key as {}", format);
    match format {
        KeyFormat::Pem => {
            let armored = armor::decode(input)?;
            if armored.typ == BlockType::PrivateKeyOpenssh {
                return ssh_private::decode_container(&armored.body);
            }
            decode_private_block(armored.typ, &armored.body).map(|params| (params, None))
        }
        KeyFormat::Pkcs1 => {
            let armored = armor::decode(input)?;
            ensure!(
                matches!(armored.typ, BlockType::PrivateKeyPkcs1(_)),
                "expected a PKCS#1 private key, found {}",
                armored.typ
            );
            decode_private_block(armored.typ, &armored.body).map(|params| (params, None))
        }
        KeyFormat::Pkcs8 => {
            let der = if armor::is_armored(input) {
                let armored = armor::decode(input)?;
                ensure_eq_block(armored.typ, BlockType::PrivateKeyPkcs8)?;
                armored.body
            } else {
                input.to_vec()
            };
            pkcs8::decode_private(&der).map(|params| (params, None))
        }
        KeyFormat::SshPrivate | KeyFormat::OpenSsh => ssh_private::decode(input),
        KeyFormat::Rfc4253 => bail!("rfc4253 blobs hold public keys only"),
    }
}

fn decode_private_block(typ: BlockType, der: &[u8]) -> Result<SecretParams> {
    match typ {
        BlockType::PrivateKeyPkcs1(Pkcs1Type::Rsa) => pkcs1::decode_rsa_private(der),
        BlockType::PrivateKeyPkcs1(Pkcs1Type::Dsa) => pkcs1::decode_dsa_private(der),
        BlockType::PrivateKeyPkcs1(Pkcs1Type::Ec) => sec1::decode(der, None),
        BlockType::PrivateKeyPkcs8 => pkcs8::decode_private(der),
        other => bail!("PEM block {} does not hold a private key", other),
    }
}

fn ensure_eq_block(actual: BlockType, expected: BlockType) -> Result<()> {
    ensure!(
        actual == expected,
        "expected PEM block {}, found {}",
        expected,
        actual
    );
    Ok(())
}

pub(crate) fn parse_public(input: &[u8], format: KeyFormat) -> Result<Decoded<PublicParams>> {
    debug!("parsing public key as {}", format);
    match format {
        KeyFormat::Pem => {
            let armored = armor::decode(input)?;
            match armored.typ {
                BlockType::PublicKeyPkcs8 => Ok((pkcs8::decode_public(&armored.body)?, None)),
                BlockType::PublicKeyPkcs1(Pkcs1Type::Rsa) => {
                    Ok((pkcs1::decode_rsa_public(&armored.body)?, None))
                }
                BlockType::PrivateKeyOpenssh => ssh_private::decode_public(&armored.body),
                typ => {
                    let secret = decode_private_block(typ, &armored.body)?;
                    Ok((PublicParams::from(&secret), None))
                }
            }
        }
        KeyFormat::Pkcs1 => {
            let der = if armor::is_armored(input) {
                let armored = armor::decode(input)?;
                ensure_eq_block(armored.typ, BlockType::PublicKeyPkcs1(Pkcs1Type::Rsa))?;
                armored.body
            } else {
                input.to_vec()
            };
            Ok((pkcs1::decode_rsa_public(&der)?, None))
        }
        KeyFormat::Pkcs8 => {
            let der = if armor::is_armored(input) {
                let armored = armor::decode(input)?;
                ensure_eq_block(armored.typ, BlockType::PublicKeyPkcs8)?;
                armored.body
            } else {
                input.to_vec()
            };
            Ok((pkcs8::decode_public(&der)?, None))
        }
        KeyFormat::SshPrivate => {
            if armor::is_armored(input) {
                let armored = armor::decode(input)?;
                ensure_eq_block(armored.typ, BlockType::PrivateKeyOpenssh)?;
                ssh_private::decode_public(&armored.body)
            } else {
                ssh_private::decode_public(input)
            }
        }
        KeyFormat::OpenSsh => ssh_public::decode(input),
        KeyFormat::Rfc4253 => Ok((rfc4253::decode(input)?, None)),
    }
}

pub(crate) fn encode_private(
    params: &SecretParams,
    comment: Option<&str>,
    format: KeyFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    debug!("encoding {} private key as {}", params.key_type(), format);
    let comment = options.comment().or(comment);
    let pem = |body: Vec<u8>, typ: BlockType| -> Result<Vec<u8>> {
        armor::write(&body, typ, options.pem_line_width()).map(String::into_bytes)
    };

    match (format, params) {
        (KeyFormat::Pem | KeyFormat::Pkcs1, SecretParams::Rsa(key)) => pem(
            pkcs1::encode_rsa_private(key)?,
            BlockType::PrivateKeyPkcs1(Pkcs1Type::Rsa),
        ),
        (KeyFormat::Pem | KeyFormat::Pkcs1, SecretParams::Dsa(key)) => pem(
            pkcs1::encode_dsa_private(key)?,
            BlockType::PrivateKeyPkcs1(Pkcs1Type::Dsa),
        ),
        (KeyFormat::Pem | KeyFormat::Pkcs1, SecretParams::Ecdsa(key)) => pem(
            sec1::encode(key, true)?,
            BlockType::PrivateKeyPkcs1(Pkcs1Type::Ec),
        ),
        (KeyFormat::Pem | KeyFormat::Pkcs8, params) => {
            pem(pkcs8::encode_private(params)?, BlockType::PrivateKeyPkcs8)
        }
        (KeyFormat::SshPrivate | KeyFormat::OpenSsh, params) => {
            let body = ssh_private::encode(params, comment, options.check_int())?;
            armor::write(&body, BlockType::PrivateKeyOpenssh, options.openssh_line_width())
                .map(String::into_bytes)
        }
        (format @ (KeyFormat::Pkcs1 | KeyFormat::Rfc4253), params) => {
            Err(Error::UnsupportedFormat {
                format,
                key_type: params.key_type(),
            })
        }
    }
}

pub(crate) fn encode_public(
    params: &PublicParams,
    comment: Option<&str>,
    format: KeyFormat,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    debug!("encoding {} public key as {}", params.key_type(), format);
    let comment = options.comment().or(comment);

    match (format, params) {
        (KeyFormat::Pem | KeyFormat::Pkcs8, params) => armor::write(
            &pkcs8::encode_public(params)?,
            BlockType::PublicKeyPkcs8,
            options.pem_line_width(),
        )
        .map(String::into_bytes),
        (KeyFormat::Pkcs1, PublicParams::Rsa(params)) => armor::write(
            &pkcs1::encode_rsa_public(params)?,
            BlockType::PublicKeyPkcs1(Pkcs1Type::Rsa),
            options.pem_line_width(),
        )
        .map(String::into_bytes),
        (KeyFormat::OpenSsh, params) => ssh_public::encode(params, comment),
        (KeyFormat::Rfc4253, params) => rfc4253::encode(params),
        (format @ (KeyFormat::Pkcs1 | KeyFormat::SshPrivate), params) => {
            Err(Error::UnsupportedFormat {
                format,
                key_type: params.key_type(),
            })
        }
    }
}
