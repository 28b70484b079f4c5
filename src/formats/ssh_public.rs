//! The one-line public key format of `authorized_keys` and `*.pub` files.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;

use crate::errors::{bail, ensure, Result};
use crate::formats::{rfc4253, Decoded};
use crate::types::PublicParams;
use crate::wire::WireEncode;

/// Parses `<type> <base64 blob> [comment]`.
///
/// The type field must name the same key type as the blob.
pub fn decode(input: &[u8]) -> Result<Decoded<PublicParams>> {
    let text = std::str::from_utf8(input)?;
    let Some(line) = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
    else {
        bail!("no public key line");
    };

    let mut fields = line.splitn(3, |c: char| c == ' ' || c == '\t');
    let key_type = fields.next().unwrap_or_default();
    let Some(blob) = fields.next() else {
        bail!("public key line without key data");
    };
    let comment = fields
        .next()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let params = rfc4253::decode(&STANDARD.decode(blob)?)?;
    ensure!(
        params.ssh_key_type() == key_type,
        "key type {:?} does not match the {} blob",
        key_type,
        params.ssh_key_type()
    );
    debug!("public key line of type {}", key_type);

    Ok((params, comment))
}

pub fn encode(params: &PublicParams, comment: Option<&str>) -> Result<Vec<u8>> {
    let mut line = format!(
        "{} {}",
        params.ssh_key_type(),
        STANDARD.encode(params.to_wire_bytes()?)
    );
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        ensure!(!comment.contains('\n'), "comments can not span lines");
        line.push(' ');
        line.push_str(comment);
    }
    line.push('\n');

    Ok(line.into_bytes())
}

/// True if `input` starts with what looks like an SSH key type followed by a space.
pub(crate) fn looks_like_line(input: &[u8]) -> bool {
    let input = input.trim_ascii_start();
    let Some(end) = input.iter().position(|b| *b == b' ' || *b == b'\t') else {
        return false;
    };
    let name = &input[..end];
    (name.starts_with(b"ssh-") || name.starts_with(b"ecdsa-sha2-"))
        && name.iter().all(|b| b.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ed25519PublicParams;

    #[test]
    fn test_line_roundtrip() {
        let key = ed25519_dalek::SigningKey::from_bytes(&[3u8; 32]);
        let params = PublicParams::Ed25519(Ed25519PublicParams {
            key: key.verifying_key(),
        });

        let line = encode(&params, Some("alice@example.com")).unwrap();
        assert!(line.starts_with(b"ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAI"));
        assert!(line.ends_with(b" alice@example.com\n"));

        let (back, comment) = decode(&line).unwrap();
        assert_eq!(back, params);
        assert_eq!(comment.as_deref(), Some("alice@example.com"));

        let (_, comment) = decode(&encode(&params, None).unwrap()).unwrap();
        assert_eq!(comment, None);
    }

    #[test]
    fn test_type_mismatch() {
        let key = ed25519_dalek::SigningKey::from_bytes(&[3u8; 32]);
        let params = PublicParams::Ed25519(Ed25519PublicParams {
            key: key.verifying_key(),
        });
        let line = String::from_utf8(encode(&params, None).unwrap()).unwrap();
        let line = line.replace("ssh-ed25519", "ssh-rsa");
        assert!(decode(line.as_bytes()).unwrap_err().is_format());
    }
}
