//! The RFC 4253 section 6.6 public key blob.

use bytes::Bytes;

use crate::errors::Result;
use crate::types::PublicParams;
use crate::wire::WireEncode;

pub fn decode(input: &[u8]) -> Result<PublicParams> {
    PublicParams::try_from_wire(Bytes::copy_from_slice(input))
}

pub fn encode(params: &PublicParams) -> Result<Vec<u8>> {
    params.to_wire_bytes()
}

/// True if `input` starts with a length prefixed SSH key type name.
pub(crate) fn looks_like_blob(input: &[u8]) -> bool {
    let Some((len, rest)) = input.split_first_chunk::<4>() else {
        return false;
    };
    let len = u32::from_be_bytes(*len) as usize;
    if !(7..=64).contains(&len) || rest.len() < len {
        return false;
    }
    let name = &rest[..len];
    (name.starts_with(b"ssh-") || name.starts_with(b"ecdsa-"))
        && name.iter().all(|b| b.is_ascii_graphic())
}
