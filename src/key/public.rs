use log::debug;

use crate::errors::Result;
use crate::formats::{self, EncodeOptions, KeyFormat};
use crate::key::KeyDetails;
use crate::types::PublicParams;
use crate::wire::WireEncode;

/// A public key and its optional comment.
///
/// Two keys are equal when their RFC 4253 blobs are, comments are ignored.
#[derive(Debug, Clone, Eq)]
pub struct PublicKey {
    params: PublicParams,
    comment: Option<String>,
}

impl PublicKey {
    pub fn new(params: PublicParams, comment: Option<String>) -> Self {
        Self { params, comment }
    }

    /// Parses a public key encoded as `format`.
    ///
    /// Private key encodings are accepted where they embed or determine the
    /// public key.
    pub fn parse(input: &[u8], format: KeyFormat) -> Result<Self> {
        let (params, comment) = formats::parse_public(input, format)?;
        debug!("parsed {} public key ({} bits) from {}", params.key_type(), params.size(), format);
        Ok(Self { params, comment })
    }

    pub fn encode(&self, format: KeyFormat) -> Result<Vec<u8>> {
        self.encode_with(format, &EncodeOptions::default())
    }

    pub fn encode_with(&self, format: KeyFormat, options: &EncodeOptions) -> Result<Vec<u8>> {
        formats::encode_public(&self.params, self.comment.as_deref(), format, options)
    }

    /// Returns a copy of this key carrying `comment`.
    pub fn with_comment(&self, comment: Option<String>) -> Self {
        Self {
            params: self.params.clone(),
            comment,
        }
    }

    /// The RFC 4253 public key blob.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        self.params.to_wire_bytes()
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_blob(), other.to_blob()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl KeyDetails for PublicKey {
    fn public_params(&self) -> &PublicParams {
        &self.params
    }

    fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}
