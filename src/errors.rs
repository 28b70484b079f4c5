use std::num::TryFromIntError;

use snafu::{Backtrace, Snafu};

use crate::crypto::{hash::HashAlgorithm, public_key::KeyType};
use crate::formats::KeyFormat;

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// Error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// The envelope or structure does not match the expected format.
    #[snafu(display("invalid key format: {message}"))]
    Format { message: String },
    /// Well formed input naming an algorithm, curve or cipher we do not support.
    #[snafu(display("unsupported algorithm: {message}"))]
    UnsupportedAlgorithm { message: String },
    /// The key cannot be represented in the requested format.
    #[snafu(display("{key_type} keys can not be encoded as {format}"))]
    UnsupportedFormat { format: KeyFormat, key_type: KeyType },
    /// Internal consistency checks inside a container failed.
    #[snafu(display("corrupt key: {message}"))]
    CorruptKey { message: String },
    #[snafu(display("hash {hash} is not permitted for {key_type} keys"))]
    InvalidDigest {
        hash: HashAlgorithm,
        key_type: KeyType,
    },
    #[snafu(display("malformed signature: {message}"))]
    MalformedSignature { message: String },
    #[snafu(display("invalid base64: {source}"))]
    Base64Decode { source: base64::DecodeError },
    #[snafu(transparent)]
    Rsa { source: rsa::errors::Error },
    #[snafu(transparent)]
    EllipticCurve { source: elliptic_curve::Error },
    #[snafu(transparent)]
    Signature { source: signature::Error },
    #[snafu(transparent)]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
    #[snafu(transparent)]
    Utf8 { source: std::str::Utf8Error },
    #[snafu(transparent)]
    TryFromInt { source: TryFromIntError },
}

impl Error {
    /// Returns true if the input was rejected because of its structure.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. } | Self::Base64Decode { .. })
    }

    pub fn is_unsupported_algorithm(&self) -> bool {
        matches!(self, Self::UnsupportedAlgorithm { .. })
    }
}

impl From<base64::DecodeError> for Error {
    fn from(source: base64::DecodeError) -> Self {
        Self::Base64Decode { source }
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(err: derive_builder::UninitializedFieldError) -> Error {
        Error::Format {
            message: err.to_string(),
        }
    }
}

#[macro_export]
macro_rules! unsupported_err {
    ($e:expr) => {
        return Err($crate::errors::Error::UnsupportedAlgorithm { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::UnsupportedAlgorithm { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! corrupt_err {
    ($e:expr) => {
        return Err($crate::errors::Error::CorruptKey { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::CorruptKey { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! bail {
    ($e:expr) => {
        return Err($crate::errors::Error::Format { message: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::Format { message: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! format_err {
    ($e:expr) => {
        $crate::errors::Error::Format { message: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::Format { message: format!($fmt, $($arg)+) }
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            $crate::bail!($e);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::bail!($fmt, $($arg)+);
        }
    };
}

#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr, $($arg:tt)+) => ({
        match (&($left), &($right)) {
            (left_val, right_val) => {
                if !(*left_val == *right_val) {
                    $crate::bail!("{}: expected `{:?}`, found `{:?}`",
                        format_args!($($arg)+), right_val, left_val)
                }
            }
        }
    });
}

pub use crate::{bail, corrupt_err, ensure, ensure_eq, format_err, unsupported_err};

#[cfg(test)]
mod tests {
    use super::*;

    fn check_len(len: usize) -> Result<()> {
        ensure_eq!(len, 32, "ed25519 public key length");
        Ok(())
    }

    #[test]
    fn ensure_eq_reports_format_error() {
        let err = check_len(31).unwrap_err();
        assert!(err.is_format());
        assert_eq!(
            err.to_string(),
            "invalid key format: ed25519 public key length: expected `32`, found `31`"
        );
        assert!(check_len(32).is_ok());
    }

    #[test]
    fn unsupported_format_display() {
        let err = Error::UnsupportedFormat {
            format: KeyFormat::Pkcs1,
            key_type: KeyType::Ed25519,
        };
        assert_eq!(err.to_string(), "ed25519 keys can not be encoded as pkcs1");
    }
}
