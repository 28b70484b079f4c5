mod fingerprint;
mod mpi;
mod params;
mod signature;

pub use self::{
    fingerprint::{Fingerprint, FingerprintFormat},
    mpi::*,
    params::*,
    signature::{Signature, SignatureFormat},
};
pub(crate) use self::mpi::strip_leading_zeros;
