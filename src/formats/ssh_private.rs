//! The `openssh-key-v1` private key container (OpenSSH `PROTOCOL.key`).
//!
//! ```text
//! "openssh-key-v1\0"
//! string  ciphername
//! string  kdfname
//! string  kdfoptions
//! uint32  number of keys (1)
//! string  public key blob
//! string  private section
//! ```
//!
//! The private section holds two equal check integers, the key type and
//! its private fields, the comment and `1, 2, 3, ...` padding to the
//! cipher block size.

use bytes::Bytes;
use log::{debug, trace};
use zeroize::Zeroizing;

use crate::armor::{self, BlockType};
use crate::crypto::ecc_curve::EcdsaCurve;
use crate::crypto::ecdsa::normalize_point;
use crate::crypto::{dsa, ecdsa, ed25519, rsa};
use crate::errors::{bail, corrupt_err, ensure, unsupported_err, Result};
use crate::formats::Decoded;
use crate::types::{DsaPublicParams, Mpi, PublicParams, RsaPublicParams, SecretParams};
use crate::wire::{WireEncode, WireRead, WireWrite};

pub(crate) const MAGIC: &[u8] = b"openssh-key-v1\0";
const NONE: &str = "none";
/// Block size of the `none` cipher.
const BLOCK_SIZE: usize = 8;

/// The outer layer of the container.
struct Container {
    cipher: String,
    kdf: String,
    public: Bytes,
    private: Bytes,
}

impl Container {
    fn read(input: &[u8]) -> Result<Self> {
        ensure!(input.starts_with(MAGIC), "missing openssh-key-v1 magic");
        let mut i = Bytes::copy_from_slice(&input[MAGIC.len()..]);

        let cipher = i.read_utf8()?;
        let kdf = i.read_utf8()?;
        let _kdf_options = i.read_string()?;
        let count = i.read_uint32()?;
        debug!("openssh-key-v1: cipher {}, kdf {}, {} keys", cipher, kdf, count);
        match count {
            0 => bail!("openssh-key-v1 container without keys"),
            1 => {}
            n => unsupported_err!("openssh-key-v1 containers with {} keys", n),
        }

        let public = i.read_string()?;
        let private = i.read_string()?;
        i.finish("openssh-key-v1 container")?;

        Ok(Self {
            cipher,
            kdf,
            public,
            private,
        })
    }

    fn ensure_unencrypted(&self) -> Result<()> {
        if self.cipher != NONE || self.kdf != NONE {
            unsupported_err!(
                "encrypted openssh-key-v1 (cipher {}, kdf {})",
                self.cipher,
                self.kdf
            );
        }
        Ok(())
    }
}

/// Decodes an armored or raw container.
pub fn decode(input: &[u8]) -> Result<Decoded<SecretParams>> {
    if armor::is_armored(input) {
        let armored = armor::decode(input)?;
        ensure!(
            armored.typ == BlockType::PrivateKeyOpenssh,
            "expected PEM block {}, found {}",
            BlockType::PrivateKeyOpenssh,
            armored.typ
        );
        decode_container(&armored.body)
    } else {
        decode_container(input)
    }
}

/// Decodes the binary container.
pub fn decode_container(input: &[u8]) -> Result<Decoded<SecretParams>> {
    let container = Container::read(input)?;
    container.ensure_unencrypted()?;

    let public = PublicParams::try_from_wire(container.public.clone())?;
    let mut private = container.private;
    ensure!(
        private.len() % BLOCK_SIZE == 0,
        "private section of {} bytes is not block aligned",
        private.len()
    );

    let check1 = private.read_uint32()?;
    let check2 = private.read_uint32()?;
    if check1 != check2 {
        corrupt_err!("check integers differ ({:#010x} != {:#010x})", check1, check2);
    }

    let key_type = private.read_utf8()?;
    if key_type != public.ssh_key_type() {
        corrupt_err!(
            "private section of type {} for a {} public key",
            key_type,
            public.ssh_key_type()
        );
    }
    let secret = read_private_fields(&key_type, &mut private)?;
    let comment = private.read_utf8()?;
    check_padding(&private)?;

    if PublicParams::from(&secret).to_wire_bytes()? != container.public {
        corrupt_err!("public key does not match the private key");
    }

    let comment = (!comment.is_empty()).then_some(comment);
    Ok((secret, comment))
}

/// Reads the public key of a container without touching the private section.
///
/// This also works for encrypted containers. For unencrypted ones the
/// whole container is checked and the comment is returned as well.
pub fn decode_public(input: &[u8]) -> Result<Decoded<PublicParams>> {
    let container = Container::read(input)?;
    if container.ensure_unencrypted().is_ok() {
        let (secret, comment) = decode_container(input)?;
        return Ok((PublicParams::from(&secret), comment));
    }

    Ok((PublicParams::try_from_wire(container.public)?, None))
}

fn read_private_fields(key_type: &str, i: &mut Bytes) -> Result<SecretParams> {
    trace!("private fields for {}", key_type);
    let params = match key_type {
        "ssh-rsa" => {
            let n = i.read_mpint()?;
            let e = i.read_mpint()?;
            let d = i.read_mpint()?;
            let iqmp = i.read_mpint()?;
            let p = i.read_mpint()?;
            let q = i.read_mpint()?;
            let key = rsa::SecretKey::try_from_components(&n, &e, &d, &p, &q)?;
            if key.iqmp()? != iqmp {
                corrupt_err!("RSA iqmp does not match the primes");
            }
            SecretParams::Rsa(key)
        }
        "ssh-dss" => {
            let p = i.read_mpint()?;
            let q = i.read_mpint()?;
            let g = i.read_mpint()?;
            let y = i.read_mpint()?;
            let x = i.read_mpint()?;
            let public = dsa::public_key_from_mpi(&p, &q, &g, &y)?;
            SecretParams::Dsa(dsa::SecretKey::try_from_mpi(&public, &x)?)
        }
        "ssh-ed25519" => {
            let public: [u8; 32] = i.read_fixed("ed25519 public key")?;
            let keypair = Zeroizing::new(i.read_fixed::<64>("ed25519 private key")?);
            if keypair[32..] != public {
                corrupt_err!("ed25519 public key fields differ");
            }
            SecretParams::Ed25519(ed25519::SecretKey::try_from_keypair(&keypair[..])?)
        }
        other => {
            let Some(curve) = EcdsaCurve::from_ssh_key_type(other) else {
                unsupported_err!("key type {:?}", other);
            };
            let name = i.read_utf8()?;
            ensure!(
                name == curve.ssh_name(),
                "curve name {:?} in a {} key",
                name,
                other
            );
            let point = i.read_string()?;
            let d = Zeroizing::new(i.read_mpint()?);
            let key = ecdsa::SecretKey::try_from_bytes(curve, d.as_bytes())?;
            if normalize_point(curve, &point)? != key.public_point() {
                corrupt_err!("ECDSA public point does not match the private scalar");
            }
            SecretParams::Ecdsa(key)
        }
    };

    Ok(params)
}

fn check_padding(padding: &Bytes) -> Result<()> {
    ensure!(padding.len() < BLOCK_SIZE, "{} bytes of padding", padding.len());
    for (i, b) in padding.iter().enumerate() {
        if usize::from(*b) != i + 1 {
            corrupt_err!("invalid padding byte {:#04x} at {}", b, i);
        }
    }
    Ok(())
}

fn write_private_fields(w: &mut Vec<u8>, params: &SecretParams) -> Result<()> {
    let public = PublicParams::from(params);
    w.write_string(public.ssh_key_type().as_bytes())?;

    match params {
        SecretParams::Rsa(key) => {
            let public = RsaPublicParams::from(key.public_key());
            w.write_mpint(&public.n())?;
            w.write_mpint(&public.e())?;
            w.write_mpint(&key.d())?;
            w.write_mpint(&key.iqmp()?)?;
            w.write_mpint(&key.p())?;
            w.write_mpint(&key.q())?;
        }
        SecretParams::Dsa(key) => {
            let public = DsaPublicParams {
                key: key.verifying_key().clone(),
            };
            w.write_mpint(&public.p())?;
            w.write_mpint(&public.q())?;
            w.write_mpint(&public.g())?;
            w.write_mpint(&public.y())?;
            w.write_mpint(&key.x())?;
        }
        SecretParams::Ecdsa(key) => {
            w.write_string(key.curve().ssh_name().as_bytes())?;
            w.write_string(&key.public_point())?;
            let d = Zeroizing::new(Mpi::from_slice(&key.to_bytes()));
            w.write_mpint(&d)?;
        }
        SecretParams::Ed25519(key) => {
            w.write_string(key.public_key().as_bytes())?;
            w.write_string(&key.keypair_bytes()[..])?;
        }
    }

    Ok(())
}

/// Encodes the binary container for `params`.
///
/// A random check integer is used unless `check_int` is given.
pub fn encode(params: &SecretParams, comment: Option<&str>, check_int: Option<u32>) -> Result<Vec<u8>> {
    let check_int = check_int.unwrap_or_else(rand::random);

    let mut private = Zeroizing::new(Vec::new());
    private.write_uint32(check_int)?;
    private.write_uint32(check_int)?;
    write_private_fields(&mut private, params)?;
    private.write_string(comment.unwrap_or_default().as_bytes())?;
    let mut pad = 1u8;
    while private.len() % BLOCK_SIZE != 0 {
        private.push(pad);
        pad += 1;
    }

    let mut out = MAGIC.to_vec();
    out.write_string(NONE.as_bytes())?;
    out.write_string(NONE.as_bytes())?;
    out.write_string(&[])?;
    out.write_uint32(1)?;
    out.write_string(&PublicParams::from(params).to_wire_bytes()?)?;
    out.write_string(&private)?;

    Ok(out)
}
