use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hex_literal::hex;
use keyfmt::{
    Error, HashAlgorithm, KeyDetails, KeyFormat, KeyType, PrivateKey, PublicKey, Signature,
    SignatureFormat,
};
use pretty_assertions::assert_eq;

const RSA_O_SHA1_FOOBAR: &str = "BIxGQHhrqOyEhbRESDRyGeoarWywKP962vpF6BQPXy/rosR3XfHPFVx7+sFNdrrTA/H1hRk2eE2HGQjsoeJWnDIjGwutbdNISIHnZ3wl6GtR5xFMfFQUxsB+hrI9iabSKLrcAhMpr6jYDLaCFH8dkMZvD+5oLMpz+UmH8/Kgvz0t2HA=";

const ED25519_FOOBAR: [u8; 64] = hex!(
    "81a872a7330aa67aaa8c9ebb4601611a28af6af4511fc90436396529188bba12"
    "3c62513b79b1cd7e72d978e4c8d06a60b6b593c046079db5758170bf2393c10a"
);

/// RFC 6979 signature over "foobar" with SHA-512, as produced by OpenSSL.
const ECDSA521_SHA512_FOOBAR: [u8; 139] = hex!(
    "308188024201d595cd49f6a487cdb15b335eeac84c0bd90ebef43438b87461cf"
    "056f8222ab573f115ddfb18466a8992eb76770ebff1e64c2fb84b0e65a27ac5c"
    "f3657baf57b898024201e78c878a8a8cf1af7ccade9cc4d62aa0abd793d4f690"
    "39a0739586113c887401364ebcccec0fc0b5d8d0814156a5e4008d2464b66ade"
    "e760b134d436701a40c3ea"
);

/// OpenSSL signature over "foobar" with SHA-256, shorter than the field.
const ECDSA521_SHA256_FOOBAR: [u8; 138] = hex!(
    "308187024200b78d5285fa34469d00fabdfa8b10ad0e1092a13c9ae6d041e502"
    "b4fe835efb4646e9a9a98d9992a50349679ded02652a8c8ebb7f79edd64f1ee2"
    "713c2bb217747702414cca7d97a2686ff671e9559ed781602798d7b63a8a260a"
    "ee0e1f7939eaaa106de70bdbef247e56888e26bcde7873a8430431fb706b697c"
    "6b97e75bfc8242f3841a"
);

/// Randomized OpenSSL signature over "foobar" with SHA-512.
const ECDSA521_SHA512_FOOBAR_RANDOM: &str = "MIGHAkF5N/ef48UEkUCeOsQt+ppqow8ds6Wf0NEvPavY7rqEiXuQ+VNdo+3yAwG6kWY9YtTfKiCbeDPtn6PQjuzAgg+HvAJCASzv046qQmS2bi57DrIPTrxVemvegDCkwHE1w2P1jlIWW8FG2o3uxwPg3QqiXOtGzKUgAPNt4epTvr+ItpxudtGQ";

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("tests/fixtures/{name}")).unwrap()
}

fn private(name: &str) -> PrivateKey {
    let data = fixture(name);
    let format = keyfmt::sniff(&data).unwrap();
    PrivateKey::parse(&data, format).unwrap()
}

fn public(name: &str) -> PublicKey {
    PublicKey::parse(&fixture(&format!("{name}.pub")), KeyFormat::OpenSsh).unwrap()
}

fn sign(key: &PrivateKey, hash: HashAlgorithm, data: &[u8]) -> Signature {
    let mut signer = key.create_sign(hash).unwrap();
    signer.write_all(data).unwrap();
    signer.sign().unwrap()
}

fn verify(key: &impl KeyDetails, hash: HashAlgorithm, data: &[u8], sig: &Signature) -> bool {
    let mut verifier = key.create_verify(hash).unwrap();
    verifier.update(data);
    verifier.verify(sig).unwrap()
}

#[test]
fn rsa_sha1_reference_signature() {
    let _ = pretty_env_logger::try_init();
    let key = private("id_rsa_o");

    let mut signer = key.create_sign(HashAlgorithm::Sha1).unwrap();
    signer.update(b"foo");
    signer.update(b"bar");
    let sig = signer.sign().unwrap();
    assert_eq!(sig.to_string(), RSA_O_SHA1_FOOBAR);

    let reference = STANDARD.decode(RSA_O_SHA1_FOOBAR).unwrap();
    let sig = Signature::parse(&reference, KeyType::Rsa, SignatureFormat::Asn1).unwrap();
    assert!(verify(&public("id_rsa_o"), HashAlgorithm::Sha1, b"foobar", &sig));
    assert!(!verify(&public("id_rsa_o"), HashAlgorithm::Sha256, b"foobar", &sig));
}

#[test]
fn ed25519_reference_signature() {
    let key = private("id_ed25519");
    let sig = sign(&key, HashAlgorithm::Sha512, b"foobar");
    assert_eq!(sig.as_bytes(), &ED25519_FOOBAR[..]);

    let sig = Signature::parse(&ED25519_FOOBAR, KeyType::Ed25519, SignatureFormat::Asn1).unwrap();
    assert!(verify(&public("id_ed25519"), HashAlgorithm::Sha512, b"foobar", &sig));
    assert!(!verify(&public("id_ed25519"), HashAlgorithm::Sha512, b"foobaz", &sig));
}

#[test]
fn ecdsa_p521_reference_signatures() {
    let _ = pretty_env_logger::try_init();
    let key = private("id_ecdsa521");
    let public = public("id_ecdsa521");

    let sig = sign(&key, HashAlgorithm::Sha512, b"foobar");
    assert_eq!(sig.as_bytes(), &ECDSA521_SHA512_FOOBAR[..]);
    assert!(verify(&public, HashAlgorithm::Sha512, b"foobar", &sig));
    assert!(!verify(&public, HashAlgorithm::Sha512, b"foobaz", &sig));

    let random = STANDARD.decode(ECDSA521_SHA512_FOOBAR_RANDOM).unwrap();
    let sig = Signature::parse(&random, KeyType::Ecdsa, SignatureFormat::Asn1).unwrap();
    assert!(verify(&public, HashAlgorithm::Sha512, b"foobar", &sig));
    assert!(!verify(&public, HashAlgorithm::Sha384, b"foobar", &sig));

    let sig = Signature::parse(&ECDSA521_SHA256_FOOBAR, KeyType::Ecdsa, SignatureFormat::Asn1).unwrap();
    assert!(verify(&public, HashAlgorithm::Sha256, b"foobar", &sig));
    assert!(verify(&key, HashAlgorithm::Sha256, b"foobar", &sig));
}

#[test]
fn sign_verify_fixtures() {
    let names = ["id_rsa", "id_dsa", "id_ecdsa", "id_ecdsa2", "id_ecdsa521", "id_ed25519"];
    for name in names {
        let key = private(name);
        let hashes: &[HashAlgorithm] = match key.key_type() {
            KeyType::Ed25519 => &[HashAlgorithm::Sha512],
            _ => &HashAlgorithm::ALL,
        };
        for hash in hashes.iter().copied() {
            let sig = sign(&key, hash, b"some data");
            assert!(verify(&public(name), hash, b"some data", &sig), "{name} {hash}");
            assert!(verify(&key, hash, b"some data", &sig), "{name} {hash}");
            assert!(!verify(&public(name), hash, b"other data", &sig), "{name} {hash}");
        }
    }
}

#[test]
fn deterministic_signatures() {
    // RFC 6979 nonces
    for name in ["id_dsa", "id_ecdsa2"] {
        let key = private(name);
        assert_eq!(
            sign(&key, HashAlgorithm::Sha256, b"data"),
            sign(&key, HashAlgorithm::Sha256, b"data")
        );
    }
}

#[test]
fn signature_from_other_key_is_false() {
    let ed25519 = private("id_ed25519");
    let sig = sign(&ed25519, HashAlgorithm::Sha512, b"foobar");

    for name in ["id_rsa", "id_dsa", "id_ecdsa2"] {
        assert!(!verify(&public(name), HashAlgorithm::Sha512, b"foobar", &sig), "{name}");
    }

    // same algorithm, other curve
    let sig = sign(&private("id_ecdsa"), HashAlgorithm::Sha384, b"foobar");
    assert!(!verify(&public("id_ecdsa2"), HashAlgorithm::Sha384, b"foobar", &sig));

    // same curve, other key
    let sig = sign(&private("id_ecdsa_o"), HashAlgorithm::Sha256, b"foobar");
    assert!(!verify(&public("id_ecdsa2"), HashAlgorithm::Sha256, b"foobar", &sig));
}

#[test]
fn ed25519_requires_sha512() {
    let key = private("id_ed25519");
    for hash in [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
    ] {
        let err = key.create_sign(hash).err().unwrap();
        assert!(matches!(err, Error::InvalidDigest { .. }), "{err:?}");
        let err = key.to_public().create_verify(hash).err().unwrap();
        assert!(matches!(err, Error::InvalidDigest { .. }), "{err:?}");
    }
}

#[test]
fn malformed_signatures() {
    let err = Signature::parse(&[0u8; 63], KeyType::Ed25519, SignatureFormat::Asn1).unwrap_err();
    assert!(matches!(err, Error::MalformedSignature { .. }), "{err:?}");

    let err = Signature::parse(b"\x30\x03\x02\x01", KeyType::Ecdsa, SignatureFormat::Asn1).unwrap_err();
    assert!(matches!(err, Error::MalformedSignature { .. }), "{err:?}");

    // an SSH signature naming another algorithm
    let sig = sign(&private("id_ed25519"), HashAlgorithm::Sha512, b"x");
    let ssh = sig.to_bytes(SignatureFormat::Ssh).unwrap();
    let err = Signature::parse(&ssh, KeyType::Rsa, SignatureFormat::Ssh).unwrap_err();
    assert!(matches!(err, Error::MalformedSignature { .. }), "{err:?}");
}

#[test]
fn ssh_signature_form() {
    for (name, hash) in [
        ("id_rsa", HashAlgorithm::Sha256),
        ("id_rsa", HashAlgorithm::Sha512),
        ("id_rsa", HashAlgorithm::Sha1),
        ("id_dsa", HashAlgorithm::Sha1),
        ("id_ecdsa", HashAlgorithm::Sha384),
        ("id_ecdsa521", HashAlgorithm::Sha512),
        ("id_ed25519", HashAlgorithm::Sha512),
    ] {
        let key = private(name);
        let sig = sign(&key, hash, b"ssh data");
        let ssh = sig.to_bytes(SignatureFormat::Ssh).unwrap();
        let back = Signature::parse(&ssh, key.key_type(), SignatureFormat::Ssh).unwrap();
        assert_eq!(back.as_bytes(), sig.as_bytes(), "{name} {hash}");
        assert!(verify(&public(name), hash, b"ssh data", &back), "{name} {hash}");
    }

    let sig = sign(&private("id_rsa"), HashAlgorithm::Sha256, b"");
    let ssh = sig.to_bytes(SignatureFormat::Ssh).unwrap();
    assert_eq!(&ssh[4..16], b"rsa-sha2-256");
}
