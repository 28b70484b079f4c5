/// The key algorithms supported for parsing, encoding and signing.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, derive_more::Display)]
pub enum KeyType {
    #[display("rsa")]
    Rsa,
    #[display("dsa")]
    Dsa,
    #[display("ecdsa")]
    Ecdsa,
    #[display("ed25519")]
    Ed25519,
}
