//! Credential primitives: opaque bearer tokens, SMS passcodes and password hashes.
//!
//! Plaintext tokens and passcodes only ever leave this crate towards the
//! client; storage sees the SHA-256 digest.

pub mod passcode;
pub mod password;
pub mod random;
pub mod token;

/// SHA-256 digest as persisted by the store.
pub type Digest = [u8; 32];

pub(crate) fn sha256(data: &[u8]) -> Digest {
    use sha2::Digest as _;
    sha2::Sha256::digest(data).into()
}
