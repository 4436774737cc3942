//! Opaque bearer tokens.
//!
//! A token is 16 bytes from the OS random source, encoded as unpadded base32
//! (26 characters, `A-Z2-7`). The client receives the plaintext; the store only
//! ever receives [`hash`] of it together with the owner, scope and expiry.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};

use crate::random::{self, RandomSourceError};
use crate::{Digest, sha256};

/// Random bytes per token (128 bits of entropy).
pub const TOKEN_BYTES: usize = 16;

/// Length of the base32 plaintext.
pub const TOKEN_LEN: usize = 26;

/// Purpose a token may be presented for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    /// General API access.
    Authentication,
    /// Account confirmation.
    Activation,
    /// Password reset.
    PasswordReset,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Activation => "activation",
            Self::PasswordReset => "password-reset",
        }
    }

    /// Fixed lifetime of a token issued for this scope.
    pub fn ttl(self) -> Duration {
        match self {
            Self::Authentication => Duration::days(365),
            Self::Activation => Duration::hours(24),
            Self::PasswordReset => Duration::hours(1),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown token scope: {0}")]
pub struct UnknownScope(pub String);

impl FromStr for Scope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authentication" => Ok(Self::Authentication),
            "activation" => Ok(Self::Activation),
            "password-reset" => Ok(Self::PasswordReset),
            other => Err(UnknownScope(other.to_owned())),
        }
    }
}

/// Presented token does not have the shape of an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed token")]
pub struct InvalidFormat;

/// A freshly generated token. The plaintext is redacted from `Debug`.
#[derive(Clone)]
pub struct GeneratedToken {
    pub plaintext: String,
    pub hash: Digest,
}

impl fmt::Debug for GeneratedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedToken")
            .field("plaintext", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Generate a new token from the OS random source.
pub fn generate() -> Result<GeneratedToken, RandomSourceError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    random::fill(&mut bytes)?;
    let plaintext = BASE32_NOPAD.encode(&bytes);
    let hash = hash(&plaintext);
    Ok(GeneratedToken { plaintext, hash })
}

/// SHA-256 of the token plaintext, the only form the store sees.
pub fn hash(plaintext: &str) -> Digest {
    sha256(plaintext.as_bytes())
}

/// Check that `presented` looks like an issued token before touching the store.
pub fn parse(presented: &str) -> Result<&str, InvalidFormat> {
    let well_formed = presented.len() == TOKEN_LEN
        && presented
            .bytes()
            .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b));
    if well_formed {
        Ok(presented)
    } else {
        Err(InvalidFormat)
    }
}
