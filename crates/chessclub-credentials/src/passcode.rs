//! Six-digit one-time passcodes delivered by SMS.

use std::fmt;

use chrono::Duration;

use crate::random::{self, RandomSourceError};
use crate::{Digest, sha256};

pub const PASSCODE_MIN: u32 = 100_000;
pub const PASSCODE_MAX: u32 = 999_999;

const PASSCODE_TTL_MINUTES: i64 = 30;

/// How long a stored passcode stays usable.
pub fn passcode_ttl() -> Duration {
    Duration::minutes(PASSCODE_TTL_MINUTES)
}

/// Plaintext passcode. Only `Display` reveals the digits (for the SMS body).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Passcode(u32);

impl Passcode {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passcode(******)")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GeneratedPasscode {
    pub code: Passcode,
    pub hash: Digest,
}

/// Draw a passcode uniformly from `PASSCODE_MIN..=PASSCODE_MAX`.
pub fn generate() -> Result<GeneratedPasscode, RandomSourceError> {
    let offset = random::uniform_below(PASSCODE_MAX - PASSCODE_MIN + 1)?;
    let code = Passcode(PASSCODE_MIN + offset);
    Ok(GeneratedPasscode {
        code,
        hash: hash(&code.to_string()),
    })
}

/// SHA-256 of the decimal passcode.
pub fn hash(candidate: &str) -> Digest {
    sha256(candidate.as_bytes())
}

/// Whether `candidate` hashes to `stored`. An empty `stored` (consumed) never matches.
pub fn verify(candidate: &str, stored: &[u8]) -> bool {
    !stored.is_empty() && hash(candidate)[..] == *stored
}

/// Whether a client-supplied number has the passcode shape.
pub fn is_well_formed(candidate: u32) -> bool {
    (PASSCODE_MIN..=PASSCODE_MAX).contains(&candidate)
}
