//! OS-backed secure randomness.
//!
//! There is deliberately no non-cryptographic fallback: callers fail the
//! operation when the OS source is unavailable.

/// The operating system's secure random source could not be read.
#[derive(Debug, thiserror::Error)]
#[error("secure random source unavailable")]
pub struct RandomSourceError(#[source] pub getrandom::Error);

/// Fill `buf` from the OS secure random source.
pub fn fill(buf: &mut [u8]) -> Result<(), RandomSourceError> {
    getrandom::fill(buf).map_err(RandomSourceError)
}

/// Uniform integer in `0..span` using rejection sampling (no modulo bias).
pub fn uniform_below(span: u32) -> Result<u32, RandomSourceError> {
    assert!(span > 0, "span must be positive");
    // Largest multiple of `span` that fits in u32; draws at or above it are rejected.
    let zone = u32::MAX - (u32::MAX % span);
    loop {
        let mut bytes = [0u8; 4];
        fill(&mut bytes)?;
        let draw = u32::from_le_bytes(bytes);
        if draw < zone {
            return Ok(draw % span);
        }
    }
}
