//! Entropy acquisition for IV generation.
//!
//! The node draws every random byte from the platform's entropy
//! generator, one byte at a time, and never uses a value the generator
//! has not reported ready. On the reference hardware this is a spin on a
//! TRNG data-ready flag that cannot fail; a hosted source can momentarily
//! starve, so [`OsEntropy`] bounds the wait per byte and reports
//! [`EntropyError::Unavailable`] on expiry instead of stalling the cycle.

use std::time::{Duration, Instant};

use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

// ── Source contract ───────────────────────────────────────────────────────────

/// A source of cryptographically unpredictable bytes.
///
/// `next_byte` blocks until the underlying generator has a fresh value
/// ready. `fill` calls `next_byte` exactly `buf.len()` times, in order,
/// writing sequentially — implementations must preserve that contract if
/// they override it.
pub trait EntropySource {
    fn next_byte(&mut self) -> Result<u8, EntropyError>;

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), EntropyError> {
        for slot in buf.iter_mut() {
            *slot = self.next_byte()?;
        }
        Ok(())
    }
}

// ── OS-backed source ──────────────────────────────────────────────────────────

/// The operating system's CSPRNG standing in for the entropy peripheral.
///
/// Construct once per process, before the first telemetry cycle. Each
/// byte read retries the source within a fixed budget; a source that
/// stays dry past the budget fails the read, and the cycle with it.
pub struct OsEntropy {
    budget: Duration,
}

impl OsEntropy {
    /// Per-byte wait budget used by [`OsEntropy::new`].
    pub const DEFAULT_BUDGET: Duration = Duration::from_millis(5);

    pub fn new() -> Self {
        Self {
            budget: Self::DEFAULT_BUDGET,
        }
    }

    /// A source with a non-default per-byte budget.
    pub fn with_budget(budget: Duration) -> Self {
        Self { budget }
    }
}

impl Default for OsEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for OsEntropy {
    fn next_byte(&mut self) -> Result<u8, EntropyError> {
        let deadline = Instant::now() + self.budget;
        let mut byte = [0u8; 1];
        loop {
            match OsRng.try_fill_bytes(&mut byte) {
                Ok(()) => return Ok(byte[0]),
                Err(_) if Instant::now() < deadline => continue,
                Err(_) => return Err(EntropyError::Unavailable(self.budget)),
            }
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntropyError {
    /// The generator produced nothing within the wait budget.
    /// Fatal to the current cycle; no frame is built or sent.
    #[error("entropy source produced no byte within {0:?}")]
    Unavailable(Duration),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
