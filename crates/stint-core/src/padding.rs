//! PKCS#7 block padding.
//!
//! Every padding byte's value equals the number of bytes added, so the
//! receiver strips padding by reading the final byte. A plaintext that
//! already fills the target gains a full extra block — the count is never
//! zero and stripping is never ambiguous.
//!
//! The ISO/IEC 7816-4 bit-padding scheme is a valid alternative but is
//! not interchangeable with this one; the deployed receiver population
//! unpads PKCS#7 and the schemes must never be mixed.

use thiserror::Error;

use crate::cipher::BLOCK_LEN;

/// Pad `buf[..plain_len]` up to `target_len`, returning the padded
/// length: `target_len`, or `target_len + BLOCK_LEN` when the plaintext
/// already sits exactly on the target boundary.
///
/// `target_len` must be a multiple of [`BLOCK_LEN`] and the padding count
/// must fit a single byte. Both are checked, not assumed.
pub fn pad(buf: &mut [u8], plain_len: usize, target_len: usize) -> Result<usize, PadError> {
    if target_len % BLOCK_LEN != 0 {
        return Err(PadError::UnalignedTarget(target_len));
    }
    if plain_len > target_len {
        return Err(PadError::PlainTooLong {
            plain_len,
            target_len,
        });
    }

    let padded_len = if plain_len == target_len {
        target_len + BLOCK_LEN
    } else {
        target_len
    };
    let count = padded_len - plain_len;
    if count > u8::MAX as usize {
        return Err(PadError::CountTooWide(count));
    }
    if buf.len() < padded_len {
        return Err(PadError::BufferTooSmall {
            needed: padded_len,
            have: buf.len(),
        });
    }

    for slot in &mut buf[plain_len..padded_len] {
        *slot = count as u8;
    }
    Ok(padded_len)
}

/// Strip PKCS#7 padding, returning the plaintext length.
///
/// Verifies every padding byte, not just the trailing count — a
/// malformed tail is an error, never a silent mis-strip.
pub fn unpad(buf: &[u8]) -> Result<usize, PadError> {
    let count = match buf.last() {
        Some(&b) if b != 0 => b as usize,
        _ => return Err(PadError::Malformed),
    };
    if count > buf.len() {
        return Err(PadError::Malformed);
    }
    if !buf[buf.len() - count..].iter().all(|&b| b as usize == count) {
        return Err(PadError::Malformed);
    }
    Ok(buf.len() - count)
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PadError {
    #[error("padding target {0} is not a multiple of the {BLOCK_LEN}-byte block")]
    UnalignedTarget(usize),

    #[error("plaintext ({plain_len} bytes) exceeds the padding target ({target_len})")]
    PlainTooLong { plain_len: usize, target_len: usize },

    #[error("padding count {0} does not fit a single byte")]
    CountTooWide(usize),

    #[error("buffer holds {have} bytes, padding needs {needed}")]
    BufferTooSmall { needed: usize, have: usize },

    #[error("padding is malformed")]
    Malformed,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
