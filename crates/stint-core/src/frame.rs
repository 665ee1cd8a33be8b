//! Outbound frame encoding — `Base64(IV) ++ Base64(ciphertext)`.
//!
//! No delimiter and no length field: both halves have fixed encoded
//! widths known to every receiver at compile time. The receiver takes the
//! first [`ENCODED_IV_LEN`] characters as the IV and the remainder as
//! ciphertext. Changing any size constant strands the deployed receiver
//! population — renegotiate the contract, never drift it.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::cipher::{Iv, CIPHERTEXT_LEN, IV_LEN};

// ── Encoded widths ────────────────────────────────────────────────────────────

/// Encoded width of `n` raw bytes under padded Base64: every 3 raw bytes
/// become 4 characters, final group padded with `=`.
pub const fn encoded_len(n: usize) -> usize {
    (n + 2) / 3 * 4
}

/// Encoded width of the IV field at the front of every frame.
pub const ENCODED_IV_LEN: usize = encoded_len(IV_LEN);

/// Total frame width for the fixed ciphertext length.
pub const FRAME_LEN: usize = ENCODED_IV_LEN + encoded_len(CIPHERTEXT_LEN);

// Receivers split at these exact offsets. If either assertion fails, the
// wire format has silently changed.
const_assert_eq!(ENCODED_IV_LEN, 32);
const_assert_eq!(FRAME_LEN, 460);

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encode IV and ciphertext into `out`, replacing its contents.
///
/// `out` is the reusable per-cycle frame buffer; ownership of the bytes
/// transfers to the link on submission and the buffer is reused next
/// cycle.
pub fn encode_frame(iv: &Iv, ciphertext: &[u8], out: &mut String) {
    out.clear();
    BASE64.encode_string(iv.as_bytes(), out);
    BASE64.encode_string(ciphertext, out);
}

/// Split a frame at the fixed IV boundary and decode both halves.
///
/// This is the receiving half of the contract. The node itself never
/// decodes a frame; tests and ground-side tooling do.
pub fn split_frame(frame: &str) -> Result<(Iv, Vec<u8>), FrameError> {
    if frame.len() < ENCODED_IV_LEN {
        return Err(FrameError::TooShort(frame.len()));
    }
    // Split on bytes: a malformed frame must come back as a decode
    // error, not a char-boundary panic.
    let (iv_part, ciphertext_part) = frame.as_bytes().split_at(ENCODED_IV_LEN);
    let iv_bytes: [u8; IV_LEN] = BASE64
        .decode(iv_part)
        .map_err(FrameError::Decode)?
        .try_into()
        .map_err(|_| FrameError::BadIvWidth)?;
    let ciphertext = BASE64.decode(ciphertext_part).map_err(FrameError::Decode)?;
    Ok((Iv::from_bytes(iv_bytes), ciphertext))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame of {0} chars is shorter than the {ENCODED_IV_LEN}-char IV field")]
    TooShort(usize),

    #[error("frame is not valid Base64: {0}")]
    Decode(#[source] base64::DecodeError),

    #[error("decoded IV is not {IV_LEN} bytes")]
    BadIvWidth,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
