//! The per-cycle encode → pad → encrypt → frame pipeline.
//!
//! One snapshot in, one transportable frame out. All scratch space lives
//! in [`CycleBuffers`], allocated once and reused every cycle by a single
//! owner. The plaintext region is wiped before each serialization, so a
//! short record can never leak the previous cycle's bytes through the
//! padding, and a failed transmission leaves nothing behind for the next
//! cycle to pick up.

use thiserror::Error;

use crate::cipher::{self, CipherError, CipherKey, Iv, CIPHERTEXT_LEN, PLAINTEXT_CAPACITY};
use crate::entropy::{EntropyError, EntropySource};
use crate::frame::{self, FRAME_LEN};
use crate::padding::{self, PadError};
use crate::snapshot::{self, SensorSnapshot, SerializeError};

// ── Cycle buffers ─────────────────────────────────────────────────────────────

/// Scratch buffers for one telemetry cycle, allocated once per process
/// and owned by the orchestrator.
pub struct CycleBuffers {
    plain: [u8; PLAINTEXT_CAPACITY],
    frame: String,
}

impl CycleBuffers {
    pub fn new() -> Self {
        Self {
            plain: [0u8; PLAINTEXT_CAPACITY],
            frame: String::with_capacity(FRAME_LEN),
        }
    }

    /// Wipe the plaintext region and drop the previous frame.
    ///
    /// Runs at the start of every cycle regardless of how the previous
    /// one ended.
    fn clear(&mut self) {
        self.plain.fill(0);
        self.frame.clear();
    }
}

impl Default for CycleBuffers {
    fn default() -> Self {
        Self::new()
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Run one snapshot through the full pipeline, returning the outbound
/// frame.
///
/// The returned slice borrows `buffers`: the caller hands it to the link
/// before the next cycle reuses the storage. Any error aborts the cycle
/// before a frame exists; nothing partial is ever transmitted.
pub fn build_frame<'a, E: EntropySource>(
    snapshot: &SensorSnapshot,
    key: &CipherKey,
    entropy: &mut E,
    buffers: &'a mut CycleBuffers,
) -> Result<&'a str, PipelineError> {
    buffers.clear();

    let plain_len = snapshot::serialize_into(snapshot, &mut buffers.plain)?;
    let padded_len = padding::pad(&mut buffers.plain, plain_len, CIPHERTEXT_LEN)?;

    let iv = Iv::generate(entropy)?;
    cipher::encrypt_in_place(&mut buffers.plain[..padded_len], key, &iv)?;

    frame::encode_frame(&iv, &buffers.plain[..padded_len], &mut buffers.frame);
    Ok(&buffers.frame)
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Everything that can abort a cycle before the link write.
///
/// None of these are recoverable mid-cycle: the orchestrator drops the
/// cycle and starts the next one clean.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("entropy: {0}")]
    Entropy(#[from] EntropyError),

    #[error("serialize: {0}")]
    Serialize(#[from] SerializeError),

    #[error("pad: {0}")]
    Pad(#[from] PadError),

    #[error("cipher: {0}")]
    Cipher(#[from] CipherError),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
