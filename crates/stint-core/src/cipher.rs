//! AES-192-CTR in-place encryption and the key/IV material it consumes.
//!
//! Counter mode turns the block cipher into a stream cipher: the IV seeds
//! the counter block, each keystream block is XORed over the buffer, and
//! the counter advances per block. Encryption and decryption are the same
//! operation.
//!
//! Key and IV widths are part of the wire contract shared with the
//! receiver population and cannot change unilaterally: a 24-byte key and
//! a 24-byte transmitted IV, of which the first [`BLOCK_LEN`] bytes form
//! the initial counter block.
//!
//! Key material is wiped from memory when dropped. There is no unsafe
//! code in this module.

use aes::Aes192;
use ctr::cipher::{KeyIvInit, StreamCipher};
use static_assertions::const_assert_eq;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::entropy::{EntropyError, EntropySource};

// ── Wire-contract constants ───────────────────────────────────────────────────

/// Cipher key length in bytes (AES-192).
pub const KEY_LEN: usize = 24;

/// Transmitted IV length in bytes. Equal to the key length; only the
/// first [`BLOCK_LEN`] bytes seed the counter, the rest ride along in
/// the frame.
pub const IV_LEN: usize = KEY_LEN;

/// Cipher block length in bytes (AES).
pub const BLOCK_LEN: usize = 16;

/// Fixed padded-plaintext / ciphertext length in bytes.
///
/// Upper-bounds the worst-case serialized snapshot (297 bytes, every
/// field at maximum printed width) while keeping the PKCS#7 padding count
/// within a single byte for every reachable plaintext length.
pub const CIPHERTEXT_LEN: usize = 320;

/// Plaintext arena capacity: one block beyond [`CIPHERTEXT_LEN`] so the
/// padder can always emit a full extra block when the plaintext already
/// sits on the target boundary.
pub const PLAINTEXT_CAPACITY: usize = CIPHERTEXT_LEN + BLOCK_LEN;

const_assert_eq!(CIPHERTEXT_LEN % BLOCK_LEN, 0);

type Aes192Ctr = ctr::Ctr128BE<Aes192>;

// ── Key ───────────────────────────────────────────────────────────────────────

/// The pre-shared AES-192 key.
///
/// Process-wide, read-only, provisioned externally; this node never
/// derives or rotates it. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    bytes: Zeroizing<[u8; KEY_LEN]>,
}

impl core::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CipherKey").finish_non_exhaustive()
    }
}

impl CipherKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Parse a provisioned key from its 48-character hex form.
    pub fn from_hex(text: &str) -> Result<Self, KeyError> {
        let decoded = Zeroizing::new(hex::decode(text.trim()).map_err(|_| KeyError::NotHex)?);
        if decoded.len() != KEY_LEN {
            return Err(KeyError::WrongLength(decoded.len()));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

// ── IV ────────────────────────────────────────────────────────────────────────

/// A per-message initialization vector.
///
/// Freshly generated for every transmission and never reused under a
/// fixed key — the keystream's security rests on IV uniqueness, not
/// secrecy. The IV travels in the clear at the front of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv([u8; IV_LEN]);

impl Iv {
    /// Draw a fresh IV from the entropy source, byte by byte.
    pub fn generate<E: EntropySource>(entropy: &mut E) -> Result<Self, EntropyError> {
        let mut bytes = [0u8; IV_LEN];
        entropy.fill(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; IV_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IV_LEN] {
        &self.0
    }

    /// The initial counter block: the first [`BLOCK_LEN`] bytes.
    fn counter_block(&self) -> [u8; BLOCK_LEN] {
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(&self.0[..BLOCK_LEN]);
        block
    }
}

// ── Encryption ────────────────────────────────────────────────────────────────

/// XOR the AES-192-CTR keystream over `buf`, in place.
///
/// `buf.len()` must be a multiple of [`BLOCK_LEN`]; the padder guarantees
/// this, but the precondition is checked, not assumed. Applying the same
/// key and IV a second time restores the original buffer.
pub fn encrypt_in_place(buf: &mut [u8], key: &CipherKey, iv: &Iv) -> Result<(), CipherError> {
    if buf.len() % BLOCK_LEN != 0 {
        return Err(CipherError::UnalignedLength(buf.len()));
    }
    let mut cipher = Aes192Ctr::new(&(*key.as_bytes()).into(), &iv.counter_block().into());
    cipher.apply_keystream(buf);
    Ok(())
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key is not valid hex")]
    NotHex,

    #[error("key must be {KEY_LEN} bytes (48 hex chars), got {0} bytes")]
    WrongLength(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    #[error("buffer length {0} is not a multiple of the {BLOCK_LEN}-byte block")]
    UnalignedLength(usize),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
