// File:    seed.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: Packs raw random bits into the fixed-length secret seed used for OTP generation.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Secret seed derivation.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// The shared OTP secret.
///
/// Zeroized on drop. `Debug` only reveals the length.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretSeed(Vec<u8>);

impl SecretSeed {
    /// Wraps existing seed bytes, e.g. after decoding them from a transport string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `bytes` is empty.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::config("secret seed must not be empty"));
        }
        Ok(Self(bytes))
    }

    /// Raw seed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Seed length in bytes. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretSeed([REDACTED; {}])", self.0.len())
    }
}

/// Derives a seed of exactly `target_byte_length` bytes from raw bits.
///
/// Bits are consumed in groups of eight, most significant bit first. Only the
/// first `target_byte_length * 8` bits are used; anything after that,
/// including a trailing partial byte, is discarded.
///
/// # Errors
///
/// * [`Error::InvalidConfiguration`] if `target_byte_length` is zero.
/// * [`Error::InsufficientEntropy`] if fewer than `target_byte_length * 8` bits are given.
pub fn derive(raw_bits: &[bool], target_byte_length: usize) -> Result<SecretSeed> {
    if target_byte_length == 0 {
        return Err(Error::config("seed length must be at least one byte"));
    }
    let needed = target_byte_length
        .checked_mul(8)
        .ok_or_else(|| Error::config("seed length too large"))?;
    if raw_bits.len() < needed {
        return Err(Error::InsufficientEntropy {
            needed,
            available: raw_bits.len(),
        });
    }

    let bytes = raw_bits[..needed]
        .chunks_exact(8)
        .map(|group| group.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
        .collect();
    Ok(SecretSeed(bytes))
}

/// Expands bytes into `n_bits` bits, most significant bit first.
///
/// If `n_bits` exceeds `bytes.len() * 8` the output stops at the end of `bytes`.
#[must_use]
pub fn bits_from_bytes(bytes: &[u8], n_bits: usize) -> Vec<bool> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1))
        .take(n_bits)
        .collect()
}
