// File:    error.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: The error taxonomy shared by every provisioning and verification component.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Typed errors for the core library.
//!
//! No variant ever carries seed, key or shared-secret bytes. Messages only
//! mention sizes, algorithm names and configuration values.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer random bits were supplied than the requested seed needs.
    #[error("insufficient entropy: need {needed} bits, got {available}")]
    InsufficientEntropy {
        /// Bits required for the requested seed length.
        needed: usize,
        /// Bits actually supplied.
        available: usize,
    },

    /// The entropy source could not produce any randomness.
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// The entropy source did not answer before the deadline.
    #[error("entropy source timed out after {0:?}")]
    EntropyTimeout(Duration),

    /// Key pair generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// The public key failed the algorithm's format validation.
    #[error("invalid public key for {algorithm}")]
    InvalidPublicKey {
        /// Name of the KEM that rejected the key.
        algorithm: &'static str,
    },

    /// The private key or ciphertext could not be used for decapsulation.
    #[error("decapsulation failed for {algorithm}")]
    DecapsulationFailure {
        /// Name of the KEM that rejected the input.
        algorithm: &'static str,
    },

    /// Encapsulated and decapsulated shared secrets differ.
    #[error("shared secret mismatch after decapsulation")]
    SharedSecretMismatch,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A text encoding could not be decoded.
    #[error("invalid {0} encoding")]
    InvalidEncoding(&'static str),
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
