// File:    kem/mod.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: Key-encapsulation transport used to protect the OTP seed hand-off.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Post-quantum key encapsulation.
//!
//! [`KemTransport`] works on plain byte slices so that callers never depend on
//! algorithm-specific key or ciphertext sizes.
//!
//! # Decapsulation policy
//!
//! Implicit rejection. A private key or ciphertext of the wrong length fails
//! with [`Error::DecapsulationFailure`], but a well-formed ciphertext that does
//! not belong to the key decapsulates to a deterministic pseudo-random secret
//! (NTRU-HRSS-701). Callers detect that case by comparing secrets, see
//! [`KemTransport::self_test`] and [`crate::provision::SecretProvisioner`].
//! Provisioning only ever decapsulates its own ciphertexts, so the
//! HQC-128 bindings are never handed a foreign one.

mod hqc;
mod ntru;

pub use hqc::Hqc128;
pub use ntru::NtruHrss701;

use rand::{TryRngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// A KEM private key. Zeroized on drop and never printed.
#[derive(Clone)]
pub struct PrivateKey(Zeroizing<Vec<u8>>);

impl PrivateKey {
    /// Wraps raw private key bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw private key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey([REDACTED; {}])", self.0.len())
    }
}

/// A shared secret established by encapsulation or decapsulation.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Wraps raw shared secret bytes.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Raw shared secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for SharedSecret {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.as_slice().ct_eq(other.0.as_slice())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret([REDACTED; {}])", self.0.len())
    }
}

/// A freshly generated key pair. The private half stays with the verifier.
#[derive(Debug, Clone)]
pub struct KemKeyPair {
    /// Public (encapsulation) key.
    pub public_key: Vec<u8>,
    /// Private (decapsulation) key.
    pub private_key: PrivateKey,
}

/// Output of a single encapsulation.
#[derive(Debug, Clone)]
pub struct EncapsulationResult {
    /// Ciphertext to send to the private key holder.
    pub ciphertext: Vec<u8>,
    /// Secret the encapsulating side now shares with the key holder.
    pub shared_secret: SharedSecret,
}

/// A key-encapsulation mechanism over opaque byte strings.
pub trait KemTransport: Send + Sync {
    /// Human-readable algorithm name.
    fn algorithm(&self) -> &'static str;

    /// Generates a new key pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`] when the system cannot supply randomness.
    fn generate_keypair(&self) -> Result<KemKeyPair>;

    /// Encapsulates a fresh shared secret against `public_key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPublicKey`] if the key is not well formed.
    fn encapsulate(&self, public_key: &[u8]) -> Result<EncapsulationResult>;

    /// Recovers the shared secret from `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecapsulationFailure`] if the key or ciphertext is malformed.
    fn decapsulate(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret>;

    /// Runs a full keypair, encapsulate, decapsulate cycle and checks that
    /// both sides agree.
    ///
    /// # Errors
    ///
    /// Propagates any KEM error and returns [`Error::SharedSecretMismatch`]
    /// if the secrets differ.
    fn self_test(&self) -> Result<()> {
        let keypair = self.generate_keypair()?;
        let encapsulated = self.encapsulate(&keypair.public_key)?;
        let recovered =
            self.decapsulate(keypair.private_key.as_bytes(), &encapsulated.ciphertext)?;
        ensure_match(&encapsulated.shared_secret, &recovered)
    }
}

impl<T: KemTransport + ?Sized> KemTransport for Box<T> {
    fn algorithm(&self) -> &'static str {
        (**self).algorithm()
    }
    fn generate_keypair(&self) -> Result<KemKeyPair> {
        (**self).generate_keypair()
    }
    fn encapsulate(&self, public_key: &[u8]) -> Result<EncapsulationResult> {
        (**self).encapsulate(public_key)
    }
    fn decapsulate(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret> {
        (**self).decapsulate(private_key, ciphertext)
    }
}

impl<T: KemTransport + ?Sized> KemTransport for Arc<T> {
    fn algorithm(&self) -> &'static str {
        (**self).algorithm()
    }
    fn generate_keypair(&self) -> Result<KemKeyPair> {
        (**self).generate_keypair()
    }
    fn encapsulate(&self, public_key: &[u8]) -> Result<EncapsulationResult> {
        (**self).encapsulate(public_key)
    }
    fn decapsulate(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret> {
        (**self).decapsulate(private_key, ciphertext)
    }
}

/// Compares two shared secrets in constant time.
///
/// # Errors
///
/// Returns [`Error::SharedSecretMismatch`] if they differ.
pub fn ensure_match(encapsulated: &SharedSecret, decapsulated: &SharedSecret) -> Result<()> {
    if bool::from(encapsulated.ct_eq(decapsulated)) {
        Ok(())
    } else {
        Err(Error::SharedSecretMismatch)
    }
}

/// Short, log-safe identifier for a public key: the first 8 bytes of its SHA-256.
#[must_use]
pub fn fingerprint(public_key: &[u8]) -> String {
    let digest = Sha256::digest(public_key);
    data_encoding::HEXLOWER.encode(&digest[..8])
}

/// Checks the OS generator before handing control to a KEM whose own
/// randomness source cannot report failure.
fn check_os_entropy(algorithm: &'static str) -> Result<()> {
    let mut sample = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut sample)
        .map_err(|e| Error::KeyGeneration(format!("{algorithm}: {e}")))
}

/// Selects one of the bundled KEM implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KemAlgorithm {
    /// Code-based HQC-128.
    #[default]
    #[serde(rename = "hqc-128")]
    Hqc128,
    /// Lattice-based NTRU-HRSS-701.
    #[serde(rename = "ntru-hrss-701")]
    NtruHrss701,
}

impl KemAlgorithm {
    /// Every bundled algorithm.
    pub const ALL: [Self; 2] = [Self::Hqc128, Self::NtruHrss701];

    /// Canonical name, as used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hqc128 => "hqc-128",
            Self::NtruHrss701 => "ntru-hrss-701",
        }
    }

    /// Builds the transport for this algorithm.
    #[must_use]
    pub fn transport(self) -> Box<dyn KemTransport> {
        match self {
            Self::Hqc128 => Box::new(Hqc128),
            Self::NtruHrss701 => Box::new(NtruHrss701),
        }
    }
}

impl fmt::Display for KemAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KemAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::config(format!("unknown KEM algorithm '{s}'")))
    }
}
