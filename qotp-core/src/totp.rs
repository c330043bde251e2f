// File:    totp.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: RFC 6238 time-based one-time passwords and the verification window policy.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Time-based one-time passwords.
//!
//! [`TotpEngine`] computes RFC 6238 codes and verifies submitted codes against
//! a window of adjacent time steps. All parameters are checked once in
//! [`TotpEngine::new`]; computing and verifying never fail.

use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::{Choice, ConstantTimeEq};

use crate::error::{Error, Result};
use crate::seed::SecretSeed;

/// Default time step in seconds.
pub const DEFAULT_STEP_SECONDS: u64 = 30;
/// Default number of code digits.
pub const DEFAULT_DIGITS: u32 = 6;
/// Default number of adjacent steps accepted on each side.
pub const DEFAULT_WINDOW: u32 = 1;
/// Largest accepted window. Each step of window costs two HMACs per verification.
pub const MAX_WINDOW: u32 = 10;

/// Accepted range of code lengths.
const DIGIT_RANGE: std::ops::RangeInclusive<u32> = 6..=8;

/// HMAC hash used by HOTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HashAlgorithm {
    /// HMAC-SHA1, the variant every authenticator app supports.
    #[default]
    Sha1,
    /// HMAC-SHA256.
    Sha256,
    /// HMAC-SHA512.
    Sha512,
}

impl HashAlgorithm {
    /// Name as written in `otpauth://` URIs.
    #[must_use]
    pub const fn uri_name(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// Parses the `otpauth://` URI name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for unknown names.
    pub fn from_uri_name(name: &str) -> Result<Self> {
        [Self::Sha1, Self::Sha256, Self::Sha512]
            .into_iter()
            .find(|alg| alg.uri_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::config(format!("unknown HMAC algorithm '{name}'")))
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri_name())
    }
}

/// TOTP parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotpConfig {
    /// Length of one time step in seconds. Must be positive.
    pub step_seconds: u64,
    /// Number of decimal digits in a code, 6 to 8.
    pub digits: u32,
    /// Adjacent steps accepted before and after the current one.
    pub window: u32,
    /// HMAC hash.
    pub algorithm: HashAlgorithm,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            step_seconds: DEFAULT_STEP_SECONDS,
            digits: DEFAULT_DIGITS,
            window: DEFAULT_WINDOW,
            algorithm: HashAlgorithm::Sha1,
        }
    }
}

/// Computes and verifies codes for a fixed [`TotpConfig`].
#[derive(Debug, Clone, Copy)]
pub struct TotpEngine {
    config: TotpConfig,
}

impl TotpEngine {
    /// Validates `config` and builds an engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `digits` is outside 6..=8,
    /// `step_seconds` is zero or `window` exceeds [`MAX_WINDOW`].
    pub fn new(config: TotpConfig) -> Result<Self> {
        if !DIGIT_RANGE.contains(&config.digits) {
            return Err(Error::config(format!(
                "digits must be between {} and {}, got {}",
                DIGIT_RANGE.start(),
                DIGIT_RANGE.end(),
                config.digits
            )));
        }
        if config.step_seconds == 0 {
            return Err(Error::config("step_seconds must be greater than zero"));
        }
        if config.window > MAX_WINDOW {
            return Err(Error::config(format!(
                "window must be at most {MAX_WINDOW}, got {}",
                config.window
            )));
        }
        Ok(Self { config })
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &TotpConfig {
        &self.config
    }

    /// Time step containing `unix_time`.
    #[must_use]
    pub const fn time_step(&self, unix_time: u64) -> u64 {
        unix_time / self.config.step_seconds
    }

    /// Seconds until the code for `unix_time` rolls over.
    #[must_use]
    pub const fn seconds_remaining(&self, unix_time: u64) -> u64 {
        self.config.step_seconds - unix_time % self.config.step_seconds
    }

    /// Code for the time step containing `unix_time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the HMAC rejects the seed as a key.
    pub fn compute_code(&self, seed: &SecretSeed, unix_time: u64) -> Result<String> {
        hotp(
            self.config.algorithm,
            seed.as_bytes(),
            self.time_step(unix_time),
            self.config.digits,
        )
    }

    /// Checks `submitted_code` against every step in the window around `unix_time`.
    ///
    /// All candidates are computed and compared in constant time; a match in
    /// one step does not end the loop early. Steps before the Unix epoch are
    /// skipped. Malformed codes, and seeds the HMAC rejects, simply do not match.
    #[must_use]
    pub fn verify(&self, seed: &SecretSeed, submitted_code: &str, unix_time: u64) -> bool {
        let digits = self.config.digits as usize;
        if submitted_code.len() != digits || !submitted_code.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }

        let current = self.time_step(unix_time);
        let window = i64::from(self.config.window);
        let mut matched = Choice::from(0);
        for delta in -window..=window {
            let Some(counter) = current.checked_add_signed(delta) else {
                continue;
            };
            if let Ok(candidate) =
                hotp(self.config.algorithm, seed.as_bytes(), counter, self.config.digits)
            {
                matched |= candidate.as_bytes().ct_eq(submitted_code.as_bytes());
            }
        }
        bool::from(matched)
    }

    /// Code for the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Fails if the system clock is set before the Unix epoch.
    pub fn current_code(&self, seed: &SecretSeed) -> Result<String> {
        self.compute_code(seed, unix_now()?)
    }
}

/// RFC 4226 HOTP value for `counter`, zero-padded to `digits`.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if the HMAC rejects `key`.
pub fn hotp(algorithm: HashAlgorithm, key: &[u8], counter: u64, digits: u32) -> Result<String> {
    let message = counter.to_be_bytes();
    let digest = match algorithm {
        HashAlgorithm::Sha1 => hmac_digest::<Hmac<Sha1>>(algorithm, key, &message)?,
        HashAlgorithm::Sha256 => hmac_digest::<Hmac<Sha256>>(algorithm, key, &message)?,
        HashAlgorithm::Sha512 => hmac_digest::<Hmac<Sha512>>(algorithm, key, &message)?,
    };

    // Dynamic truncation.
    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = u64::from(binary) % 10u64.saturating_pow(digits);
    Ok(format!("{code:0width$}", width = digits as usize))
}

fn hmac_digest<M: Mac + KeyInit>(
    algorithm: HashAlgorithm,
    key: &[u8],
    message: &[u8],
) -> Result<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(key)
        .map_err(|e| Error::config(format!("HMAC-{algorithm} rejected the key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Seconds since the Unix epoch.
///
/// # Errors
///
/// Returns [`Error::InvalidConfiguration`] if the system clock is before the epoch.
pub fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| Error::config("system clock is set before the Unix epoch"))
}
