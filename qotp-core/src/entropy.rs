// File:    entropy.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: Sources of raw random bits used to derive new OTP seeds.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Entropy sources.
//!
//! An [`EntropySource`] may block while sampling. Callers that need an upper
//! bound on that wait wrap the source in a [`TimedEntropy`].

use rand::{TryRngCore, rngs::OsRng};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::seed::bits_from_bytes;

/// Supplies unbiased random bits.
pub trait EntropySource: Send + Sync {
    /// Returns exactly `n_bits` random bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntropyUnavailable`] if no randomness can be produced.
    fn sample(&self, n_bits: usize) -> Result<Vec<bool>>;
}

impl<T: EntropySource + ?Sized> EntropySource for Box<T> {
    fn sample(&self, n_bits: usize) -> Result<Vec<bool>> {
        (**self).sample(n_bits)
    }
}

impl<T: EntropySource + ?Sized> EntropySource for Arc<T> {
    fn sample(&self, n_bits: usize) -> Result<Vec<bool>> {
        (**self).sample(n_bits)
    }
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn sample(&self, n_bits: usize) -> Result<Vec<bool>> {
        let mut buffer = vec![0u8; n_bits.div_ceil(8)];
        OsRng
            .try_fill_bytes(&mut buffer)
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;
        Ok(bits_from_bytes(&buffer, n_bits))
    }
}

/// Bounds how long a sample may take.
///
/// The inner source runs on a helper thread. If it does not answer before the
/// deadline the call fails with [`Error::EntropyTimeout`] and whatever the
/// source produces afterwards is dropped unread.
#[derive(Debug)]
pub struct TimedEntropy<E> {
    inner: Arc<E>,
    timeout: Duration,
}

impl<E> Clone for TimedEntropy<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<E: EntropySource + 'static> TimedEntropy<E> {
    /// Wraps `inner` with a per-sample deadline.
    pub fn new(inner: E, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    /// The configured deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<E: EntropySource + 'static> EntropySource for TimedEntropy<E> {
    fn sample(&self, n_bits: usize) -> Result<Vec<bool>> {
        let (tx, rx) = mpsc::sync_channel(1);
        let source = Arc::clone(&self.inner);
        thread::Builder::new()
            .name("entropy-sample".into())
            .spawn(move || {
                // The receiver is gone once the deadline has passed.
                let _ = tx.send(source.sample(n_bits));
            })
            .map_err(|e| Error::EntropyUnavailable(e.to_string()))?;

        match rx.recv_timeout(self.timeout) {
            Ok(sample) => sample,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("Entropy sample of {n_bits} bits timed out after {:?}", self.timeout);
                Err(Error::EntropyTimeout(self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Error::EntropyUnavailable(
                "entropy sampler stopped without a result".into(),
            )),
        }
    }
}
