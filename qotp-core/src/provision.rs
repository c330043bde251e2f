// File:    provision.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: Orchestrates seed derivation and KEM encapsulation into a provisioning bundle.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Secret provisioning.
//!
//! A [`SecretProvisioner`] owns an entropy source and a KEM transport. Each
//! call to [`SecretProvisioner::provision`] derives a fresh seed, runs a KEM
//! exchange, checks that decapsulation recovers the same shared secret and
//! only then hands out a [`ProvisioningBundle`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::encoding::{decode_base64, decode_seed, encode_base64, encode_seed};
use crate::entropy::EntropySource;
use crate::error::{Error, Result};
use crate::kem::{self, KemTransport, PrivateKey, SharedSecret};
use crate::seed::{self, SecretSeed};
use crate::totp::TotpConfig;
use crate::uri::OtpAuthUri;

/// Smallest seed accepted by a provisioner (128 bits, the RFC 4226 floor).
pub const MIN_SEED_BYTES: usize = 16;
/// Seed length used when none is configured (160 bits).
pub const DEFAULT_SEED_BYTES: usize = 20;
/// Largest seed accepted by a provisioner.
pub const MAX_SEED_BYTES: usize = 128;

/// What the end-user device receives. Immutable once created.
#[derive(Debug, Clone)]
pub struct ProvisioningBundle {
    otp_seed: SecretSeed,
    ciphertext: Vec<u8>,
}

impl ProvisioningBundle {
    /// The OTP seed.
    #[must_use]
    pub const fn otp_seed(&self) -> &SecretSeed {
        &self.otp_seed
    }

    /// The KEM ciphertext.
    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Text form of the bundle: base32 seed and base64 ciphertext.
    #[must_use]
    pub fn encode(&self) -> EncodedBundle {
        EncodedBundle {
            otp_seed: encode_seed(&self.otp_seed),
            ciphertext: encode_base64(&self.ciphertext),
        }
    }

    /// The `otpauth://` transport string for this bundle.
    #[must_use]
    pub fn otpauth_uri(
        &self,
        issuer: &str,
        account: &str,
        totp: TotpConfig,
        include_ciphertext: bool,
    ) -> String {
        let uri = OtpAuthUri::new(issuer, account, self.otp_seed.clone(), totp);
        let uri = if include_ciphertext {
            uri.with_ciphertext(self.ciphertext.clone())
        } else {
            uri
        };
        uri.encode()
    }
}

/// [`ProvisioningBundle`] rendered for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBundle {
    /// Base32 seed, no padding.
    pub otp_seed: String,
    /// Base64 ciphertext.
    pub ciphertext: String,
}

impl EncodedBundle {
    /// Decodes back into a bundle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if either field fails to decode.
    pub fn decode(&self) -> Result<ProvisioningBundle> {
        Ok(ProvisioningBundle {
            otp_seed: decode_seed(&self.otp_seed)?,
            ciphertext: decode_base64(&self.ciphertext)?,
        })
    }
}

/// Material the provisioning side keeps for the later verification step.
#[derive(Debug, Clone)]
pub struct RetainedSecrets {
    /// Private key matching the ciphertext in the bundle.
    pub private_key: PrivateKey,
    /// Shared secret established by the exchange.
    pub shared_secret: SharedSecret,
}

/// Result of one enrollment.
#[derive(Debug, Clone)]
pub struct Provisioned {
    /// Enrollment identifier, for whoever stores the retained secrets.
    pub id: Uuid,
    /// KEM used for the exchange.
    pub algorithm: &'static str,
    /// Log-safe fingerprint of the public key.
    pub public_key_fingerprint: String,
    /// Hand-off for the user's device.
    pub bundle: ProvisioningBundle,
    /// Server-side secrets. Never sent to the client.
    pub retained: RetainedSecrets,
}

/// Produces provisioning bundles from injected entropy and KEM components.
#[derive(Debug)]
pub struct SecretProvisioner<E, K> {
    entropy: E,
    kem: K,
    seed_bytes: usize,
}

impl<E: EntropySource, K: KemTransport> SecretProvisioner<E, K> {
    /// Creates a provisioner producing seeds of `seed_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `seed_bytes` is outside
    /// [`MIN_SEED_BYTES`]..=[`MAX_SEED_BYTES`].
    pub fn new(entropy: E, kem: K, seed_bytes: usize) -> Result<Self> {
        if !(MIN_SEED_BYTES..=MAX_SEED_BYTES).contains(&seed_bytes) {
            return Err(Error::config(format!(
                "seed length must be between {MIN_SEED_BYTES} and {MAX_SEED_BYTES} bytes, got {seed_bytes}"
            )));
        }
        Ok(Self {
            entropy,
            kem,
            seed_bytes,
        })
    }

    /// Configured seed length in bytes.
    #[must_use]
    pub const fn seed_bytes(&self) -> usize {
        self.seed_bytes
    }

    /// The KEM transport in use.
    #[must_use]
    pub const fn kem(&self) -> &K {
        &self.kem
    }

    /// Runs one enrollment.
    ///
    /// # Errors
    ///
    /// Propagates entropy, seed and KEM errors. Returns
    /// [`Error::SharedSecretMismatch`] if decapsulation does not reproduce the
    /// encapsulated secret; no bundle is produced in that case.
    pub fn provision(&self) -> Result<Provisioned> {
        let mut raw_bits = self.entropy.sample(self.seed_bytes * 8)?;
        let otp_seed = seed::derive(&raw_bits, self.seed_bytes);
        raw_bits.zeroize();
        let otp_seed = otp_seed?;

        let keypair = self.kem.generate_keypair()?;
        let fingerprint = kem::fingerprint(&keypair.public_key);
        let encapsulated = self.kem.encapsulate(&keypair.public_key)?;

        let recovered = self
            .kem
            .decapsulate(keypair.private_key.as_bytes(), &encapsulated.ciphertext)?;
        if let Err(e) = kem::ensure_match(&encapsulated.shared_secret, &recovered) {
            log::error!(
                "KEM self-check failed for {} (public key {fingerprint})",
                self.kem.algorithm()
            );
            return Err(e);
        }

        let provisioned = Provisioned {
            id: Uuid::new_v4(),
            algorithm: self.kem.algorithm(),
            public_key_fingerprint: fingerprint,
            bundle: ProvisioningBundle {
                otp_seed,
                ciphertext: encapsulated.ciphertext,
            },
            retained: RetainedSecrets {
                private_key: keypair.private_key,
                shared_secret: encapsulated.shared_secret,
            },
        };
        log::info!(
            "Provisioned enrollment {} with {} (public key {}, {}-byte seed, {}-byte ciphertext)",
            provisioned.id,
            provisioned.algorithm,
            provisioned.public_key_fingerprint,
            self.seed_bytes,
            provisioned.bundle.ciphertext.len()
        );
        Ok(provisioned)
    }
}
