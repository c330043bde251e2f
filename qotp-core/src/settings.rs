use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::entropy::{OsEntropy, TimedEntropy};
use crate::error::{Error, Result};
use crate::kem::{KemAlgorithm, KemTransport};
use crate::provision::{DEFAULT_SEED_BYTES, SecretProvisioner};
use crate::totp::{TotpConfig, TotpEngine};

/// Default issuer shown by authenticator apps.
pub const DEFAULT_ISSUER: &str = "QOTP";
/// Default entropy deadline in milliseconds.
pub const DEFAULT_ENTROPY_TIMEOUT_MS: u64 = 5_000;

/// Provisioner built from [`Settings`].
pub type DefaultProvisioner = SecretProvisioner<TimedEntropy<OsEntropy>, Box<dyn KemTransport>>;

/// Runtime configuration shared by the CLI and the web server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Issuer written into `otpauth://` URIs.
    pub issuer: String,
    /// Length of newly provisioned seeds in bytes.
    pub seed_bytes: usize,
    /// KEM used to protect the hand-off.
    pub kem: KemAlgorithm,
    /// Upper bound on a single entropy sample, in milliseconds.
    pub entropy_timeout_ms: u64,
    /// Whether `otpauth://` URIs carry the KEM ciphertext.
    pub embed_ciphertext: bool,
    /// Code parameters.
    pub totp: TotpConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            seed_bytes: DEFAULT_SEED_BYTES,
            kem: KemAlgorithm::default(),
            entropy_timeout_ms: DEFAULT_ENTROPY_TIMEOUT_MS,
            embed_ciphertext: true,
            totp: TotpConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Loads `path` if given, otherwise returns the defaults.
    ///
    /// # Errors
    ///
    /// See [`Settings::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Writes the settings as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| Error::config(format!("cannot serialize settings: {e}")))?;
        fs::write(path, text)
            .map_err(|e| Error::config(format!("cannot write {}: {e}", path.display())))
    }

    /// Entropy deadline as a [`Duration`].
    #[must_use]
    pub const fn entropy_timeout(&self) -> Duration {
        Duration::from_millis(self.entropy_timeout_ms)
    }

    /// Checks every value by building the components that depend on it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.issuer.trim().is_empty() {
            return Err(Error::config("issuer must not be empty"));
        }
        if self.entropy_timeout_ms == 0 {
            return Err(Error::config("entropy_timeout_ms must be greater than zero"));
        }
        self.totp_engine()?;
        self.provisioner()?;
        Ok(())
    }

    /// Builds the TOTP engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for out-of-range code parameters.
    pub fn totp_engine(&self) -> Result<TotpEngine> {
        TotpEngine::new(self.totp)
    }

    /// Builds a provisioner over the OS entropy source and the configured KEM.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an out-of-range seed length.
    pub fn provisioner(&self) -> Result<DefaultProvisioner> {
        let entropy = TimedEntropy::new(OsEntropy, self.entropy_timeout());
        SecretProvisioner::new(entropy, self.kem.transport(), self.seed_bytes)
    }
}
