// File:    lib.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: The main library crate for qotp-core, orchestrating seed derivation, KEM transport and TOTP verification.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # QOTP Core Library
//!
//! This library provisions time-based one-time-password secrets, protects
//! their hand-off with a post-quantum key-encapsulation mechanism and verifies
//! the codes users submit.
//!
//! ```no_run
//! use qotp_core::{Settings, unix_now};
//!
//! # fn main() -> qotp_core::Result<()> {
//! let settings = Settings::default();
//! let provisioned = settings.provisioner()?.provision()?;
//! let engine = settings.totp_engine()?;
//!
//! let seed = provisioned.bundle.otp_seed();
//! let now = unix_now()?;
//! assert!(engine.verify(seed, &engine.compute_code(seed, now)?, now));
//! # Ok(())
//! # }
//! ```

/// Text encodings for seeds and ciphertexts.
pub mod encoding;
/// Sources of raw random bits.
pub mod entropy;
/// Error taxonomy.
pub mod error;
/// Post-quantum key encapsulation.
pub mod kem;
/// Enrollment orchestration.
pub mod provision;
/// Secret seed derivation.
pub mod seed;
/// Runtime configuration.
pub mod settings;
/// Time-based one-time passwords.
pub mod totp;
/// `otpauth://` key URIs.
pub mod uri;

pub use error::{Error, Result};
pub use provision::{Provisioned, ProvisioningBundle, SecretProvisioner};
pub use seed::SecretSeed;
pub use settings::Settings;
pub use totp::{TotpConfig, TotpEngine, unix_now};
