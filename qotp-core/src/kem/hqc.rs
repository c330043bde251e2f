// File:    kem/hqc.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: HQC-128 code-based KEM backed by the PQClean bindings.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use pqcrypto_hqc::hqc128;
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};

use super::{EncapsulationResult, KemKeyPair, KemTransport, PrivateKey, SharedSecret};
use crate::error::{Error, Result};

const NAME: &str = "hqc-128";

/// HQC-128, a code-based KEM. The default transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hqc128;

impl KemTransport for Hqc128 {
    fn algorithm(&self) -> &'static str {
        NAME
    }

    fn generate_keypair(&self) -> Result<KemKeyPair> {
        super::check_os_entropy(NAME)?;
        let (pk, sk) = hqc128::keypair();
        Ok(KemKeyPair {
            public_key: pk.as_bytes().to_vec(),
            private_key: PrivateKey::from_bytes(sk.as_bytes().to_vec()),
        })
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<EncapsulationResult> {
        let pk = hqc128::PublicKey::from_bytes(public_key)
            .map_err(|_| Error::InvalidPublicKey { algorithm: NAME })?;
        let (ss, ct) = hqc128::encapsulate(&pk);
        Ok(EncapsulationResult {
            ciphertext: ct.as_bytes().to_vec(),
            shared_secret: SharedSecret::from_bytes(ss.as_bytes().to_vec()),
        })
    }

    fn decapsulate(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret> {
        let sk = hqc128::SecretKey::from_bytes(private_key)
            .map_err(|_| Error::DecapsulationFailure { algorithm: NAME })?;
        let ct = hqc128::Ciphertext::from_bytes(ciphertext)
            .map_err(|_| Error::DecapsulationFailure { algorithm: NAME })?;
        let ss = hqc128::decapsulate(&ct, &sk);
        Ok(SharedSecret::from_bytes(ss.as_bytes().to_vec()))
    }
}
