// File:    kem/ntru.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: NTRU-HRSS-701 lattice KEM backed by the PQClean bindings.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

use pqcrypto_ntru::ntruhrss701;
use pqcrypto_traits::kem::{Ciphertext as _, PublicKey as _, SecretKey as _, SharedSecret as _};

use super::{EncapsulationResult, KemKeyPair, KemTransport, PrivateKey, SharedSecret};
use crate::error::{Error, Result};

const NAME: &str = "ntru-hrss-701";

/// NTRU-HRSS-701, a lattice KEM with much smaller keys than HQC.
#[derive(Debug, Clone, Copy, Default)]
pub struct NtruHrss701;

impl KemTransport for NtruHrss701 {
    fn algorithm(&self) -> &'static str {
        NAME
    }

    fn generate_keypair(&self) -> Result<KemKeyPair> {
        super::check_os_entropy(NAME)?;
        let (pk, sk) = ntruhrss701::keypair();
        Ok(KemKeyPair {
            public_key: pk.as_bytes().to_vec(),
            private_key: PrivateKey::from_bytes(sk.as_bytes().to_vec()),
        })
    }

    fn encapsulate(&self, public_key: &[u8]) -> Result<EncapsulationResult> {
        let pk = ntruhrss701::PublicKey::from_bytes(public_key)
            .map_err(|_| Error::InvalidPublicKey { algorithm: NAME })?;
        let (ss, ct) = ntruhrss701::encapsulate(&pk);
        Ok(EncapsulationResult {
            ciphertext: ct.as_bytes().to_vec(),
            shared_secret: SharedSecret::from_bytes(ss.as_bytes().to_vec()),
        })
    }

    fn decapsulate(&self, private_key: &[u8], ciphertext: &[u8]) -> Result<SharedSecret> {
        let sk = ntruhrss701::SecretKey::from_bytes(private_key)
            .map_err(|_| Error::DecapsulationFailure { algorithm: NAME })?;
        let ct = ntruhrss701::Ciphertext::from_bytes(ciphertext)
            .map_err(|_| Error::DecapsulationFailure { algorithm: NAME })?;
        let ss = ntruhrss701::decapsulate(&ct, &sk);
        Ok(SharedSecret::from_bytes(ss.as_bytes().to_vec()))
    }
}
