// File:    encoding.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: Text encodings used when seeds and ciphertexts leave the process.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Transport-safe text encodings.
//!
//! Seeds use RFC 4648 base32 without padding, the form authenticator apps
//! expect in `otpauth://` URIs. Ciphertexts and other binary blobs use
//! standard padded base64, or the URL-safe alphabet when they travel inside
//! a query string.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use data_encoding::BASE32_NOPAD;

use crate::error::{Error, Result};
use crate::seed::SecretSeed;

/// Encodes a seed as unpadded upper-case base32.
#[must_use]
pub fn encode_seed(seed: &SecretSeed) -> String {
    BASE32_NOPAD.encode(seed.as_bytes())
}

/// Decodes a base32 seed.
///
/// Accepts lower-case letters, embedded spaces or dashes (as shown by some
/// authenticator apps) and trailing `=` padding.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the text is not base32, or
/// [`Error::InvalidConfiguration`] if it decodes to nothing.
pub fn decode_seed(text: &str) -> Result<SecretSeed> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let bytes = BASE32_NOPAD
        .decode(normalized.trim_end_matches('=').as_bytes())
        .map_err(|_| Error::InvalidEncoding("base32"))?;
    SecretSeed::from_bytes(bytes)
}

/// Encodes bytes as standard padded base64.
#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes standard padded base64.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the text is not valid base64.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|_| Error::InvalidEncoding("base64"))
}

/// Encodes bytes as unpadded URL-safe base64.
#[must_use]
pub fn encode_base64_url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes unpadded URL-safe base64.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the text is not valid URL-safe base64.
pub fn decode_base64_url(text: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text.trim())
        .map_err(|_| Error::InvalidEncoding("base64url"))
}
