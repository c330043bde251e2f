// File:    uri.rs
// Author:  apezoo
// Date:    2026-10-15
//
// Description: Builds and parses the otpauth:// key URIs handed to authenticator apps.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! `otpauth://` key URIs.
//!
//! Format:
//! `otpauth://totp/<issuer>:<account>?secret=<base32>&issuer=<issuer>&algorithm=SHA1&digits=6&period=30[&kem_ct=<base64url>]`
//!
//! The optional `kem_ct` parameter carries the KEM ciphertext produced during
//! provisioning. Authenticator apps ignore unknown parameters.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;
use url::form_urlencoded;

use crate::encoding::{decode_base64_url, decode_seed, encode_base64_url, encode_seed};
use crate::error::{Error, Result};
use crate::seed::SecretSeed;
use crate::totp::{HashAlgorithm, TotpConfig};

const SCHEME: &str = "otpauth";
const KIND: &str = "totp";
const CIPHERTEXT_PARAM: &str = "kem_ct";

/// Characters left as-is in the label.
const LABEL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@');

/// A parsed or to-be-rendered TOTP key URI.
#[derive(Debug, Clone)]
pub struct OtpAuthUri {
    /// Service name shown by the authenticator.
    pub issuer: String,
    /// Account the secret belongs to, usually an e-mail address.
    pub account: String,
    /// Shared secret.
    pub seed: SecretSeed,
    /// Code parameters.
    pub totp: TotpConfig,
    /// KEM ciphertext carried alongside the secret, if any.
    pub kem_ciphertext: Option<Vec<u8>>,
}

impl OtpAuthUri {
    /// A URI without KEM ciphertext.
    pub fn new(
        issuer: impl Into<String>,
        account: impl Into<String>,
        seed: SecretSeed,
        totp: TotpConfig,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            account: account.into(),
            seed,
            totp,
            kem_ciphertext: None,
        }
    }

    /// Attaches a KEM ciphertext.
    #[must_use]
    pub fn with_ciphertext(mut self, ciphertext: Vec<u8>) -> Self {
        self.kem_ciphertext = Some(ciphertext);
        self
    }

    /// Renders the URI.
    #[must_use]
    pub fn encode(&self) -> String {
        let label = format!(
            "{}:{}",
            utf8_percent_encode(&self.issuer, LABEL),
            utf8_percent_encode(&self.account, LABEL)
        );

        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("secret", &encode_seed(&self.seed))
            .append_pair("issuer", &self.issuer)
            .append_pair("algorithm", self.totp.algorithm.uri_name())
            .append_pair("digits", &self.totp.digits.to_string())
            .append_pair("period", &self.totp.step_seconds.to_string());
        if let Some(ciphertext) = &self.kem_ciphertext {
            query.append_pair(CIPHERTEXT_PARAM, &encode_base64_url(ciphertext));
        }

        format!("{SCHEME}://{KIND}/{label}?{}", query.finish())
    }

    /// Parses a URI produced by [`OtpAuthUri::encode`] or by another issuer.
    ///
    /// Missing `algorithm`, `digits` and `period` fall back to the defaults.
    /// The verification window is not part of the URI and is left at its default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] for anything that is not a TOTP key URI
    /// or carries a malformed secret or ciphertext, and
    /// [`Error::InvalidConfiguration`] for unsupported parameters.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|_| Error::InvalidEncoding("otpauth uri"))?;
        if url.scheme() != SCHEME || url.host_str() != Some(KIND) {
            return Err(Error::InvalidEncoding("otpauth uri"));
        }

        // Split before decoding: an encoded `%3A` belongs to the issuer or account.
        let raw_label = url.path().trim_start_matches('/');
        let (label_issuer, account) = match raw_label.split_once(':') {
            Some((issuer, account)) => (
                Some(decode_label_part(issuer)?),
                decode_label_part(account)?.trim().to_string(),
            ),
            None => (None, decode_label_part(raw_label)?),
        };

        let mut seed = None;
        let mut issuer = label_issuer;
        let mut totp = TotpConfig::default();
        let mut kem_ciphertext = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "secret" => seed = Some(decode_seed(&value)?),
                "issuer" => issuer = Some(value.into_owned()),
                "algorithm" => totp.algorithm = HashAlgorithm::from_uri_name(&value)?,
                "digits" => {
                    totp.digits = value
                        .parse()
                        .map_err(|_| Error::config(format!("invalid digits '{value}'")))?;
                }
                "period" => {
                    totp.step_seconds = value
                        .parse()
                        .map_err(|_| Error::config(format!("invalid period '{value}'")))?;
                }
                CIPHERTEXT_PARAM => kem_ciphertext = Some(decode_base64_url(&value)?),
                _ => {}
            }
        }

        Ok(Self {
            issuer: issuer.unwrap_or_default(),
            account,
            seed: seed.ok_or(Error::InvalidEncoding("otpauth secret"))?,
            totp,
            kem_ciphertext,
        })
    }
}

fn decode_label_part(part: &str) -> Result<String> {
    percent_decode_str(part)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::InvalidEncoding("otpauth label"))
}
