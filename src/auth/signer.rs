//! HMAC-SHA1 request signer

use crate::error::{Error, Result};
use crate::types::{Credentials, Params};
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Serialize parameters into the canonical query string.
///
/// Keys come out in sorted order and values are form-urlencoded, so two
/// parameter sets with the same pairs always produce the same string.
pub fn canonical_query(params: &Params) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// Computes authorization tokens from the client credentials
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    /// Create a signer for the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Sign a parameter set
    pub fn sign(&self, params: &Params) -> Result<String> {
        self.sign_query(&canonical_query(params))
    }

    /// Sign an already canonical query string
    pub fn sign_query(&self, query: &str) -> Result<String> {
        let digest = self.hmac_hex(query)?;
        let token = format!("{}:{digest}", self.credentials.id());
        Ok(base64::engine::general_purpose::STANDARD.encode(token))
    }

    /// Hex-encoded HMAC-SHA1 of `message` under the access key
    pub fn hmac_hex(&self, message: &str) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(self.credentials.key().as_bytes())
            .map_err(|e| Error::signature(format!("Failed to create HMAC: {e}")))?;

        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// The auth ID this signer embeds in tokens
    pub fn auth_id(&self) -> &str {
        self.credentials.id()
    }
}
