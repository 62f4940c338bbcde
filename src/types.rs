//! Common types used throughout the client
//!
//! Shared type aliases, the API credentials and per-call request options.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Request parameters.
///
/// A `BTreeMap` keeps keys sorted, so two parameter sets with the same pairs
/// always iterate, serialize and fingerprint identically.
pub type Params = BTreeMap<String, String>;

/// Build [`Params`] from any sequence of key/value pairs
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// ============================================================================
// Credentials
// ============================================================================

/// Environment variable holding the auth ID
pub const AUTH_ID_ENV: &str = "BTAG_AUTH_ID";

/// Environment variable holding the access key
pub const ACCESS_KEY_ENV: &str = "BTAG_ACCESS_KEY";

/// API credentials: the public auth ID and the secret access key
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    id: String,
    key: String,
}

impl Credentials {
    /// Create credentials, rejecting empty values
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let key = key.into();

        if id.trim().is_empty() {
            return Err(Error::missing_credential("auth ID"));
        }
        if key.trim().is_empty() {
            return Err(Error::missing_credential("access key"));
        }

        Ok(Self { id, key })
    }

    /// Read credentials from `BTAG_AUTH_ID` and `BTAG_ACCESS_KEY`
    pub fn from_env() -> Result<Self> {
        let id = std::env::var(AUTH_ID_ENV).unwrap_or_default();
        let key = std::env::var(ACCESS_KEY_ENV).unwrap_or_default();
        Self::new(id, key)
    }

    /// The public auth ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The secret access key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("key", &"***")
            .finish()
    }
}

// ============================================================================
// Request Options
// ============================================================================

/// Per-call options for a request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Keep fetching pages until the cursor reaches the total
    pub get_all_results: bool,
    /// Stops a running all-pages fetch between pages
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    /// Options for a single-page request
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that follow pagination to the last page
    pub fn all_results() -> Self {
        Self {
            get_all_results: true,
            cancel: None,
        }
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether the attached token (if any) has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}
