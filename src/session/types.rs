//! Session cache types

use crate::auth::canonical_query;
use crate::types::Params;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sha1::{Digest, Sha1};
use std::fmt;
use std::time::{Duration, Instant};

/// Query parameter carrying the pagination cursor
pub const CURSOR_PARAM: &str = "cursor";

/// Query parameter carrying the known total item count
pub const TOTAL_PARAM: &str = "total";

/// Query parameter selecting the response format
pub const RETURN_FORMAT_PARAM: &str = "rtn";

/// Response format requested when the caller does not pick one
pub const DEFAULT_RETURN_FORMAT: &str = "json";

/// Normalize caller parameters into the canonical set stored on a session.
///
/// Adds `rtn=json` unless a format was given and drops the session-managed
/// `cursor` and `total` keys.
pub fn canonical_params(params: &Params) -> Params {
    let mut canonical: Params = params
        .iter()
        .filter(|(k, _)| k.as_str() != CURSOR_PARAM && k.as_str() != TOTAL_PARAM)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    canonical
        .entry(RETURN_FORMAT_PARAM.to_string())
        .or_insert_with(|| DEFAULT_RETURN_FORMAT.to_string());

    canonical
}

// ============================================================================
// Fingerprint
// ============================================================================

/// Deterministic key for one logical paginated query
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint an endpoint and an already canonical parameter set
    pub fn new(endpoint: &str, canonical: &Params) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(endpoint.as_bytes());
        hasher.update(b"?");
        hasher.update(canonical_query(canonical).as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Fingerprint an endpoint and raw caller parameters
    pub fn of(endpoint: &str, params: &Params) -> Self {
        Self::new(endpoint, &canonical_params(params))
    }

    /// Hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Paging
// ============================================================================

/// The `paging` block of an API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Cursor positions
    #[serde(default)]
    pub cursors: Cursors,
}

/// Cursor positions reported by the API.
///
/// Values may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    /// Cursor of the next page
    #[serde(default, deserialize_with = "lenient_u64")]
    pub next: Option<u64>,
    /// Cursor of the previous page
    #[serde(default, deserialize_with = "lenient_u64")]
    pub prev: Option<u64>,
    /// Total number of items, when the API reports it
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total: Option<u64>,
}

impl Paging {
    /// Build a paging block from raw cursor values
    pub fn new(next: u64, prev: u64, total: Option<u64>) -> Self {
        Self {
            cursors: Cursors {
                next: Some(next),
                prev: Some(prev),
                total,
            },
        }
    }

    /// Whether another page exists past this one
    pub fn has_more(&self) -> bool {
        match (self.cursors.next, self.cursors.total) {
            (Some(next), Some(total)) => next < total,
            _ => false,
        }
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ============================================================================
// Session Entry
// ============================================================================

/// Pagination state for one logical query
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Cache key
    pub fingerprint: Fingerprint,
    /// Endpoint path (e.g. `tags`)
    pub endpoint: String,
    /// Full request URL without query string
    pub url: String,
    /// Canonical parameters, including the return format default
    pub params: Params,
    /// Cursor to request next
    pub next: u64,
    /// Cursor of the previous page
    pub prev: u64,
    /// Total item count, once the API has reported it
    pub total: Option<u64>,
    /// Last computed authorization token
    pub signature: Option<String>,
    /// When the entry was created
    pub created_at: Instant,
}

impl SessionEntry {
    /// Create a fresh entry positioned at `start_cursor`
    pub fn new(
        fingerprint: Fingerprint,
        endpoint: impl Into<String>,
        url: impl Into<String>,
        params: Params,
        start_cursor: u64,
    ) -> Self {
        Self {
            fingerprint,
            endpoint: endpoint.into(),
            url: url.into(),
            params,
            next: start_cursor,
            prev: 0,
            total: None,
            signature: None,
            created_at: Instant::now(),
        }
    }

    /// Parameters to send and sign: canonical params plus cursor and total
    pub fn effective_params(&self) -> Params {
        let mut params = self.params.clone();
        if let Some(total) = self.total {
            params.insert(TOTAL_PARAM.to_string(), total.to_string());
        }
        params.insert(CURSOR_PARAM.to_string(), self.next.to_string());
        params
    }

    /// Record the cursors of a response.
    ///
    /// `total` is only replaced when the response carries one.
    pub fn apply_paging(&mut self, paging: &Paging) {
        if let Some(next) = paging.cursors.next {
            self.next = next;
        }
        if let Some(prev) = paging.cursors.prev {
            self.prev = prev;
        }
        if let Some(total) = paging.cursors.total {
            self.total = Some(total);
        }
    }

    /// Whether the stored cursor is still short of the stored total
    pub fn has_more(&self) -> bool {
        self.total.is_some_and(|total| self.next < total)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Bounds on the session cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Entries idle longer than this are dropped (None = never)
    pub ttl: Option<Duration>,
    /// Maximum number of entries kept
    pub max_entries: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            ttl: Some(Duration::from_secs(3600)),
            max_entries: 1024,
        }
    }
}

impl SessionPolicy {
    /// Create a policy
    pub fn new(ttl: Option<Duration>, max_entries: usize) -> Self {
        Self { ttl, max_entries }
    }

    /// A policy that never evicts
    pub fn unbounded() -> Self {
        Self {
            ttl: None,
            max_entries: usize::MAX,
        }
    }
}
