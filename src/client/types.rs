//! Dispatcher types: method resolution, response pages and send requests

use crate::error::{Error, Result};
use crate::session::{Fingerprint, Paging};
use crate::types::{params, Params};
use reqwest::Method;
use serde_json::Value;

/// Endpoint that submits a message for sending
pub const SEND_ENDPOINT: &str = "tags/send";

/// Endpoints that take a form body instead of a query string
const WRITE_ENDPOINTS: &[&str] = &[SEND_ENDPOINT];

/// HTTP method for an endpoint
pub fn resolve_method(endpoint: &str) -> Method {
    if WRITE_ENDPOINTS.contains(&endpoint.trim_matches('/')) {
        Method::POST
    } else {
        Method::GET
    }
}

// ============================================================================
// Page
// ============================================================================

/// One successful API response
#[derive(Debug, Clone)]
pub struct Page {
    /// Application status code from the body
    pub code: Option<u16>,
    /// Paging block, for paginated endpoints
    pub paging: Option<Paging>,
    /// Next cursor reported by this response
    pub next: Option<u64>,
    /// Total item count known for the query after this response
    pub total: Option<u64>,
    /// Session this page belongs to
    pub fingerprint: Fingerprint,
    /// Full response body
    pub body: Value,
}

impl Page {
    /// Interpret a response envelope.
    ///
    /// Any `code` whose hundreds digit is 4 or more is an application error,
    /// whatever the HTTP status was.
    pub fn from_body(body: Value, fingerprint: Fingerprint) -> Result<Self> {
        let code = extract_code(&body);

        if let Some(code) = code {
            if code / 100 >= 4 {
                let label = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error");
                return Err(Error::api(code, label, message));
            }
        }

        let paging = match body.get("paging") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<Paging>(raw.clone())
                    .map_err(|e| Error::decode(format!("Invalid paging block: {e}")))?,
            ),
        };

        let next = paging.as_ref().and_then(|p| p.cursors.next);
        let total = paging.as_ref().and_then(|p| p.cursors.total);

        Ok(Self {
            code,
            paging,
            next,
            total,
            fingerprint,
            body,
        })
    }

    /// The `data` member of the body (Null when absent)
    pub fn data(&self) -> &Value {
        self.body.get("data").unwrap_or(&Value::Null)
    }

    /// Next cursor, if the response was paginated
    pub fn next_cursor(&self) -> Option<u64> {
        self.next
    }

    /// Total item count, if known
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Whether the query has pages beyond this one
    pub fn has_more(&self) -> bool {
        match (self.next, self.total) {
            (Some(next), Some(total)) => next < total,
            _ => false,
        }
    }
}

fn extract_code(body: &Value) -> Option<u16> {
    let code = match body.get("code")? {
        Value::Number(n) => n.as_u64().or_else(|| floor_code(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| floor_code(s.parse().ok()?))
        }
        _ => None,
    }?;
    Some(u16::try_from(code).unwrap_or(u16::MAX))
}

/// Fractional codes count by their integer part
fn floor_code(code: f64) -> Option<u64> {
    (code.is_finite() && code >= 0.0).then(|| code.floor() as u64)
}

// ============================================================================
// Send Message
// ============================================================================

/// Parameters of the send-message call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessage {
    /// Sending account address
    pub sender: String,
    /// Base64-encoded RFC 5322 message
    pub raw: String,
    /// Whether opens and clicks are tracked
    pub track: bool,
}

impl SendMessage {
    /// Create a tracked send request
    pub fn new(sender: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            raw: raw.into(),
            track: true,
        }
    }

    /// Enable or disable tracking
    #[must_use]
    pub fn track(mut self, track: bool) -> Self {
        self.track = track;
        self
    }

    /// Request parameters for this call
    pub fn to_params(&self) -> Params {
        params([
            ("sender", self.sender.clone()),
            ("raw", self.raw.clone()),
            ("track", self.track.to_string()),
        ])
    }
}
