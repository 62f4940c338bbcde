//! Session cache
//!
//! Tracks pagination state per logical query. A query is identified by its
//! [`Fingerprint`]: a hash of the endpoint and the canonical parameter set, so
//! the same parameters in any order land on the same entry.
//!
//! # Overview
//!
//! - `SessionCache::resolve` creates an entry on first use and returns the
//!   same shared entry for every later call with that fingerprint
//! - `SessionCache::apply_paging` records the cursors from a response
//! - `SessionPolicy` bounds the cache by idle time and entry count

mod cache;
mod types;

pub use cache::{SessionCache, SharedSession};
pub use types::{
    canonical_params, Cursors, Fingerprint, Paging, SessionEntry, SessionPolicy,
    CURSOR_PARAM, DEFAULT_RETURN_FORMAT, RETURN_FORMAT_PARAM, TOTAL_PARAM,
};
