//! Instance-owned session store

use super::types::{
    canonical_params, Fingerprint, Paging, SessionEntry, SessionPolicy, CURSOR_PARAM,
};
use crate::config::join_url;
use crate::types::Params;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// A session entry shared between the cache and in-flight requests
pub type SharedSession = Arc<RwLock<SessionEntry>>;

struct Slot {
    session: SharedSession,
    last_used: Instant,
}

impl Slot {
    /// Held by an in-flight request as well as the cache
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.session) > 1
    }
}

/// Keyed store of pagination sessions
pub struct SessionCache {
    base_url: String,
    policy: SessionPolicy,
    entries: RwLock<HashMap<Fingerprint, Slot>>,
}

impl SessionCache {
    /// Create an empty cache for endpoints under `base_url`
    pub fn new(base_url: impl Into<String>, policy: SessionPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get the session for `(endpoint, params)`, creating it on first use.
    ///
    /// Every call with an equivalent parameter set returns the same shared entry.
    pub async fn resolve(&self, endpoint: &str, params: &Params) -> SharedSession {
        let canonical = canonical_params(params);
        let fingerprint = Fingerprint::new(endpoint, &canonical);
        let now = Instant::now();

        let mut entries = self.entries.write().await;

        if let Some(slot) = entries.get_mut(&fingerprint) {
            slot.last_used = now;
            return Arc::clone(&slot.session);
        }

        self.evict(&mut entries, now);

        let start_cursor = params
            .get(CURSOR_PARAM)
            .and_then(|c| c.parse().ok())
            .unwrap_or(0);
        let url = join_url(&self.base_url, endpoint);

        debug!(%fingerprint, endpoint, "Creating session");

        let entry = SessionEntry::new(fingerprint.clone(), endpoint, url, canonical, start_cursor);
        let session = Arc::new(RwLock::new(entry));
        entries.insert(
            fingerprint,
            Slot {
                session: Arc::clone(&session),
                last_used: now,
            },
        );
        session
    }

    /// Record the cursors of a response on the matching session.
    ///
    /// Returns false when no session exists for `(endpoint, params)`.
    pub async fn apply_paging(&self, endpoint: &str, params: &Params, paging: &Paging) -> bool {
        let fingerprint = Fingerprint::of(endpoint, params);
        let session = {
            let entries = self.entries.read().await;
            match entries.get(&fingerprint) {
                Some(slot) => Arc::clone(&slot.session),
                None => return false,
            }
        };

        session.write().await.apply_paging(paging);
        true
    }

    /// Look up a session without creating or touching it
    pub async fn get(&self, fingerprint: &Fingerprint) -> Option<SharedSession> {
        self.entries
            .read()
            .await
            .get(fingerprint)
            .map(|slot| Arc::clone(&slot.session))
    }

    /// Number of cached sessions
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every session
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// The eviction policy
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Drop expired entries, then the least recently used ones until there is
    /// room for one more. Sessions held by in-flight requests or running
    /// fetches are kept, so the cache can briefly exceed `max_entries`.
    fn evict(&self, entries: &mut HashMap<Fingerprint, Slot>, now: Instant) {
        if let Some(ttl) = self.policy.ttl {
            entries.retain(|fingerprint, slot| {
                let keep = slot.in_use() || now.duration_since(slot.last_used) < ttl;
                if !keep {
                    debug!(%fingerprint, "Expiring idle session");
                }
                keep
            });
        }

        while entries.len() >= self.policy.max_entries.max(1) {
            let oldest = entries
                .iter()
                .filter(|(_, slot)| !slot.in_use())
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(fingerprint, _)| fingerprint.clone());

            match oldest {
                Some(fingerprint) => {
                    debug!(%fingerprint, "Evicting least recently used session");
                    entries.remove(&fingerprint);
                }
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
