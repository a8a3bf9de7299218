/// Revocation List
///
/// Optional defense-in-depth on top of short token lifetimes: token ids
/// explicitly invalidated before their natural expiry. Entries are useless
/// once the token itself has expired (the expiry check already rejects it),
/// so `purge_expired` can drop them at any cadence the host application
/// likes.

use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory set of revoked token ids, keyed by jti.
///
/// Shared mutable state; the interior lock keeps callers oblivious.
#[derive(Default)]
pub struct RevocationList {
    entries: RwLock<HashMap<String, i64>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a token id as revoked until `expires_at` (Unix timestamp).
    pub fn revoke(&self, jti: &str, expires_at: i64) {
        let mut entries = self.entries.write().expect("revocation lock poisoned");
        entries.insert(jti.to_string(), expires_at);
        tracing::info!(jti = jti, "Token revoked");
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        let entries = self.entries.read().expect("revocation lock poisoned");
        entries.contains_key(jti)
    }

    /// Drop entries whose tokens have expired on their own. Returns how many
    /// were removed.
    pub fn purge_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let mut entries = self.entries.write().expect("revocation lock poisoned");
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed = removed, "Purged expired revocation entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("revocation lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
