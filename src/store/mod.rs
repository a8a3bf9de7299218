/// Credential Store
///
/// Owns every persisted identity and its salted password hash. The trait is
/// the whole storage contract this crate asks of the outside world; the
/// concrete backend (in-memory, Postgres) is interchangeable.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;

mod memory;
mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Opaque bcrypt hash as produced by the password hasher.
///
/// The string embeds the algorithm tag, cost, and salt
/// (`$2b$<cost>$<salt+digest>`); nothing outside the hasher interprets it.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn new(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Algorithm tag embedded in the hash, e.g. `2b`. `None` for values that
    /// are not in modular crypt format; those verify as false downstream.
    pub fn algorithm(&self) -> Option<&str> {
        let mut parts = self.0.split('$');
        parts.next()?; // leading empty segment
        match parts.next() {
            Some(tag) if !tag.is_empty() => Some(tag),
            _ => None,
        }
    }
}

// Hashes are not secrets the way plaintexts are, but they have no business
// in log output either. Debug shows the algorithm tag only.
impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.algorithm() {
            Some(tag) => write!(f, "CredentialHash(${}$..)", tag),
            None => write!(f, "CredentialHash(..)"),
        }
    }
}

/// A registered principal capable of authenticating.
///
/// Mutated only through the store's `create` / `update_hash` / `disable`
/// operations; disabled identities are retired, never hard-deleted, because
/// issued tokens may still reference them.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Immutable unique identifier (email-shaped).
    pub identifier: String,
    /// The single active credential hash.
    pub hash: CredentialHash,
    /// Scopes this identity may be granted in a token.
    pub scopes: HashSet<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The four operations this crate requires from durable storage.
///
/// Implementations must serialize concurrent writes to the same identifier;
/// reads may be stale by at most one in-flight write.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch an identity by its immutable identifier.
    async fn lookup(&self, identifier: &str) -> Result<Identity, StoreError>;

    /// Register a new identity. Fails with `Conflict` if the identifier is
    /// already taken.
    async fn create(
        &self,
        identifier: &str,
        hash: CredentialHash,
        scopes: HashSet<String>,
    ) -> Result<Identity, StoreError>;

    /// Atomically replace the stored credential hash (password rotation).
    async fn update_hash(
        &self,
        identifier: &str,
        new_hash: CredentialHash,
    ) -> Result<(), StoreError>;

    /// Retire an identity. Outstanding tokens for it stop validating.
    async fn disable(&self, identifier: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_hash_exposes_algorithm_tag() {
        let hash = CredentialHash::new(
            "$2b$04$wdSU8bDidXzRWLVEbc1Bgus/q8qpDvyAJKbTRvmZAFYFHJSYHU.0W".to_string(),
        );
        assert_eq!(hash.algorithm(), Some("2b"));
    }

    #[test]
    fn malformed_hash_has_no_algorithm() {
        assert_eq!(CredentialHash::new("not-a-hash".to_string()).algorithm(), None);
        assert_eq!(CredentialHash::new(String::new()).algorithm(), None);
    }

    #[test]
    fn debug_output_redacts_digest() {
        let hash = CredentialHash::new(
            "$2b$12$wdSU8bDidXzRWLVEbc1Bgus/q8qpDvyAJKbTRvmZAFYFHJSYHU.0W".to_string(),
        );
        let rendered = format!("{:?}", hash);
        assert_eq!(rendered, "CredentialHash($2b$..)");
        assert!(!rendered.contains("wdSU8bDid"));
    }
}
