/// In-memory credential store
///
/// Backing map behind a `tokio::sync::RwLock`: the write lock serializes
/// create/rotate/disable, reads share the lock and observe at most one
/// in-flight write late. Used by the test suite and by embedded deployments
/// that provision identities at startup.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{CredentialHash, CredentialStore, Identity};

#[derive(Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<String, Identity>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn lookup(&self, identifier: &str) -> Result<Identity, StoreError> {
        let records = self.records.read().await;
        records.get(identifier).cloned().ok_or(StoreError::NotFound)
    }

    async fn create(
        &self,
        identifier: &str,
        hash: CredentialHash,
        scopes: HashSet<String>,
    ) -> Result<Identity, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(identifier) {
            return Err(StoreError::Conflict);
        }

        let identity = Identity {
            identifier: identifier.to_string(),
            hash,
            scopes,
            is_active: true,
            created_at: Utc::now(),
        };
        records.insert(identifier.to_string(), identity.clone());

        tracing::info!(identifier = identifier, "Identity created");
        Ok(identity)
    }

    async fn update_hash(
        &self,
        identifier: &str,
        new_hash: CredentialHash,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(identifier) {
            Some(identity) => {
                identity.hash = new_hash;
                tracing::info!(identifier = identifier, "Credential hash replaced");
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn disable(&self, identifier: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(identifier) {
            Some(identity) => {
                identity.is_active = false;
                tracing::info!(identifier = identifier, "Identity disabled");
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}
