/// Postgres credential store
///
/// Production backend for the `CredentialStore` contract. Every mutation is
/// a single statement, so per-identifier writes serialize on the row lock;
/// lost updates between concurrent rotations cannot happen. The `identities`
/// table is created by the migration in `migrations/`.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::store::{CredentialHash, CredentialStore, Identity};

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn lookup(&self, identifier: &str) -> Result<Identity, StoreError> {
        let row = sqlx::query_as::<_, (String, String, Vec<String>, bool, DateTime<Utc>)>(
            r#"
            SELECT identifier, password_hash, scopes, is_active, created_at
            FROM identities
            WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        match row {
            Some((identifier, password_hash, scopes, is_active, created_at)) => Ok(Identity {
                identifier,
                hash: CredentialHash::new(password_hash),
                scopes: scopes.into_iter().collect(),
                is_active,
                created_at,
            }),
            None => Err(StoreError::NotFound),
        }
    }

    async fn create(
        &self,
        identifier: &str,
        hash: CredentialHash,
        scopes: HashSet<String>,
    ) -> Result<Identity, StoreError> {
        let created_at = Utc::now();
        let scope_list: Vec<String> = scopes.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO identities (identifier, password_hash, scopes, is_active, created_at)
            VALUES ($1, $2, $3, TRUE, $4)
            "#,
        )
        .bind(identifier)
        .bind(hash.as_str())
        .bind(&scope_list)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        tracing::info!(identifier = identifier, "Identity created");

        Ok(Identity {
            identifier: identifier.to_string(),
            hash,
            scopes,
            is_active: true,
            created_at,
        })
    }

    async fn update_hash(
        &self,
        identifier: &str,
        new_hash: CredentialHash,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET password_hash = $1
            WHERE identifier = $2
            "#,
        )
        .bind(new_hash.as_str())
        .bind(identifier)
        .execute(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(identifier = identifier, "Credential hash replaced");
        Ok(())
    }

    async fn disable(&self, identifier: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE identities
            SET is_active = FALSE
            WHERE identifier = $1
            "#,
        )
        .bind(identifier)
        .execute(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(identifier = identifier, "Identity disabled");
        Ok(())
    }
}

fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        _ => classify_error_message(&err.to_string()),
    }
}

/// Message-level classification for the cases sqlx does not expose as
/// structured variants across backends.
fn classify_error_message(message: &str) -> StoreError {
    if message.contains("duplicate key") || message.contains("unique constraint") {
        StoreError::Conflict
    } else if message.contains("timed out") {
        StoreError::Timeout
    } else {
        StoreError::Unavailable(message.to_string())
    }
}
