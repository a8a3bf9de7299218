/// Token Validator
///
/// Turns a presented wire token into the identity and scopes it grants, or
/// a single terminal failure. Checks run in a fixed order, each with its own
/// failure mode:
///
/// 1. signature            -> `InvalidSignature`
/// 2. expiry               -> `Expired`
/// 3. revocation           -> `Revoked`
/// 4. live identity status -> `IdentityDisabled`
///
/// Step 4 is a real lookup against the credential store, not trust in the
/// token's embedded claims: a token can outlive its account's good standing.
/// The lookup is bounded by the configured timeout and surfaces as a
/// retryable `Transient` failure when storage is slow, never as a denial.
///
/// Whether the granted scopes are sufficient for an operation is the
/// caller's decision (the Auth Gate's), not the validator's.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::jwt::decode_claims;
use crate::auth::revocation::RevocationList;
use crate::configuration::JwtSettings;
use crate::error::{AuthError, StoreError};
use crate::store::{CredentialStore, Identity};

/// Successful validation: the authenticated identity plus what the token
/// actually grants.
#[derive(Debug, Clone)]
pub struct Grant {
    pub identity: Identity,
    pub scopes: HashSet<String>,
}

pub struct TokenValidator {
    store: Arc<dyn CredentialStore>,
    revocations: Arc<RevocationList>,
    jwt: JwtSettings,
    lookup_timeout: Duration,
}

impl TokenValidator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        revocations: Arc<RevocationList>,
        jwt: JwtSettings,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            store,
            revocations,
            jwt,
            lookup_timeout,
        }
    }

    pub async fn validate(&self, token: &str) -> Result<Grant, AuthError> {
        // Steps 1 and 2: signature, then expiry
        let claims = decode_claims(token, &self.jwt)?;

        // Step 3: revocation
        if self.revocations.is_revoked(&claims.jti) {
            tracing::warn!(jti = %claims.jti, sub = %claims.sub, "Revoked token presented");
            return Err(AuthError::Revoked);
        }

        // Step 4: live identity status
        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.lookup(&claims.sub));
        let identity = match lookup.await {
            Err(_elapsed) => {
                return Err(AuthError::Transient(
                    "identity lookup timed out".to_string(),
                ))
            }
            Ok(Err(StoreError::NotFound)) => {
                // Token references an identity the store no longer knows.
                // Identities are retired rather than deleted, so treat this
                // the same as a disabled account.
                tracing::warn!(sub = %claims.sub, "Token references unknown identity");
                return Err(AuthError::IdentityDisabled);
            }
            Ok(Err(StoreError::Timeout)) => {
                return Err(AuthError::Transient("storage timed out".to_string()))
            }
            Ok(Err(StoreError::Unavailable(msg))) => return Err(AuthError::Transient(msg)),
            Ok(Err(StoreError::Conflict)) => {
                return Err(AuthError::Internal(
                    "unexpected conflict during lookup".to_string(),
                ))
            }
            Ok(Ok(identity)) => identity,
        };

        if !identity.is_active {
            tracing::warn!(sub = %claims.sub, "Token presented for disabled identity");
            return Err(AuthError::IdentityDisabled);
        }

        Ok(Grant {
            identity,
            scopes: claims.scopes.into_iter().collect(),
        })
    }
}
