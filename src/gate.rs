/// Auth Gate
///
/// The single entry point the surrounding application calls. Two
/// independent stateless flows:
///
/// - Login: credentials in, signed bearer token out.
/// - Authorize: bearer token plus a required scope in, identity out.
///
/// Plus password rotation and explicit token revocation.
///
/// Externally, "no such identity" and "wrong password" are the same
/// `BadCredentials`; the audit log keeps them apart. A lookup miss still
/// burns a bcrypt verification against a fixed fallback hash so response
/// timing does not reveal whether an account exists.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{
    decode_claims, hash_password, hash_password_sync, issue, validate_strength, verify_password,
    RevocationList, TokenValidator,
};
use crate::configuration::{JwtSettings, PasswordSettings, Settings};
use crate::error::{AuthError, ConfigError, StoreError};
use crate::store::{CredentialStore, Identity};
use crate::validators::is_valid_identifier;

/// Input burned against the fallback hash when no stored hash exists.
const FALLBACK_VERIFY_INPUT: &str = "fallback-timing-equalizer";

/// What a successful login hands back to the caller.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenResponse {
    /// Opaque URL-safe bearer token; presented verbatim on later calls.
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

pub struct AuthGate {
    store: Arc<dyn CredentialStore>,
    revocations: Arc<RevocationList>,
    validator: TokenValidator,
    jwt: JwtSettings,
    password: PasswordSettings,
    lookup_timeout: Duration,
    /// Precomputed hash verified against on lookup misses.
    fallback_hash: crate::store::CredentialHash,
}

impl AuthGate {
    /// Build a gate over a credential store.
    ///
    /// Fails fast on broken configuration: a missing or short signing key
    /// must stop the service before it accepts a single request.
    pub fn new(store: Arc<dyn CredentialStore>, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let fallback_hash = hash_password_sync(FALLBACK_VERIFY_INPUT, settings.password.cost)
            .map_err(|e| {
                ConfigError::InvalidValue(format!("password.cost rejected by bcrypt: {}", e))
            })?;

        let revocations = Arc::new(RevocationList::new());
        let lookup_timeout = Duration::from_millis(settings.store.lookup_timeout_ms);
        let validator = TokenValidator::new(
            store.clone(),
            revocations.clone(),
            settings.jwt.clone(),
            lookup_timeout,
        );

        Ok(Self {
            store,
            revocations,
            validator,
            jwt: settings.jwt,
            password: settings.password,
            lookup_timeout,
            fallback_hash,
        })
    }

    /// Authenticate credentials and mint a token carrying the identity's
    /// full scope set for the configured default lifetime.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let identifier = match is_valid_identifier(identifier) {
            Ok(identifier) => identifier,
            Err(e) => {
                tracing::warn!(reason = %e, "Login denied: malformed identifier");
                self.equalize_timing(password).await;
                return Err(AuthError::BadCredentials);
            }
        };

        let identity = match self.lookup_bounded(&identifier).await? {
            Some(identity) => identity,
            None => {
                tracing::warn!(identifier = %identifier, "Login denied: unknown identifier");
                self.equalize_timing(password).await;
                return Err(AuthError::BadCredentials);
            }
        };

        if !verify_password(password.to_string(), identity.hash.clone()).await {
            tracing::warn!(identifier = %identifier, "Login denied: wrong password");
            return Err(AuthError::BadCredentials);
        }

        // Checked after the password so a caller without valid credentials
        // cannot probe whether an account was disabled.
        if !identity.is_active {
            let err = AuthError::IdentityDisabled;
            err.log_denial("login");
            return Err(err);
        }

        let signed = issue(
            &identity,
            &identity.scopes,
            self.jwt.default_token_ttl,
            &self.jwt,
        )?;

        tracing::info!(identifier = %identifier, jti = %signed.claims.jti, "Login succeeded");

        Ok(TokenResponse {
            access_token: signed.token,
            token_type: "Bearer".to_string(),
            expires_in: signed.claims.lifetime(),
        })
    }

    /// Validate a presented token and require one scope.
    ///
    /// Returns the live identity on success so callers can act on current
    /// record state, not on claims frozen at issuance.
    pub async fn authorize(&self, token: &str, required_scope: &str) -> Result<Identity, AuthError> {
        let grant = match self.validator.validate(token).await {
            Ok(grant) => grant,
            Err(err) => {
                err.log_denial("authorize");
                return Err(err);
            }
        };

        if !grant.scopes.contains(required_scope) {
            let err = AuthError::InsufficientScope;
            tracing::warn!(
                identifier = %grant.identity.identifier,
                required = required_scope,
                "Authorization denied: scope not granted"
            );
            return Err(err);
        }

        Ok(grant.identity)
    }

    /// Replace an identity's password after re-verifying the old one.
    pub async fn rotate_password(
        &self,
        identifier: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let identifier = match is_valid_identifier(identifier) {
            Ok(identifier) => identifier,
            Err(e) => {
                tracing::warn!(reason = %e, "Rotation denied: malformed identifier");
                self.equalize_timing(old_password).await;
                return Err(AuthError::BadCredentials);
            }
        };

        let identity = match self.lookup_bounded(&identifier).await? {
            Some(identity) => identity,
            None => {
                tracing::warn!(identifier = %identifier, "Rotation denied: unknown identifier");
                self.equalize_timing(old_password).await;
                return Err(AuthError::BadCredentials);
            }
        };

        if !verify_password(old_password.to_string(), identity.hash.clone()).await {
            tracing::warn!(identifier = %identifier, "Rotation denied: wrong password");
            return Err(AuthError::BadCredentials);
        }

        if !identity.is_active {
            let err = AuthError::IdentityDisabled;
            err.log_denial("rotate_password");
            return Err(err);
        }

        validate_strength(new_password)?;

        let new_hash = hash_password(new_password.to_string(), self.password.cost).await?;

        let update = self.store.update_hash(&identifier, new_hash);
        match tokio::time::timeout(self.lookup_timeout, update).await {
            Err(_elapsed) => {
                return Err(AuthError::Transient("credential update timed out".to_string()))
            }
            Ok(Err(StoreError::Timeout)) => {
                return Err(AuthError::Transient("storage timed out".to_string()))
            }
            Ok(Err(StoreError::Unavailable(msg))) => return Err(AuthError::Transient(msg)),
            Ok(Err(other)) => {
                return Err(AuthError::Internal(format!(
                    "credential update failed: {}",
                    other
                )))
            }
            Ok(Ok(())) => {}
        }

        tracing::info!(identifier = %identifier, "Password rotated");
        Ok(())
    }

    /// Invalidate one token ahead of its natural expiry.
    ///
    /// The token must still verify (signature and expiry); revoking an
    /// already-dead token is pointless and reports its actual failure.
    pub fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = match decode_claims(token, &self.jwt) {
            Ok(claims) => claims,
            Err(err) => {
                err.log_denial("revoke");
                return Err(err);
            }
        };

        self.revocations.revoke(&claims.jti, claims.exp);
        Ok(())
    }

    /// Drop revocation entries whose tokens have expired on their own.
    pub fn purge_expired_revocations(&self) -> usize {
        self.revocations.purge_expired()
    }

    /// Store lookup bounded by the configured timeout. `None` means the
    /// identifier is unknown; slow or unavailable storage is retryable and
    /// never reads as a denial.
    async fn lookup_bounded(&self, identifier: &str) -> Result<Option<Identity>, AuthError> {
        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.lookup(identifier));
        match lookup.await {
            Err(_elapsed) => Err(AuthError::Transient("identity lookup timed out".to_string())),
            Ok(Err(StoreError::NotFound)) => Ok(None),
            Ok(Err(StoreError::Timeout)) => {
                Err(AuthError::Transient("storage timed out".to_string()))
            }
            Ok(Err(StoreError::Unavailable(msg))) => Err(AuthError::Transient(msg)),
            Ok(Err(StoreError::Conflict)) => Err(AuthError::Internal(
                "unexpected conflict during lookup".to_string(),
            )),
            Ok(Ok(identity)) => Ok(Some(identity)),
        }
    }

    /// Burn a verification against the fallback hash so code paths without
    /// a stored hash take as long as paths with one.
    async fn equalize_timing(&self, password: &str) {
        let _ = verify_password(password.to_string(), self.fallback_hash.clone()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::configuration::{StoreSettings, Settings};
    use crate::store::MemoryCredentialStore;

    fn settings() -> Settings {
        Settings {
            jwt: JwtSettings {
                secret: "test-secret-key-at-least-32-characters-long".to_string(),
                issuer: "resume-auth-test".to_string(),
                default_token_ttl: 900,
                max_token_ttl: 3600,
                expiry_leeway: 0,
            },
            password: PasswordSettings { cost: 4 },
            store: StoreSettings {
                lookup_timeout_ms: 3000,
            },
        }
    }

    #[test]
    fn gate_refuses_to_start_without_signing_key() {
        let mut broken = settings();
        broken.jwt.secret = String::new();

        let result = AuthGate::new(Arc::new(MemoryCredentialStore::new()), broken);
        assert!(matches!(result, Err(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn gate_refuses_short_signing_key() {
        let mut broken = settings();
        broken.jwt.secret = "short".to_string();

        let result = AuthGate::new(Arc::new(MemoryCredentialStore::new()), broken);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn gate_starts_on_valid_settings() {
        assert!(AuthGate::new(Arc::new(MemoryCredentialStore::new()), settings()).is_ok());
    }
}
