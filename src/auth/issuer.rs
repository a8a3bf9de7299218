/// Token Issuer
///
/// Mints signed bearer tokens for an already-authenticated identity.
/// Issuance never escalates privilege: the requested scope set must sit
/// inside the identity's grants, and the requested lifetime is clamped to
/// the configured maximum. Each token carries a fresh unique id so a single
/// token can later be revoked without touching the identity's others.

use std::collections::HashSet;

use crate::auth::claims::Claims;
use crate::auth::jwt::sign_claims;
use crate::configuration::JwtSettings;
use crate::error::AuthError;
use crate::store::Identity;

/// A freshly minted token together with the claims that went into it.
#[derive(Debug, Clone)]
pub struct SignedToken {
    /// Opaque URL-safe wire form.
    pub token: String,
    pub claims: Claims,
}

/// Issue a token asserting `identity` holds `requested` scopes for `ttl`
/// seconds (clamped to `config.max_token_ttl`).
pub fn issue(
    identity: &Identity,
    requested: &HashSet<String>,
    ttl: i64,
    config: &JwtSettings,
) -> Result<SignedToken, AuthError> {
    if !identity.is_active {
        return Err(AuthError::IdentityDisabled);
    }

    if !requested.is_subset(&identity.scopes) {
        tracing::warn!(
            identifier = %identity.identifier,
            "Issuance requested scopes beyond the identity's grants"
        );
        return Err(AuthError::PermissionDenied);
    }

    if ttl <= 0 {
        return Err(AuthError::Internal("token ttl must be positive".to_string()));
    }
    let ttl = ttl.min(config.max_token_ttl);

    let mut scopes: Vec<String> = requested.iter().cloned().collect();
    scopes.sort();

    let claims = Claims::new(
        identity.identifier.clone(),
        scopes,
        ttl,
        config.issuer.clone(),
    );
    let token = sign_claims(&claims, config)?;

    tracing::info!(
        identifier = %identity.identifier,
        jti = %claims.jti,
        expires_in = ttl,
        "Token issued"
    );

    Ok(SignedToken { token, claims })
}
