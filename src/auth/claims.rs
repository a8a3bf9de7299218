/// JWT Claims structure
///
/// Payload of an issued bearer token: the authenticated subject, its granted
/// scopes, the lifetime window, and a unique token id (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by every access token.
///
/// Tokens are stateless and self-contained; everything the validator needs
/// besides the identity's current status lives here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (the identity's immutable identifier)
    pub sub: String,
    /// Scopes granted to this token (may be a subset of the identity's)
    pub scopes: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Unique token id, the handle for revocation
    pub jti: String,
}

impl Claims {
    /// Create claims for a token issued now.
    ///
    /// `ttl_seconds` must be positive (the issuer enforces this), keeping
    /// `exp` strictly greater than `iat`.
    pub fn new(subject: String, scopes: Vec<String>, ttl_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: subject,
            scopes,
            exp: now + ttl_seconds,
            iat: now,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Seconds of lifetime granted at issuance.
    pub fn lifetime(&self) -> i64 {
        self.exp - self.iat
    }
}
