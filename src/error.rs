/// Error Handling Module
///
/// Every authentication outcome that is not a success is a value of one
/// closed enum. Callers match on the kind; there is no error hierarchy.
/// The module covers:
/// 1. Auth outcomes (`AuthError`): recoverable by the caller, never fatal
/// 2. Storage outcomes (`StoreError`): mapped explicitly at each call site
/// 3. Configuration errors (`ConfigError`): fatal at startup only
/// 4. The uniform externally visible denial payload (`DenialResponse`)

use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. AUTHENTICATION OUTCOMES
/// ============================================================================

/// Terminal outcome of a login, authorization, issuance, or rotation attempt.
///
/// `BadCredentials` deliberately covers both "no such identity" and "wrong
/// password"; the distinction exists only in the audit log (`log_denial`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown identifier or wrong password (collapsed on purpose).
    BadCredentials,
    /// The identity exists but has been disabled.
    IdentityDisabled,
    /// Token signature did not verify, or the token is structurally invalid.
    InvalidSignature,
    /// Token expiry has passed.
    Expired,
    /// Token id is on the revocation list.
    Revoked,
    /// Token is valid but does not carry the required scope.
    InsufficientScope,
    /// Issuance requested a scope the identity was never granted.
    PermissionDenied,
    /// A new password failed the strength policy.
    WeakPassword(String),
    /// An identity with this identifier already exists.
    Conflict,
    /// Storage did not answer in time; the caller may retry.
    Transient(String),
    /// Unexpected internal failure (hashing backend, signing backend).
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::BadCredentials => write!(f, "invalid identifier or password"),
            AuthError::IdentityDisabled => write!(f, "identity is disabled"),
            AuthError::InvalidSignature => write!(f, "token signature is invalid"),
            AuthError::Expired => write!(f, "token has expired"),
            AuthError::Revoked => write!(f, "token has been revoked"),
            AuthError::InsufficientScope => write!(f, "token does not grant the required scope"),
            AuthError::PermissionDenied => {
                write!(f, "requested scopes exceed the identity's grants")
            }
            AuthError::WeakPassword(reason) => write!(f, "password rejected: {}", reason),
            AuthError::Conflict => write!(f, "identifier is already registered"),
            AuthError::Transient(msg) => write!(f, "transient storage failure: {}", msg),
            AuthError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AuthError {}

impl AuthError {
    /// Whether the caller is expected to retry the exact same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Transient(_))
    }

    /// The uniform payload shown to the far side of the wire.
    ///
    /// Credential-related failures all render identically so that a caller
    /// cannot tell "account exists" from "wrong password". Token failures
    /// collapse the same way.
    pub fn denial(&self) -> DenialResponse {
        let (code, message) = match self {
            AuthError::BadCredentials => ("INVALID_CREDENTIALS", "Invalid identifier or password"),
            AuthError::IdentityDisabled => ("ACCOUNT_DISABLED", "Account is disabled"),
            AuthError::InvalidSignature | AuthError::Expired | AuthError::Revoked => {
                ("TOKEN_INVALID", "Invalid or expired token")
            }
            AuthError::InsufficientScope => ("INSUFFICIENT_SCOPE", "Insufficient scope"),
            AuthError::PermissionDenied => ("PERMISSION_DENIED", "Permission denied"),
            AuthError::WeakPassword(_) => {
                ("WEAK_PASSWORD", "Password does not meet the strength policy")
            }
            AuthError::Conflict => ("DUPLICATE_IDENTITY", "Identifier is already registered"),
            AuthError::Transient(_) => {
                ("SERVICE_UNAVAILABLE", "Service temporarily unavailable, retry later")
            }
            AuthError::Internal(_) => ("INTERNAL_ERROR", "Internal error"),
        };

        DenialResponse {
            code: code.to_string(),
            message: message.to_string(),
            retryable: self.is_retryable(),
        }
    }

    /// Audit-side logging: records the precise kind the public payload hides.
    pub fn log_denial(&self, operation: &str) {
        match self {
            AuthError::BadCredentials
            | AuthError::IdentityDisabled
            | AuthError::InsufficientScope
            | AuthError::PermissionDenied
            | AuthError::WeakPassword(_) => {
                tracing::warn!(operation = operation, error = %self, "Request denied");
            }
            AuthError::InvalidSignature | AuthError::Expired | AuthError::Revoked => {
                tracing::warn!(operation = operation, error = %self, "Token rejected");
            }
            AuthError::Conflict => {
                tracing::warn!(operation = operation, error = %self, "Duplicate identity");
            }
            AuthError::Transient(msg) => {
                tracing::error!(operation = operation, error = %msg, "Storage unavailable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(operation = operation, error = %msg, "Internal error");
            }
        }
    }
}

/// ============================================================================
/// 2. STORAGE OUTCOMES
/// ============================================================================

/// Result kinds of the four `CredentialStore` operations.
///
/// No blanket `From<StoreError> for AuthError` exists: a `NotFound` during
/// login must become `BadCredentials` while a `NotFound` during token
/// validation means the identity is gone, so each call site maps explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    Conflict,
    Timeout,
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "no such identity"),
            StoreError::Conflict => write!(f, "identifier already exists"),
            StoreError::Timeout => write!(f, "storage operation timed out"),
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
        }
    }
}

impl StdError for StoreError {}

/// ============================================================================
/// 3. CONFIGURATION ERRORS
/// ============================================================================

/// Startup-time configuration failures. The only fatal errors in the crate:
/// a gate is never constructed over a bad signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// ============================================================================
/// 4. EXTERNALLY VISIBLE DENIAL PAYLOAD
/// ============================================================================

/// What the surrounding application serializes back to a denied caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DenialResponse {
    /// Stable code for client-side handling
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Whether retrying the same request may succeed
    pub retryable: bool,
}
