/// Password Hashing and Verification
///
/// bcrypt with a configurable cost factor. Hashing is deliberately slow, so
/// the async entry points push the work onto `tokio::task::spawn_blocking`
/// and never occupy an async worker thread; a caller that disappears
/// mid-hash leaves the blocking task to finish on its own (the partial work
/// is not reusable, killing it buys nothing).
///
/// Verification fails closed: a malformed stored hash verifies as `false`,
/// it never raises an error that could skip the denial path. The comparison
/// inside bcrypt is constant-time; do not replace it with `==`.

use bcrypt::{hash, verify};

use crate::error::AuthError;
use crate::store::CredentialHash;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a password with a fresh random salt.
///
/// Synchronous and CPU-bound; call `hash_password` from async contexts.
pub fn hash_password_sync(password: &str, cost: u32) -> Result<CredentialHash, AuthError> {
    hash(password, cost)
        .map(CredentialHash::new)
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against a stored hash. Fails closed.
pub fn verify_password_sync(password: &str, stored: &CredentialHash) -> bool {
    match verify(password, stored.as_str()) {
        Ok(matches) => matches,
        Err(e) => {
            // Malformed hash in storage. Deny, never bypass.
            tracing::warn!(error = %e, "Stored credential hash failed to parse; denying");
            false
        }
    }
}

/// Hash a password on the blocking worker pool.
pub async fn hash_password(password: String, cost: u32) -> Result<CredentialHash, AuthError> {
    tokio::task::spawn_blocking(move || hash_password_sync(&password, cost))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed to complete: {}", e)))?
}

/// Verify a password on the blocking worker pool. Fails closed, including
/// when the worker task itself dies.
pub async fn verify_password(password: String, stored: CredentialHash) -> bool {
    match tokio::task::spawn_blocking(move || verify_password_sync(&password, &stored)).await {
        Ok(matches) => matches,
        Err(e) => {
            tracing::error!(error = %e, "Verification task failed to complete; denying");
            false
        }
    }
}

/// Validate password strength requirements
///
/// Requirements:
/// - Minimum 8 characters
/// - Maximum 128 characters (bcrypt limitation and DoS prevention)
/// - At least one digit
/// - At least one lowercase letter
/// - At least one uppercase letter
///
/// Applied to new passwords at rotation; stored credentials predating the
/// policy still verify.
pub fn validate_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "minimum {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "maximum {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AuthError::WeakPassword(
            "must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        ));
    }

    Ok(())
}
