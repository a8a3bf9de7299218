/// JWT signing and decoding
///
/// The wire form of a token is the compact JWS serialization: opaque and
/// URL-safe, passed back by callers verbatim. HS256 is fixed at deployment
/// time; the symmetric secret comes from configuration and is validated at
/// startup.
///
/// Decoding distinguishes exactly two failure modes, in check order:
/// a bad signature (tamper, wrong key, wrong issuer, structural garbage)
/// and an expired token. Signature problems win over expiry: an expired
/// token that also fails signature reports `InvalidSignature`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::AuthError;

/// Sign claims into the opaque wire token.
pub fn sign_claims(claims: &Claims, config: &JwtSettings) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("token signing failed: {}", e)))
}

/// Verify signature and expiry, returning the embedded claims.
///
/// Expiry is checked against the system clock with the configured leeway;
/// issuer mismatch counts as an unrecognized key.
pub fn decode_claims(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = config.expiry_leeway;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::InvalidSignature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            issuer: "resume-auth-test".to_string(),
            default_token_ttl: 900,
            max_token_ttl: 3600,
            expiry_leeway: 0,
        }
    }

    fn test_claims(ttl: i64) -> Claims {
        Claims::new(
            "alice@example.com".to_string(),
            vec!["read".to_string()],
            ttl,
            "resume-auth-test".to_string(),
        )
    }

    #[test]
    fn test_sign_and_decode_round_trip() {
        let config = get_test_config();
        let claims = test_claims(900);

        let token = sign_claims(&claims, &config).expect("Failed to sign token");
        let decoded = decode_claims(&token, &config).expect("Failed to decode token");

        assert_eq!(decoded.sub, "alice@example.com");
        assert_eq!(decoded.scopes, vec!["read".to_string()]);
        assert_eq!(decoded.jti, claims.jti);
    }

    #[test]
    fn test_garbage_token_is_invalid_signature() {
        let config = get_test_config();
        assert_eq!(
            decode_claims("not.a.token", &config).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_tampered_token_is_invalid_signature() {
        let config = get_test_config();
        let token = sign_claims(&test_claims(900), &config).expect("Failed to sign token");

        let tampered = format!("{}X", token);
        assert_eq!(
            decode_claims(&tampered, &config).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_wrong_key_is_invalid_signature() {
        let config = get_test_config();
        let token = sign_claims(&test_claims(900), &config).expect("Failed to sign token");

        let mut other = get_test_config();
        other.secret = "a-completely-different-32-byte-secret!!".to_string();
        assert_eq!(
            decode_claims(&token, &other).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_wrong_issuer_is_invalid_signature() {
        let config = get_test_config();
        let token = sign_claims(&test_claims(900), &config).expect("Failed to sign token");

        let mut other = get_test_config();
        other.issuer = "someone-else".to_string();
        assert_eq!(
            decode_claims(&token, &other).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_expired_token_is_expired() {
        let config = get_test_config();
        let mut claims = test_claims(900);
        claims.iat -= 3600;
        claims.exp -= 3600;

        let token = sign_claims(&claims, &config).expect("Failed to sign token");
        assert_eq!(decode_claims(&token, &config).unwrap_err(), AuthError::Expired);
    }

    #[test]
    fn test_leeway_tolerates_small_skew() {
        let mut config = get_test_config();
        config.expiry_leeway = 120;

        let mut claims = test_claims(900);
        // expired one minute ago, inside the 2 minute tolerance
        claims.iat -= 960;
        claims.exp -= 960;

        let token = sign_claims(&claims, &config).expect("Failed to sign token");
        assert!(decode_claims(&token, &config).is_ok());
    }
}
