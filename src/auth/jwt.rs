use crate::types::{AppError, Claims, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

/// Verifies access tokens issued by the external auth backend.
///
/// Tokens are HS256-signed with a secret shared between this server and the
/// backend. The backend owns the claim layout, so only the signature is
/// mandatory; `exp` is enforced when the token carries one.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims::<&str>(&[]);
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))
    }
}

/// Signs an HS256 access token the way the auth backend does.
///
/// The server never issues tokens itself; this exists for local development
/// (`ecodairy token`) and for tests.
pub fn issue_token(secret: &str, user_id: &str, ttl: Duration) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: None,
        user_id: Some(serde_json::Value::String(user_id.to_string())),
        token_type: Some("access".to_string()),
        exp: Some((now + ttl).timestamp().max(0) as u64),
        iat: Some(now.timestamp().max(0) as u64),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Auth(format!("Failed to generate token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-chars";

    #[test]
    fn test_token_verification_success() {
        let token = issue_token(SECRET, "42", Duration::hours(1)).expect("should issue");
        let claims = TokenVerifier::new(SECRET)
            .verify(&token)
            .expect("should verify token");

        assert_eq!(claims.subject().as_deref(), Some("42"));
        assert_eq!(claims.token_type.as_deref(), Some("access"));
    }

    #[test]
    fn test_token_verification_invalid_token() {
        let result = TokenVerifier::new(SECRET).verify("invalid.token.here");
        assert!(result.is_err(), "invalid token should fail verification");
    }

    #[test]
    fn test_token_verification_wrong_secret() {
        let token = issue_token("secret-one-that-is-32-chars-long", "7", Duration::hours(1))
            .expect("should issue");
        let result = TokenVerifier::new("secret-two-that-is-32-chars-long").verify(&token);
        assert!(result.is_err(), "token from different secret should fail");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(SECRET, "7", Duration::hours(-2)).expect("should issue");
        let err = TokenVerifier::new(SECRET).verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[test]
    fn test_token_without_exp_accepted() {
        let claims = Claims {
            sub: Some("farmer@example.com".to_string()),
            ..Default::default()
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let verified = TokenVerifier::new(SECRET).verify(&token).unwrap();
        assert_eq!(verified.subject().as_deref(), Some("farmer@example.com"));
    }
}
