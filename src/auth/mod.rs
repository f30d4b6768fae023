pub mod password;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::UserId;

pub use password::{PasswordError, PasswordHashing};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT lifetime")]
    InvalidExpiry,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Signing material and policy for access tokens. Built once at startup from
/// the configured secret; the key never changes while the process runs.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl Claims {
    pub fn new(user_id: UserId, lifetime_secs: i64) -> Self {
        let iat = Utc::now().timestamp();
        Self {
            sub: user_id,
            iat,
            exp: iat.saturating_add(lifetime_secs),
        }
    }
}

impl JwtKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let lifetime_secs = i64::try_from(expiry_hours)
            .ok()
            .and_then(|h| h.checked_mul(3600))
            .filter(|s| *s > 0)
            .ok_or(JwtError::InvalidExpiry)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime_secs,
        })
    }

    /// Sign a fresh token for `user_id`
    pub fn generate(&self, user_id: UserId) -> Result<String, JwtError> {
        let claims = Claims::new(user_id, self.lifetime_secs);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Check signature, algorithm and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret", 1).unwrap()
    }

    #[test]
    fn generated_token_validates_to_same_user() {
        let keys = keys();
        let user_id = UserId::new();
        let token = keys.generate(user_id).unwrap();
        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = JwtKeys::new("other-secret", 1).unwrap().generate(UserId::new()).unwrap();
        assert!(keys().validate(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let keys = keys();
        let token = keys.generate(UserId::new()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_claims = Claims::new(UserId::new(), 3600);
        let forged_payload = encode(
            &Header::new(Algorithm::HS256),
            &forged_claims,
            &EncodingKey::from_secret(b"attacker"),
        )
        .unwrap();
        let forged_body = forged_payload.split('.').nth(1).unwrap().to_string();
        parts[1] = &forged_body;
        assert!(keys.validate(&parts.join(".")).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: UserId::new(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(keys().validate(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys().validate("not.a.jwt").is_err());
        assert!(keys().validate("").is_err());
    }

    #[test]
    fn empty_secret_or_zero_lifetime_is_refused() {
        assert!(matches!(JwtKeys::new("", 1), Err(JwtError::InvalidSecret)));
        assert!(matches!(JwtKeys::new("s", 0), Err(JwtError::InvalidExpiry)));
    }
}
