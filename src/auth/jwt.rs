//! JWT token management
//!
//! Issues and validates the HS256 access tokens that bind an email claim.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::JwtConfig;
use crate::user::error::{UserError, UserResult};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly signed token and its lifetime
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: Duration,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

// Custom Debug implementation to hide sensitive keys
impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"<hidden>")
            .field("decoding_key", &"<hidden>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str, expiry: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(&config.secret, config.expiry)
    }

    pub fn issue(&self, email: &str) -> UserResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let lifetime = i64::try_from(self.expiry.as_secs())
            .map_err(|_| UserError::internal("Token lifetime out of range"))?;
        let claims = Claims {
            email: email.to_string(),
            iat: now,
            exp: now.saturating_add(lifetime),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(IssuedToken {
            token,
            expires_in: self.expiry,
        })
    }

    pub fn validate(&self, token: &str) -> UserResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                log::debug!("Rejected access token: {e}");
                UserError::Unauthorized("Invalid access token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_that_is_long_enough_32_chars";

    #[test]
    fn test_token_generation_and_validation() {
        let service = JwtService::new(SECRET, Duration::from_secs(3600));

        let issued = service.issue("ada@x.com").unwrap();
        let claims = service.validate(&issued.token).unwrap();

        assert_eq!(claims.email, "ada@x.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = JwtService::new("another_secret_key_that_is_long_enough", Duration::from_secs(60));
        let service = JwtService::new(SECRET, Duration::from_secs(60));

        let issued = issuer.issue("ada@x.com").unwrap();
        assert!(matches!(service.validate(&issued.token), Err(UserError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtService::new(SECRET, Duration::from_secs(60));
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: "ada@x.com".to_string(),
            iat: now - 3600,
            exp: now - 1800,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let service = JwtService::new(SECRET, Duration::from_secs(60));
        assert!(service.validate("not-a-token").is_err());
    }
}
