use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user id as string)
    pub exp: i64,    // Expiration timestamp
    pub iat: i64,    // Issued at timestamp
    pub iss: String, // Issuer
    pub jti: String, // JWT ID (unique token identifier)
}

impl Claims {
    /// The user id carried in `sub`.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse::<i64>().ok().map(UserId::new)
    }
}

/// JWT Service - creates and verifies access tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: chrono::Duration,
}

impl JwtService {
    /// Create new JWT service with secret, issuer and token lifetime
    pub fn new(secret: &str, issuer: String, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: chrono::Duration::minutes(ttl_minutes),
        }
    }

    /// Create a new access token for a user
    pub fn create_token(&self, user_id: UserId) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token
    ///
    /// Returns claims if token is valid and not expired
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_verify_token() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string(), 15);

        let token = service.create_token(UserId::new(42)).unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(UserId::new(42)));
        assert_eq!(claims.iss, "test_issuer");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new("test_secret_key", "test_issuer".to_string(), 15);
        assert!(service.verify_token("invalid_token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new("secret1", "test_issuer".to_string(), 15);
        let service2 = JwtService::new("secret2", "test_issuer".to_string(), 15);

        let token = service1.create_token(UserId::new(1)).unwrap();

        // Token created with secret1 should not verify with secret2
        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let service1 = JwtService::new("secret", "contacts-api".to_string(), 15);
        let service2 = JwtService::new("secret", "quotes-site".to_string(), 15);

        let token = service1.create_token(UserId::new(1)).unwrap();
        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        // Far enough in the past to clear the default 60s leeway
        let service = JwtService::new("secret", "test_issuer".to_string(), -10);
        let token = service.create_token(UserId::new(1)).unwrap();
        assert!(service.verify_token(&token).is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "abc".to_string(),
            exp: 0,
            iat: 0,
            iss: String::new(),
            jti: String::new(),
        };
        assert_eq!(claims.user_id(), None);
    }
}
