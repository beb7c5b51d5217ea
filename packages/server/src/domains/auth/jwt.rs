use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // Subject (user id as string)
    pub user_id: i64,     // User database id
    pub username: String, // Username (for logging/debugging)
    pub role: String,     // "user" or "admin"
    pub exp: i64,         // Expiration timestamp
    pub iat: i64,         // Issued at timestamp
    pub iss: String,      // Issuer
    pub jti: String,      // JWT ID (unique token identifier)
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// JWT Service - creates and verifies JWT tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_seconds: i64,
}

impl JwtService {
    /// Create new JWT service with secret, issuer and token lifetime
    pub fn new(secret: &str, issuer: String, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_seconds,
        }
    }

    /// Create a new JWT token for a user
    pub fn create_token(&self, user_id: i64, username: &str, role: &str) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.ttl_seconds);

        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            username: username.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(), // Unique token ID
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a JWT token
    ///
    /// Returns claims if token is valid, not expired and issued by us
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

    const WEEK_SECONDS: i64 = 7 * 86_400;

    fn service() -> JwtService {
        JwtService::new("test_secret_key", "test_issuer".to_string(), WEEK_SECONDS)
    }

    #[test]
    fn test_create_and_verify_token() {
        let token = service().create_token(42, "alice", ROLE_ADMIN).unwrap();

        let claims = service().verify_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "admin");
        assert!(claims.is_admin());
        assert_eq!(claims.iss, "test_issuer");
    }

    #[test]
    fn test_invalid_token() {
        let result = service().verify_token("invalid_token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new("secret1", "test_issuer".to_string(), WEEK_SECONDS);
        let service2 = JwtService::new("secret2", "test_issuer".to_string(), WEEK_SECONDS);

        let token = service1.create_token(1, "alice", ROLE_USER).unwrap();

        // Token created with secret1 should not verify with secret2
        let result = service2.verify_token(&token);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let other = JwtService::new("test_secret_key", "someone_else".to_string(), WEEK_SECONDS);

        let token = service().create_token(1, "alice", ROLE_USER).unwrap();
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_token_lifetime_follows_configuration() {
        let token = service().create_token(1, "alice", ROLE_USER).unwrap();
        let claims = service().verify_token(&token).unwrap();

        // Token should expire in ~7 days
        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;
        assert!(expires_in > WEEK_SECONDS - 3_600);
        assert!(expires_in <= WEEK_SECONDS);
    }

    #[test]
    fn test_regular_user_is_not_admin() {
        let token = service().create_token(7, "bob", ROLE_USER).unwrap();
        let claims = service().verify_token(&token).unwrap();
        assert!(!claims.is_admin());
    }
}
