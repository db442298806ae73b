//! Authenticated caller and JWT verification
//!
//! The transport layer verifies the bearer token and inserts the resulting
//! [Principal] into the request data; voters read it back through the
//! [ExecutionContext](crate::graphql::ExecutionContext).

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

/// The caller a request runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Claims carried by access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64,
}

/// Verify an HS256 token and extract the principal.
pub fn verify_token(token: &str, secret: &str) -> Result<Principal> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_aud = false;

    let token_data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(secret.trim().as_bytes()),
        &validation,
    )
    .context("Invalid token")?;

    tracing::debug!(user_id = %token_data.claims.sub, "JWT verified");

    Ok(Principal {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
        roles: token_data.claims.roles,
    })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn token(secret: &str, exp: i64) -> String {
        let claims = AccessTokenClaims {
            sub: "user-1".into(),
            email: Some("ada@example.com".into()),
            roles: vec!["admin".into()],
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn far_future() -> i64 {
        // 2100-01-01
        4_102_444_800
    }

    #[test]
    fn test_verify_token_roundtrip() {
        let principal = verify_token(&token("s3cret", far_future()), "s3cret").unwrap();
        assert_eq!(principal.user_id, "user-1");
        assert_eq!(principal.email.as_deref(), Some("ada@example.com"));
        assert!(principal.has_role("admin"));
        assert!(!principal.has_role("member"));
    }

    #[test]
    fn test_verify_token_rejects_wrong_secret() {
        assert!(verify_token(&token("s3cret", far_future()), "other").is_err());
    }

    #[test]
    fn test_verify_token_rejects_expired() {
        assert!(verify_token(&token("s3cret", 1_000), "s3cret").is_err());
    }
}
