//! HS256 access tokens.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthError, AuthRequest, Authenticator, Identity};
use crate::config::AuthConfig;
use crate::users::{User, UserStore};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique token id, used for revocation.
    pub jti: String,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// A freshly signed token and its claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies access tokens.
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, ttl_secs: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::ConfigurationError(
                "token secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(&config.token_secret, config.token_ttl_secs)
    }

    /// Sign a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = self.sign(&claims)?;
        Ok(IssuedToken { token, claims })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidCredentials(format!("Invalid token: {e}")))
    }
}

/// Authenticator that accepts bearer access tokens that have not been revoked.
pub struct JwtAuthenticator {
    tokens: Arc<TokenManager>,
    users: Arc<dyn UserStore>,
}

impl JwtAuthenticator {
    pub fn new(tokens: Arc<TokenManager>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let token = request.bearer_token().ok_or(AuthError::NotAuthenticated)?;
        let claims = self.tokens.decode(token)?;

        let revoked = self
            .users
            .is_token_revoked(&claims.jti)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if revoked {
            return Err(AuthError::TokenRevoked);
        }

        let mut identity_claims = HashMap::new();
        identity_claims.insert("email".to_string(), serde_json::json!(claims.email));
        identity_claims.insert("jti".to_string(), serde_json::json!(claims.jti));
        identity_claims.insert("exp".to_string(), serde_json::json!(claims.exp));

        Ok(Identity {
            user_id: claims.sub,
            method: self.method_name().to_string(),
            claims: identity_claims,
        })
    }

    fn method_name(&self) -> &'static str {
        "jwt"
    }
}
