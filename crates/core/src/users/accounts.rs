//! Registration, login and logout.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::{User, UserError, UserStore};
use crate::auth::{
    hash_password, validate_email, validate_password_strength, verify_password, AuthError,
    IssuedToken, TokenManager,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] UserError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Account operations over a user store and token manager.
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenManager>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenManager>) -> Self {
        Self { users, tokens }
    }

    /// Validate credentials and create the account.
    pub fn register(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let email = email.trim();
        if !validate_email(email) {
            return Err(AccountError::InvalidEmail);
        }
        validate_password_strength(password).map_err(AccountError::WeakPassword)?;

        let password_hash = hash_password(password)?;
        let user = self.users.create_user(email, &password_hash)?;
        info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Check credentials and issue an access token.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AccountError> {
        let user = self
            .users
            .find_by_email(email.trim())?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Password mismatch");
            return Err(AccountError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&user)?;
        debug!(user_id = %user.id, jti = %issued.claims.jti, "Issued access token");
        Ok(issued)
    }

    /// Revoke a presented token.
    ///
    /// Returns `false` when the token does not verify, so there is nothing to revoke.
    pub fn logout(&self, token: &str) -> Result<bool, AccountError> {
        let claims = match self.tokens.decode(token) {
            Ok(claims) => claims,
            Err(_) => return Ok(false),
        };

        self.users.revoke_token(&claims.jti, claims.expires_at())?;
        info!(user_id = %claims.sub, "Revoked access token");
        Ok(true)
    }

    pub fn user(&self, id: &str) -> Result<Option<User>, AccountError> {
        Ok(self.users.get_user(id)?)
    }
}
