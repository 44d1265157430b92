//! User accounts, revoked access tokens and watchlists.

mod accounts;
mod sqlite;
mod types;

pub use accounts::{AccountError, AccountService};
pub use sqlite::SqliteUserStore;
pub use types::*;

use chrono::{DateTime, Utc};

/// Trait for user storage.
pub trait UserStore: Send + Sync {
    /// Create an account. Emails are unique ignoring case.
    fn create_user(&self, email: &str, password_hash: &str) -> Result<User, UserError>;

    /// Look up an account by email, ignoring case.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    fn get_user(&self, id: &str) -> Result<Option<User>, UserError>;

    /// Mark a token id as revoked until `expires_at`.
    fn revoke_token(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), UserError>;

    fn is_token_revoked(&self, jti: &str) -> Result<bool, UserError>;

    /// Catalog ids on the user's watchlist, oldest first.
    fn watchlist(&self, user_id: &str) -> Result<Vec<String>, UserError>;

    /// Append an item. Fails with `AlreadyInWatchlist` when present.
    fn add_to_watchlist(&self, user_id: &str, item_id: &str) -> Result<(), UserError>;

    /// Remove an item, returning whether it was present.
    fn remove_from_watchlist(&self, user_id: &str, item_id: &str) -> Result<bool, UserError>;
}
