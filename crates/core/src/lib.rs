pub mod auth;
pub mod catalog;
pub mod config;
pub mod external_catalog;
pub mod metrics;
pub mod testing;
pub mod trending;
pub mod users;

pub use auth::{
    AuthError, AuthRequest, Authenticator, Claims, Identity, JwtAuthenticator, TokenManager,
};
pub use catalog::{CatalogError, CatalogStore, MediaType, SqliteCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use external_catalog::{
    DisabledTrendingFeed, ExternalCatalogError, TmdbClient, TrendingFeed, TrendingFeedEntry,
};
pub use trending::{
    RefreshSummary, SqliteTrendingStore, TrendingCache, TrendingError, TrendingItem,
    TrendingSettings, TrendingStore,
};
pub use users::{AccountError, AccountService, SqliteUserStore, User, UserError, UserStore};
