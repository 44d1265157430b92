use std::sync::Arc;

use flickvault_core::{
    AccountService, Authenticator, CatalogStore, Config, SanitizedConfig, TrendingCache,
    TrendingStore, UserStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    catalog: Arc<dyn CatalogStore>,
    users: Arc<dyn UserStore>,
    accounts: Arc<AccountService>,
    trending: Arc<TrendingCache>,
    trending_store: Arc<dyn TrendingStore>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        catalog: Arc<dyn CatalogStore>,
        users: Arc<dyn UserStore>,
        accounts: Arc<AccountService>,
        trending: Arc<TrendingCache>,
        trending_store: Arc<dyn TrendingStore>,
    ) -> Self {
        Self {
            config,
            authenticator,
            catalog,
            users,
            accounts,
            trending,
            trending_store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn accounts(&self) -> &AccountService {
        self.accounts.as_ref()
    }

    pub fn trending(&self) -> &TrendingCache {
        self.trending.as_ref()
    }

    /// Storage behind the trending cache, read when collecting metrics.
    pub fn trending_store(&self) -> &dyn TrendingStore {
        self.trending_store.as_ref()
    }
}
