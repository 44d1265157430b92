use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use flickvault_core::config::CorsConfig;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{handlers, media, movies, shows, trending, users, watchlist};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes requiring a bearer token
    let protected_routes = Router::new()
        .route("/user/details", get(users::details))
        .route("/user/watchlist", get(watchlist::get_watchlist))
        .route(
            "/user/watchlist/{id}",
            post(watchlist::add_to_watchlist).delete(watchlist::remove_from_watchlist),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Trending
        .route("/trending", get(trending::get_trending))
        // Movies
        .route("/movies", get(movies::list_movies))
        .route("/movies/search", get(movies::search_movies))
        .route("/movies/urls/{id}", get(movies::get_movie_urls))
        .route("/movies/cast/{id}", get(movies::get_movie_cast))
        .route("/movies/{id}", get(movies::get_movie))
        // TV shows
        .route("/tvshows", get(shows::list_shows))
        .route("/tvshows/search", get(shows::search_shows))
        .route("/tvshows/urls/{id}", get(shows::get_show_urls))
        .route("/tvshows/cast/{id}", get(shows::get_show_cast))
        .route("/tvshows/{id}", get(shows::get_show))
        // Combined search
        .route("/media", get(media::search_media))
        // Accounts
        .route("/user/register", post(users::register))
        .route("/user/login", post(users::login))
        .route("/user/logout", get(users::logout))
        .merge(protected_routes)
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config().cors))
}

/// CORS restricted to the configured origins, with credentials allowed.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
