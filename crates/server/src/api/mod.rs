pub mod handlers;
pub mod media;
pub mod middleware;
pub mod movies;
pub mod response;
pub mod routes;
pub mod shows;
pub mod trending;
pub mod users;
pub mod watchlist;

pub use routes::create_router;
