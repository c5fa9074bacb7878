//! API endpoints.

mod feed;
mod follows;
mod friendships;
mod posts;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/follows", follows::router())
        .nest("/friendships", friendships::router())
        .nest("/posts", posts::router())
        .nest("/users", users::router())
        .nest("/feed", feed::router())
}
