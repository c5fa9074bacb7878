//! HTTP API layer for mantel.
//!
//! - **Endpoints**: follows, friendships, posts, likes and the feed under `/api`
//! - **Extractors**: acting user, raw listing parameters
//! - **Middleware**: acting-user resolution, shared [`AppState`]
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
