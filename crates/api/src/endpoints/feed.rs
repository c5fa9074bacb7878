//! Feed endpoint.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use mantel_common::{AppResult, PageMeta};
use mantel_db::views::PostSummary;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, ListQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// Feed page.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    /// Posts, newest first.
    pub feed: Vec<PostSummary>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// The caller's feed, newest first.
async fn feed(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<FeedResponse>> {
    let page = query.pagination(state.pagination);
    let feed = state.feed_service.fetch(user_id, page).await?;

    Ok(ApiResponse::ok(FeedResponse {
        feed,
        meta: page.meta(),
    }))
}

/// Routes for feed.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}
