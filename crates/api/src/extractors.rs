//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use mantel_common::{AppError, Pagination, PaginationDefaults};
use serde::Deserialize;

/// Acting user id placed in the request extensions by [`crate::middleware::auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

/// Authenticated user extractor.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| Self(user.0))
            .ok_or(AppError::Unauthorized)
    }
}

/// Raw listing parameters. Everything is kept as text so that bad values fall
/// back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Raw `page`.
    pub page: Option<String>,
    /// Raw `page_size`.
    pub page_size: Option<String>,
    /// Raw `sort`, mapped onto an allow-listed ordering by each endpoint.
    pub sort: Option<String>,
    /// `sent` or `received`, for pending friend requests.
    pub by: Option<String>,
}

impl ListQuery {
    /// Normalized pagination, falling back to `defaults`.
    #[must_use]
    pub fn pagination(&self, defaults: PaginationDefaults) -> Pagination {
        Pagination::from_query(self.page.as_deref(), self.page_size.as_deref(), defaults)
    }

    /// Raw sort value, if any.
    #[must_use]
    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_pagination() {
        let query = ListQuery {
            page: Some("3".to_string()),
            page_size: Some("junk".to_string()),
            ..Default::default()
        };
        let page = query.pagination(PaginationDefaults::default());
        assert_eq!(page, Pagination::new(3, 20));
    }
}
