//! Repositories: one per table, plus the feed query.
//!
//! Every call goes through [`crate::deadline::run`], so a slow statement
//! surfaces as `AppError::Timeout` rather than hanging the caller.

pub mod feed;
pub mod following;
pub mod friendship;
pub mod like;
pub mod post;
pub mod user;

pub use feed::FeedRepository;
pub use following::FollowingRepository;
pub use friendship::{FriendshipRepository, RequestDirection};
pub use like::LikeRepository;
pub use post::PostRepository;
pub use user::UserRepository;

use mantel_common::{Pagination, SortDirection};
use sea_orm::Order;

/// Map an allow-listed direction onto the query builder's ordering.
pub(crate) const fn order(direction: SortDirection) -> Order {
    match direction {
        SortDirection::Ascending => Order::Asc,
        SortDirection::Descending => Order::Desc,
    }
}

/// `(limit, offset)` as bind values for raw statements.
pub(crate) fn bounds(page: &Pagination) -> (i64, i64) {
    (
        i64::try_from(page.limit()).unwrap_or(i64::MAX),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
    )
}
