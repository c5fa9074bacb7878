//! Business logic services.

pub mod feed;
pub mod following;
pub mod friendship;
pub mod like;
pub mod post;
pub mod user;

pub use feed::FeedService;
pub use following::{FollowResult, FollowingService};
pub use friendship::{FriendRequestResult, FriendshipService};
pub use like::{LikeResult, LikeService};
pub use post::{PostInput, PostService};
pub use user::{UserProfile, UserService};
