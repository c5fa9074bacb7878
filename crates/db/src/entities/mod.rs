//! Database entities.

pub mod following;
pub mod friendship;
pub mod like;
pub mod post;
pub mod user;

pub use following::Entity as Following;
pub use friendship::Entity as Friendship;
pub use like::Entity as Like;
pub use post::Entity as Post;
pub use user::Entity as User;
