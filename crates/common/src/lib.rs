//! Common utilities and shared types for mantel.
//!
//! This crate provides foundational components used across all mantel crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Pagination**: Page normalization and allow-listed sort keys via [`Pagination`]
//!
//! # Example
//!
//! ```no_run
//! use mantel_common::{AppResult, Config, Pagination};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let page = Pagination::from_query(Some("2"), None, config.pagination.into());
//!     println!("offset: {}", page.offset());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pagination;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pagination::{
    PageMeta, Pagination, PaginationDefaults, SortDirection, TimeSort, UserSort,
};
