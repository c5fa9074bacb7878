//! Pagination contract shared by every list operation.
//!
//! Raw `page`/`page_size` query values are normalized into a [`Pagination`]
//! and raw `sort` values into one of the closed sort enums below. Only the
//! enums ever reach the query layer.

use serde::Serialize;

/// Caller-supplied fallbacks for missing or invalid pagination input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationDefaults {
    /// Page used when the input is absent or invalid.
    pub page: u64,
    /// Page size used when the input is absent or invalid.
    pub page_size: u64,
    /// Upper bound applied to any requested page size.
    pub max_page_size: u64,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Largest value a limit or offset may take; `PostgreSQL` binds both as `BIGINT`.
const MAX_BIND: u64 = i64::MAX.unsigned_abs();

/// A normalized page request.
///
/// Both fields are at least 1, and `limit()` and `offset()` always fit in an
/// `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
}

/// `{page, page_size}` metadata returned next to paginated payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// Page that was served.
    pub page: u64,
    /// Page size that was applied.
    pub page_size: u64,
}

impl Pagination {
    /// Build a pagination value.
    ///
    /// Zero inputs are raised to 1. The page size is capped at `i64::MAX`
    /// and the page so that `(page - 1) * page_size` stays within `i64::MAX`.
    #[must_use]
    pub const fn new(page: u64, page_size: u64) -> Self {
        let page_size = if page_size == 0 {
            1
        } else if page_size > MAX_BIND {
            MAX_BIND
        } else {
            page_size
        };
        let last_page = MAX_BIND / page_size + 1;
        let page = if page == 0 {
            1
        } else if page > last_page {
            last_page
        } else {
            page
        };

        Self { page, page_size }
    }

    /// Normalize raw query-string values.
    ///
    /// Missing, unparsable, zero or negative values fall back to `defaults`;
    /// the page size is clamped to `defaults.max_page_size`.
    #[must_use]
    pub fn from_query(
        page: Option<&str>,
        page_size: Option<&str>,
        defaults: PaginationDefaults,
    ) -> Self {
        let page = parse_positive(page).unwrap_or(defaults.page);
        let page_size = parse_positive(page_size)
            .unwrap_or(defaults.page_size)
            .min(defaults.max_page_size);

        Self::new(page, page_size)
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        let offset = self.page.saturating_sub(1).saturating_mul(self.page_size);
        if offset > MAX_BIND {
            MAX_BIND
        } else {
            offset
        }
    }

    /// Number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        if self.page_size > MAX_BIND {
            MAX_BIND
        } else {
            self.page_size
        }
    }

    /// Metadata for the response envelope.
    #[must_use]
    pub const fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        let defaults = PaginationDefaults::default();
        Self::new(defaults.page, defaults.page_size)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|n| *n >= 1)
}

/// Direction of an allow-listed ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Ordering for user listings (followers, followees, friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSort {
    /// `username` A to Z.
    #[default]
    UsernameAsc,
    /// `username` Z to A.
    UsernameDesc,
}

impl UserSort {
    /// Parse a raw sort value. Unknown values select the default.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("username_desc") => Self::UsernameDesc,
            _ => Self::UsernameAsc,
        }
    }

    /// Direction applied to the sort column.
    #[must_use]
    pub const fn direction(self) -> SortDirection {
        match self {
            Self::UsernameAsc => SortDirection::Ascending,
            Self::UsernameDesc => SortDirection::Descending,
        }
    }
}

/// Chronological ordering on `created_at`.
///
/// Likes and pending requests default to [`TimeSort::Newest`]; a user's own
/// post listing defaults to [`TimeSort::Oldest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSort {
    /// Most recent first.
    Newest,
    /// Oldest first.
    Oldest,
}

impl TimeSort {
    /// Parse a raw sort value, falling back to `default` for unknown input.
    #[must_use]
    pub fn parse(raw: Option<&str>, default: Self) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("desc" | "newest" | "new") => Self::Newest,
            Some("asc" | "oldest" | "old") => Self::Oldest,
            _ => default,
        }
    }

    /// Direction applied to the sort column.
    #[must_use]
    pub const fn direction(self) -> SortDirection {
        match self {
            Self::Newest => SortDirection::Descending,
            Self::Oldest => SortDirection::Ascending,
        }
    }
}
