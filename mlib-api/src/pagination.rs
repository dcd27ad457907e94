//! Pagination utilities for song listings
//!
//! Limits and offsets arrive as raw query strings. Anything missing,
//! unparseable or out of range falls back to a sane bound instead of failing
//! the request.

/// Page size when `limit` is absent or invalid
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page a single request may ask for
pub const MAX_LIMIT: i64 = 100;

/// Normalized LIMIT/OFFSET pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Sanitize a requested limit/offset
    ///
    /// # Examples
    /// ```
    /// use mlib_api::pagination::Page;
    ///
    /// let p = Page::new(Some(2), Some(4));
    /// assert_eq!((p.limit, p.offset), (2, 4));
    ///
    /// // Non-positive limit and negative offset fall back to defaults
    /// let p = Page::new(Some(0), Some(-3));
    /// assert_eq!((p.limit, p.offset), (10, 0));
    /// ```
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let offset = match offset {
            Some(o) if o >= 0 => o,
            _ => 0,
        };

        Self { limit, offset }
    }

    /// Build a page straight from raw query-string values
    pub fn from_params(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self::new(parse_param(limit), parse_param(offset))
    }
}

fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}
