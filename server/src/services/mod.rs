//! Domain services behind the HTTP routes.
//!
//! Services take a `PgPool` (or an `UploadStore`) and return typed rows or a
//! per-service error enum; they know nothing about HTTP. This module also
//! holds the small helpers shared by the template and meme listings.

pub mod import;
pub mod meme;
pub mod template;
pub mod upload;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 12;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A validated page request: `page >= 1`, `1 <= limit <= MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Normalize raw query values. Missing or non-positive values fall back
    /// to page 1 and the default limit.
    #[must_use]
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    #[must_use]
    pub fn info(self, total: i64) -> Pagination {
        let pages = if total <= 0 { 0 } else { (total + self.limit - 1) / self.limit };
        Pagination { page: self.page, pages, total }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block returned next to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// Split a comma-separated tag list, trimming whitespace and dropping empties.
#[must_use]
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned).collect()
}

/// Trim a text filter and drop it when blank.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
#[must_use]
pub fn like_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
