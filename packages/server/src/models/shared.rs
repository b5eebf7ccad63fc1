use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

pub const DEFAULT_PAGE_SIZE: u64 = 30;
pub const MAX_PAGE_SIZE: u64 = 200;
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 30)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 2)]
    pub total_pages: u64,
}

/// `page` / `page_size` query parameters shared by every list endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
pub struct PageParams {
    /// 1-based page number. Default: 1.
    pub page: Option<u64>,
    /// Items per page. Default: 30, maximum: 200.
    pub page_size: Option<u64>,
}

impl PageParams {
    pub fn page(&self) -> u64 {
        Ord::max(self.page.unwrap_or(1), 1)
    }

    pub fn per_page(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset, capped at the largest value Postgres accepts for `OFFSET`.
    pub fn offset(&self) -> u64 {
        (self.page() - 1)
            .saturating_mul(self.per_page())
            .min(MAX_OFFSET)
    }

    pub fn pagination(&self, total: u64) -> Pagination {
        let per_page = self.per_page();
        Pagination {
            page: self.page(),
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Lower-cased `%term%` pattern for a case-insensitive substring search, or
/// `None` when the term is blank.
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = escape_like(search?.trim());
    if term.is_empty() {
        None
    } else {
        Some(format!("%{}%", term.to_lowercase()))
    }
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed title (1-255 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 255 {
        return Err(AppError::field("title", "Title must be 1-255 characters"));
    }
    Ok(())
}

/// Validate a password length (8-128 bytes).
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::field(
            "password",
            "Password must be 8-128 characters",
        ));
    }
    Ok(())
}

/// Minimal address check: exactly one `@` with non-empty parts and no whitespace.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid || email.chars().count() > 254 {
        return Err(AppError::field("email", "Enter a valid email address"));
    }
    Ok(())
}
