//! Article normalization applied to every collected article before rendering.
//!
//! [`normalize`] is pure and idempotent: running it on its own output returns
//! the same article.

use crate::models::Article;
use crate::utils::truncate_chars;
use chrono::{DateTime, NaiveDate};

/// Longest description kept before the ellipsis is appended.
pub const DESCRIPTION_LIMIT: usize = 200;

/// Marker appended to truncated descriptions.
pub const ELLIPSIS: char = '…';

/// Rewrite an article into its display form.
///
/// - `description` is cut to [`DESCRIPTION_LIMIT`] characters plus [`ELLIPSIS`]
/// - `pub_date` becomes `YYYY-MM-DD` when it parses, otherwise it is kept as is
/// - `originallink` is dropped when it is empty or equal to `link`
pub fn normalize(article: Article) -> Article {
    let Article {
        title,
        link,
        originallink,
        description,
        pub_date,
    } = article;
    let originallink = originallink.filter(|o| !o.is_empty() && *o != link);

    Article {
        title,
        originallink,
        description: truncate_description(&description),
        pub_date: calendar_date(&pub_date),
        link,
    }
}

/// Cut a description to [`DESCRIPTION_LIMIT`] characters, marking the cut.
pub fn truncate_description(description: &str) -> String {
    match truncate_chars(description, DESCRIPTION_LIMIT) {
        (kept, true) => format!("{kept}{ELLIPSIS}"),
        (kept, false) => kept.to_string(),
    }
}

/// Format a publish date as `YYYY-MM-DD` in the date's own offset.
///
/// Accepts RFC 2822 (what the search API returns) and RFC 3339. Anything else,
/// including an already formatted date, is returned unchanged.
pub fn calendar_date(raw: &str) -> String {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .map(|dt| dt.date_naive())
        .map(format_date)
        .unwrap_or_else(|_| raw.to_string())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
