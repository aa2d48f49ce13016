//! IMF-fixdate formatting for `If-Modified-Since`.

use chrono::{TimeZone, Utc};

/// Formats Unix seconds as an HTTP date, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`.
pub fn format_http_date(secs: i64) -> Option<String> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|t| t.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}
