//! Response classification: real archive vs. end-of-series HTML page.
//!
//! Once a year's part numbers run past what exists, the IRS host answers with
//! an HTML error page instead of a zip. The classifier looks at the leading
//! bytes of what was fetched and decides which of the two it is.

/// Metadata of the HTTP response that produced (or confirmed) a local artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// Final HTTP status after redirects (304 for a not-modified response).
    pub status: u32,
    /// `Content-Type` value if the server sent one.
    pub content_type: Option<String>,
    /// `Last-Modified` as Unix seconds, if the server sent one.
    pub last_modified: Option<i64>,
}

/// Outcome of classifying one fetched artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Genuine archive content; keep it.
    Archive,
    /// HTML fallback page; the year's series is complete and the artifact is discarded.
    EndOfSeries,
}

/// Decides from response metadata and leading bytes whether an artifact is real data.
pub trait ResponseClassifier {
    fn classify(&self, meta: &ResponseMeta, leading: &[u8]) -> Classification;
}

impl<F> ResponseClassifier for F
where
    F: Fn(&ResponseMeta, &[u8]) -> Classification,
{
    fn classify(&self, meta: &ResponseMeta, leading: &[u8]) -> Classification {
        self(meta, leading)
    }
}

/// Default marker searched for in the leading bytes.
pub const DEFAULT_END_MARKER: &str = "html";

/// Classifies by substring: the marker anywhere in the leading bytes means end
/// of series. File extension and declared content type are ignored.
///
/// Matching ignores ASCII case, so `<HTML>` pages count as well as `<html>`.
/// A plain case-sensitive `grep html` would keep those. The cost is that an
/// archive whose first lines happen to contain `HTML` (a member named
/// `INDEX.HTML`, say) is also read as the end of the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClassifier {
    marker: Vec<u8>,
}

impl MarkerClassifier {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.as_bytes().to_ascii_lowercase(),
        }
    }

    pub fn contains_marker(&self, leading: &[u8]) -> bool {
        if self.marker.is_empty() || leading.len() < self.marker.len() {
            return false;
        }
        leading
            .windows(self.marker.len())
            .any(|w| w.eq_ignore_ascii_case(&self.marker))
    }
}

impl Default for MarkerClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_END_MARKER)
    }
}

impl ResponseClassifier for MarkerClassifier {
    fn classify(&self, _meta: &ResponseMeta, leading: &[u8]) -> Classification {
        if self.contains_marker(leading) {
            Classification::EndOfSeries
        } else {
            Classification::Archive
        }
    }
}
