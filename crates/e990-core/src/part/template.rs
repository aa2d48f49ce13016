//! Remote URL template with `{year}` and `{part}` placeholders.

use anyhow::{bail, Context, Result};
use std::fmt;

use super::{sanitize_filename_for_linux, ArchivePart};
use crate::years::FIRST_RELEASE_YEAR;

/// Historical IRS endpoint for the e-file 990 XML bulk archives.
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://apps.irs.gov/pub/epostcard/990/xml/{year}/download990xml_{year}_{part}.zip";

const YEAR_PLACEHOLDER: &str = "{year}";
const PART_PLACEHOLDER: &str = "{part}";

/// Validated URL template. Both placeholders must appear and the expanded URL
/// must be an absolute http(s) URL whose path ends in a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

impl UrlTemplate {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !raw.contains(YEAR_PLACEHOLDER) {
            bail!("URL template is missing {}: {}", YEAR_PLACEHOLDER, raw);
        }
        if !raw.contains(PART_PLACEHOLDER) {
            bail!("URL template is missing {}: {}", PART_PLACEHOLDER, raw);
        }
        let template = Self {
            raw: raw.to_string(),
        };

        let sample = template.url(ArchivePart::first(FIRST_RELEASE_YEAR));
        let parsed = url::Url::parse(&sample)
            .with_context(|| format!("URL template does not expand to a valid URL: {}", raw))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => bail!("URL template must use http or https, got {}", other),
        }
        if last_path_segment(&parsed).is_none() {
            bail!("URL template must end in a file name: {}", raw);
        }
        Ok(template)
    }

    /// Remote URL for one archive part.
    pub fn url(&self, part: ArchivePart) -> String {
        self.raw
            .replace(YEAR_PLACEHOLDER, &part.year.to_string())
            .replace(PART_PLACEHOLDER, &part.part.to_string())
    }

    /// Local file name for one archive part: the URL's last path segment.
    ///
    /// Falls back to `download990xml_{year}_{part}.zip` if the segment
    /// sanitizes to nothing.
    pub fn file_name(&self, part: ArchivePart) -> String {
        url::Url::parse(&self.url(part))
            .ok()
            .and_then(|u| last_path_segment(&u))
            .map(|s| sanitize_filename_for_linux(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("download990xml_{}_{}.zip", part.year, part.part))
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        Self {
            raw: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn last_path_segment(url: &url::Url) -> Option<String> {
    let segment = url.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
