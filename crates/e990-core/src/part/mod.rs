//! Archive part identity and remote/local naming.
//!
//! A part is addressed by `(year, part)`. Its remote URL comes from a
//! [`UrlTemplate`]; its local file name is the last path segment of that URL,
//! sanitized for Linux filesystems.

mod sanitize;
mod template;

pub use sanitize::sanitize_filename_for_linux;
pub use template::{UrlTemplate, DEFAULT_URL_TEMPLATE};

use std::fmt;

/// One numbered archive within a year's data release. Part numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchivePart {
    pub year: i32,
    pub part: u32,
}

impl ArchivePart {
    pub fn new(year: i32, part: u32) -> Self {
        Self { year, part }
    }

    /// First part of a year's series.
    pub fn first(year: i32) -> Self {
        Self::new(year, 1)
    }

    /// Next part number in the same year.
    pub fn next(self) -> Self {
        Self::new(self.year, self.part + 1)
    }
}

impl fmt::Display for ArchivePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} part {}", self.year, self.part)
    }
}
