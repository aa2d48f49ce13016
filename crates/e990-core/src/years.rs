//! Inclusive range of release years to harvest.
//!
//! The upper bound is normally the current calendar year read from the local
//! clock, but can be injected so the range logic stays testable.

use chrono::Datelike;

/// First year the IRS published e-file 990 bulk archives.
pub const FIRST_RELEASE_YEAR: i32 = 2015;

/// Ascending, inclusive `[start, end]` sequence of years. Empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// `[start, current calendar year]` from the local clock.
    pub fn through_current(start: i32) -> Self {
        Self::new(start, current_year())
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::through_current(FIRST_RELEASE_YEAR)
    }
}

impl IntoIterator for YearRange {
    type Item = i32;
    type IntoIter = std::ops::RangeInclusive<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive_and_ascending() {
        let years: Vec<i32> = YearRange::new(2015, 2019).into_iter().collect();
        assert_eq!(years, vec![2015, 2016, 2017, 2018, 2019]);
    }

    #[test]
    fn single_year_range() {
        let r = YearRange::new(2024, 2024);
        assert_eq!(r.len(), 1);
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![2024]);
    }

    #[test]
    fn start_after_end_is_empty() {
        let r = YearRange::new(2030, 2024);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.iter().count(), 0);
    }

    #[test]
    fn through_current_ends_at_clock_year() {
        let r = YearRange::through_current(FIRST_RELEASE_YEAR);
        assert_eq!(r.start, 2015);
        assert_eq!(r.end, current_year());
        assert!(r.end >= 2015);
    }
}
