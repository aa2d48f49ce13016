//! `e990 years` – print the effective year range.

use e990_core::years::YearRange;

pub fn run_years(range: YearRange) {
    if range.is_empty() {
        println!("No years in range {}..={}.", range.start, range.end);
        return;
    }
    for year in range {
        println!("{}", year);
    }
}
