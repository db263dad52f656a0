//! The day window shared by every series on the chart.

use chrono::{Datelike, Days, NaiveDate};

/// `past_days` before the reference date, then `forecast_days` starting at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub reference: NaiveDate,
    pub past_days: u32,
    pub forecast_days: u32,
}

impl DateWindow {
    pub fn new(reference: NaiveDate, past_days: u32, forecast_days: u32) -> Self {
        Self {
            reference,
            past_days,
            forecast_days,
        }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference.year()
    }

    pub fn len(&self) -> usize {
        (self.past_days + self.forecast_days) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn start(&self) -> NaiveDate {
        start_for(self.reference, self.past_days)
    }

    /// Last day of the window, inclusive. Equals `start() - 1` for an empty window.
    pub fn end(&self) -> NaiveDate {
        end_for(self.reference, self.past_days, self.forecast_days)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let start = self.start();
        (0..self.len() as u64)
            .filter_map(|offset| start.checked_add_days(Days::new(offset)))
            .collect()
    }

    /// The same window with its reference date moved into `year`.
    pub fn archive_range(&self, year: i32) -> (NaiveDate, NaiveDate) {
        let reference = shift_year(self.reference, year);
        (
            start_for(reference, self.past_days),
            end_for(reference, self.past_days, self.forecast_days),
        )
    }

    /// How many previous years exist between `earliest_year` and the reference year.
    pub fn available_years(&self, earliest_year: i32) -> u32 {
        u32::try_from(self.reference_year() - earliest_year).unwrap_or(0)
    }
}

fn start_for(reference: NaiveDate, past_days: u32) -> NaiveDate {
    reference
        .checked_sub_days(Days::new(u64::from(past_days)))
        .unwrap_or(reference)
}

fn end_for(reference: NaiveDate, past_days: u32, forecast_days: u32) -> NaiveDate {
    let start = start_for(reference, past_days);
    let len = u64::from(past_days + forecast_days);
    if len == 0 {
        return start.pred_opt().unwrap_or(start);
    }
    start.checked_add_days(Days::new(len - 1)).unwrap_or(start)
}

/// 29 February becomes 28 February in non-leap years.
fn shift_year(date: NaiveDate, year: i32) -> NaiveDate {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_axis_length_matches_window() {
        let window = DateWindow::new(date(2025, 7, 15), 20, 10);
        let dates = window.dates();
        assert_eq!(window.len(), 30);
        assert_eq!(dates.len(), 30);
        assert_eq!(dates[0], date(2025, 6, 25));
        assert_eq!(dates[20], date(2025, 7, 15));
        assert_eq!(*dates.last().unwrap(), date(2025, 7, 24));
        assert_eq!(window.end(), date(2025, 7, 24));
    }

    #[test]
    fn test_axis_length_for_other_windows() {
        for (past, fwd) in [(0, 1), (30, 0), (7, 16), (92, 16)] {
            let window = DateWindow::new(date(2024, 1, 3), past, fwd);
            assert_eq!(window.dates().len(), (past + fwd) as usize);
        }
    }

    #[test]
    fn test_window_crosses_year_boundary() {
        let window = DateWindow::new(date(2025, 1, 5), 20, 10);
        assert_eq!(window.start(), date(2024, 12, 16));
    }

    #[test]
    fn test_archive_range_has_same_length() {
        let window = DateWindow::new(date(2025, 7, 15), 20, 10);
        let (start, end) = window.archive_range(2003);
        assert_eq!(start, date(2003, 6, 25));
        assert_eq!(end, date(2003, 7, 24));
        assert_eq!((end - start).num_days() + 1, window.len() as i64);
    }

    #[test]
    fn test_archive_range_from_leap_day() {
        let window = DateWindow::new(date(2024, 2, 29), 1, 2);
        let (start, end) = window.archive_range(2023);
        assert_eq!(start, date(2023, 2, 27));
        assert_eq!(end, date(2023, 3, 1));
    }

    #[test]
    fn test_available_years() {
        let window = DateWindow::new(date(2025, 7, 15), 20, 10);
        assert_eq!(window.available_years(2000), 25);
        assert_eq!(window.available_years(2030), 0);
    }

    #[test]
    fn test_empty_window() {
        let window = DateWindow::new(date(2025, 7, 15), 0, 0);
        assert!(window.is_empty());
        assert!(window.dates().is_empty());
    }
}
