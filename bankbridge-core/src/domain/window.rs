use chrono::{Datelike, Duration, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-date range sent to a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `days` days back from `today`, ending on `today`
    pub fn trailing_days(today: NaiveDate, days: i64) -> Self {
        Self {
            start: today - Duration::days(days),
            end: today,
        }
    }

    /// First day of `today`'s month through `today`
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        }
    }

    /// Start date as `YYYY-MM-DD`
    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// End date as `YYYY-MM-DD`
    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trailing_window_is_exactly_thirty_days() {
        let mut today = date(2023, 12, 1);
        // Walk a little over a year, covering month ends and a leap day
        for _ in 0..460 {
            let window = DateWindow::trailing_days(today, 30);
            assert_eq!((window.end - window.start).num_days(), 30);
            assert_eq!(window.end, today);
            today = today.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_trailing_window_crosses_year_boundary() {
        let window = DateWindow::trailing_days(date(2024, 1, 15), 30);
        assert_eq!(window.start_param(), "2023-12-16");
        assert_eq!(window.end_param(), "2024-01-15");
    }

    #[test]
    fn test_trailing_window_over_leap_day() {
        let window = DateWindow::trailing_days(date(2024, 3, 1), 30);
        assert_eq!(window.start_param(), "2024-01-31");
    }

    #[test]
    fn test_month_to_date() {
        let window = DateWindow::month_to_date(date(2025, 2, 17));
        assert_eq!(window.start_param(), "2025-02-01");
        assert_eq!(window.end_param(), "2025-02-17");
    }

    #[test]
    fn test_month_to_date_on_first_of_month() {
        let window = DateWindow::month_to_date(date(2025, 7, 1));
        assert_eq!(window.start, window.end);
    }

    #[test]
    fn test_params_are_zero_padded() {
        let window = DateWindow::trailing_days(date(2025, 1, 9), 0);
        assert_eq!(window.start_param(), "2025-01-09");
    }
}
