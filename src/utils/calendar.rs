//! Month arithmetic for trend reports.

use chrono::{Datelike, Months, NaiveDate};

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First days of the `count` months ending with the one containing `today`,
/// oldest first.
pub fn trailing_months(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    let current = month_start(today);
    (0..count)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

/// `YYYY-MM` bucket key
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_months_cross_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let keys: Vec<String> = trailing_months(today, 6).into_iter().map(month_key).collect();
        assert_eq!(keys, ["2023-09", "2023-10", "2023-11", "2023-12", "2024-01", "2024-02"]);
    }

    #[test]
    fn test_month_start() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(month_start(date), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
