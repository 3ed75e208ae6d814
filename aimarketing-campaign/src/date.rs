//! Relative rendering of event dates for prompts.

use chrono::NaiveDate;

/// Describe `date` relative to `today`.
///
/// Past dates read `3 days ago`, `a week ago`, `5 months ago`, `2 years ago`;
/// future dates read `in 4 days` and so on. Months count as 30 days and
/// years as 365.
pub fn humanize_date(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        -1 => "tomorrow".to_string(),
        days if days > 0 => format!("{} ago", span(days)),
        days => format!("in {}", span(-days)),
    }
}

fn span(days: i64) -> String {
    match days {
        0..7 => count(days, "day"),
        7..30 => count(days / 7, "week"),
        30..365 => count(days / 30, "month"),
        _ => count(days / 365, "year"),
    }
}

fn count(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("a {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_and_neighbours() {
        let today = ymd(2023, 5, 22);
        assert_eq!(humanize_date(today, today), "today");
        assert_eq!(humanize_date(ymd(2023, 5, 21), today), "yesterday");
        assert_eq!(humanize_date(ymd(2023, 5, 23), today), "tomorrow");
    }

    #[test]
    fn days_and_weeks_ago() {
        let today = ymd(2023, 5, 22);
        assert_eq!(humanize_date(ymd(2023, 5, 19), today), "3 days ago");
        assert_eq!(humanize_date(ymd(2023, 5, 15), today), "a week ago");
        assert_eq!(humanize_date(ymd(2023, 5, 1), today), "3 weeks ago");
    }

    #[test]
    fn months_and_years_ago() {
        let today = ymd(2023, 5, 22);
        assert_eq!(humanize_date(ymd(2022, 12, 1), today), "5 months ago");
        assert_eq!(humanize_date(ymd(2023, 4, 20), today), "a month ago");
        assert_eq!(humanize_date(ymd(2022, 5, 1), today), "a year ago");
        assert_eq!(humanize_date(ymd(2019, 1, 1), today), "4 years ago");
    }

    #[test]
    fn future_dates() {
        let today = ymd(2023, 5, 22);
        assert_eq!(humanize_date(ymd(2023, 5, 26), today), "in 4 days");
        assert_eq!(humanize_date(ymd(2023, 8, 1), today), "in 2 months");
        assert_eq!(humanize_date(ymd(2025, 6, 1), today), "in 2 years");
    }
}
