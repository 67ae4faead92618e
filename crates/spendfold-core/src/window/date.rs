use chrono::{Datelike, NaiveDate};

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_month(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Accepts the export's `YYYY-MM-DD` and the `DD/MM/YYYY` statement form.
pub fn parse_export_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if looks_like_iso_date(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok();
    }
    if looks_like_day_first_date(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%d/%m/%Y").ok();
    }
    None
}

pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    let current_month = i32::try_from(date.month()).unwrap_or(1);
    let mut raw_month = current_month + months;
    let mut year = date.year();

    while raw_month > 12 {
        raw_month -= 12;
        year += 1;
    }
    while raw_month < 1 {
        raw_month += 12;
        year -= 1;
    }

    let month_u32 = u32::try_from(raw_month).unwrap_or(1);
    let day = date.day().min(days_in_month(year, month_u32));
    if let Some(result) = NaiveDate::from_ymd_opt(year, month_u32, day) {
        return result;
    }
    date
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

fn looks_like_day_first_date(value: &str) -> bool {
    let parts = value.split('/').collect::<Vec<&str>>();
    if parts.len() != 3 {
        return false;
    }
    let [day, month, year] = [parts[0], parts[1], parts[2]];
    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    all_digits(day)
        && all_digits(month)
        && all_digits(year)
        && day.len() <= 2
        && month.len() <= 2
        && year.len() == 4
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{add_months_clamped, format_iso_date, parse_export_date};

    #[test]
    fn month_clamping_handles_end_of_month_transitions() {
        let mar_31 = NaiveDate::from_ymd_opt(2024, 3, 31);
        assert!(mar_31.is_some());
        if let Some(value) = mar_31 {
            let feb = add_months_clamped(value, -1);
            assert_eq!(format_iso_date(&feb), "2024-02-29");
            let last_year = add_months_clamped(feb, -12);
            assert_eq!(format_iso_date(&last_year), "2023-02-28");
        }
    }

    #[test]
    fn parses_both_supported_date_layouts() {
        assert_eq!(
            parse_export_date("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(
            parse_export_date(" 02/06/2024 "),
            NaiveDate::from_ymd_opt(2024, 6, 2)
        );
    }

    #[test]
    fn rejects_impossible_and_foreign_dates() {
        assert_eq!(parse_export_date("2024-02-30"), None);
        assert_eq!(parse_export_date("31/04/2024"), None);
        assert_eq!(parse_export_date("05/01/24"), None);
        assert_eq!(parse_export_date("May 1, 2024"), None);
        assert_eq!(parse_export_date(""), None);
    }
}
