use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Day-first layouts are tried before month-first ones, then ISO.
pub const DATE_LAYOUTS: [&str; 7] = [
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d",
];

pub const DEFAULT_TIME: &str = "12:00 PM";

pub fn parse_message_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(trimmed, layout).ok())
}

/// Parses `h:mm AM`, tolerating a missing space and lowercase meridiem.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let compact = raw.trim().to_ascii_uppercase().replace(' ', "");
    let split_at = compact.len().checked_sub(2)?;
    if !compact.is_char_boundary(split_at) {
        return None;
    }
    let (clock, meridiem) = compact.split_at(split_at);
    NaiveTime::parse_from_str(&format!("{clock} {meridiem}"), "%I:%M %p").ok()
}

/// Combines message date and time; an unparseable time keeps the date at noon.
pub fn combine_date_time(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    let day = parse_message_date(date)?;
    let clock = time
        .and_then(parse_clock_time)
        .or_else(|| parse_clock_time(DEFAULT_TIME))?;
    Some(day.and_time(clock))
}

/// 24-hour clock hour for a `h:mm AM|PM` fragment.
pub fn hour_24(hour: u32, meridiem: &str) -> u32 {
    let is_pm = meridiem.eq_ignore_ascii_case("pm");
    match (hour, is_pm) {
        (12, false) => 0,
        (12, true) => 12,
        (value, true) => value + 12,
        (value, false) => value,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::{combine_date_time, hour_24, parse_clock_time, parse_message_date};

    #[test]
    fn day_first_short_year_is_preferred() {
        assert_eq!(
            parse_message_date("15/7/25"),
            NaiveDate::from_ymd_opt(2025, 7, 15)
        );
        assert_eq!(
            parse_message_date("1/2/2025"),
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );
    }

    #[test]
    fn month_first_is_used_when_day_first_is_impossible() {
        assert_eq!(
            parse_message_date("7/15/25"),
            NaiveDate::from_ymd_opt(2025, 7, 15)
        );
        assert_eq!(
            parse_message_date("2025-07-15"),
            NaiveDate::from_ymd_opt(2025, 7, 15)
        );
        assert_eq!(parse_message_date("45/45/45"), None);
    }

    #[test]
    fn clock_time_accepts_compact_and_lowercase_forms() {
        let parsed = parse_clock_time("2:30pm");
        assert!(parsed.is_some());
        if let Some(time) = parsed {
            assert_eq!(time.hour(), 14);
            assert_eq!(time.minute(), 30);
        }
        assert!(parse_clock_time("M").is_none());
    }

    #[test]
    fn missing_time_defaults_to_noon() {
        let combined = combine_date_time("20/7/25", None);
        assert!(combined.is_some());
        if let Some(value) = combined {
            assert_eq!(value.hour(), 12);
        }
    }

    #[test]
    fn midnight_and_noon_convert_to_24_hour_clock() {
        assert_eq!(hour_24(12, "AM"), 0);
        assert_eq!(hour_24(12, "PM"), 12);
        assert_eq!(hour_24(9, "am"), 9);
        assert_eq!(hour_24(6, "PM"), 18);
    }
}
