//! Time-range recognition and the ordering rules used for schedules
//!
//! Header cells in these sheets carry bare clock times such as `1:30` with no
//! AM/PM marker. The institution's convention is that hours 1 through 7 are
//! afternoon or evening and 8 through 12 are morning or midday, so ordering
//! by minutes adds 12 hours to the former. A sheet with genuine 24-hour
//! headers in the 1-7 range would be mis-ordered; that is a known limitation.

use crate::patterns;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical weekday names, Monday first
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A start/end pair of clock strings (`H:MM` or `HH:MM`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Best-effort range from free text.
    ///
    /// Takes the first and last clock times found. Text without two clock
    /// times falls back to splitting on the first `-`, and text without a
    /// dash becomes a zero-length range, so nothing is ever rejected.
    pub fn from_text(text: &str) -> Self {
        let cleaned = clean_time_text(text);
        if let Some(re) = patterns::clock() {
            let clocks: Vec<&str> = re.find_iter(&cleaned).map(|m| m.as_str()).collect();
            if let (Some(first), Some(last)) = (clocks.first(), clocks.last()) {
                if clocks.len() >= 2 {
                    return Self::new(*first, *last);
                }
            }
        }
        match cleaned.split_once('-') {
            Some((start, end)) => Self::new(start.trim(), end.trim()),
            None => Self::new(cleaned.trim(), cleaned.trim()),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Check if text looks like a header time range (`8:00-9:20`, `8:00 – 9:20`)
pub fn is_time_range(text: &str) -> bool {
    patterns::time_range().is_some_and(|re| re.is_match(text))
}

/// Normalize header text: tabs to spaces, dash variants to `-`, and exactly
/// one space on each side of every dash
pub fn clean_time_text(text: &str) -> String {
    let mut cleaned = text.trim().to_string();
    if let Some(re) = patterns::tabbed_range() {
        cleaned = re.replace_all(&cleaned, "$1 - $2").into_owned();
    }
    cleaned = cleaned.replace('\t', " ").replace(['–', '—'], "-");
    match patterns::dash_spacing() {
        Some(re) => re.replace_all(cleaned.trim(), " - ").into_owned(),
        None => cleaned,
    }
}

/// Start clock of the first time in a header
pub fn first_clock(text: &str) -> Option<String> {
    patterns::clock()?
        .find(text)
        .map(|m| m.as_str().to_string())
}

/// End clock of a header, which must be the last thing in the text
pub fn trailing_clock(text: &str) -> Option<String> {
    patterns::trailing_clock()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse an explicit range such as `10:45 AM to 12:25 PM` or `2:00-3:20`.
/// Times with an AM/PM marker are converted to 24-hour form.
pub fn parse_clock_range(text: &str) -> Option<TimeRange> {
    let caps = patterns::clock_range()?.captures(text)?;
    let start = caps.get(1)?.as_str();
    let end = caps.get(3)?.as_str();
    let start_period = caps.get(2).map(|m| m.as_str());
    let end_period = caps.get(4).map(|m| m.as_str());
    Some(TimeRange::new(
        to_24_hour(start, start_period),
        to_24_hour(end, end_period),
    ))
}

/// Convert `H:MM` plus an optional AM/PM marker to zero-padded 24-hour time.
/// Without a marker the time is returned unchanged.
pub fn to_24_hour(time: &str, period: Option<&str>) -> String {
    let Some(period) = period else {
        return time.to_string();
    };
    let Some((hour, minute)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(mut hour) = hour.trim().parse::<u32>() else {
        return time.to_string();
    };
    if hour > 12 {
        return time.to_string();
    }

    if period.eq_ignore_ascii_case("PM") && hour != 12 {
        hour += 12;
    } else if period.eq_ignore_ascii_case("AM") && hour == 12 {
        hour = 0;
    }

    format!("{:02}:{}", hour, minute.trim())
}

/// Zero-pad the hour so `1:30` and `01:30` compare equal
pub fn normalize_time(time: &str) -> String {
    let time = time.trim();
    match time.split_once(':') {
        Some((hour, minute)) => format!("{:0>2}:{}", hour.trim(), minute.trim()),
        None => time.to_string(),
    }
}

/// Minutes since midnight, reading hours 1-7 as afternoon.
/// Unparseable or out-of-range text counts as 0.
pub fn time_to_minutes(time: &str) -> u32 {
    let normalized = normalize_time(time);
    let Some((hour, minute)) = normalized.split_once(':') else {
        return 0;
    };
    let (Ok(mut hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) else {
        return 0;
    };
    if hour > 23 || minute > 59 {
        return 0;
    }
    if (1..=7).contains(&hour) {
        hour += 12;
    }
    hour * 60 + minute
}

/// Start time as the integer formed by its digits (`9:00` -> 900).
/// This is the ordering used for published schedules.
pub fn start_sort_key(time: &str) -> u32 {
    let digits = time.replace(':', "");
    let digits = digits.trim();
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Canonical weekday name for free text, case-insensitive
pub fn weekday_name(text: &str) -> Option<&'static str> {
    let text = text.trim();
    WEEKDAYS
        .iter()
        .copied()
        .find(|day| day.eq_ignore_ascii_case(text))
}

/// Monday = 0 ... Sunday = 6; unknown names sort after every weekday
pub fn weekday_index(day: &str) -> usize {
    let day = day.trim();
    WEEKDAYS
        .iter()
        .position(|d| d.eq_ignore_ascii_case(day))
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_to_minutes_afternoon_convention() {
        assert_eq!(time_to_minutes("1:30"), 810);
        assert_eq!(time_to_minutes("8:00"), 480);
        assert_eq!(time_to_minutes("12:15"), 735);
        assert_eq!(time_to_minutes("07:59"), 19 * 60 + 59);
        assert_eq!(time_to_minutes("13:00"), 780);
        assert_eq!(time_to_minutes("noon"), 0);
    }

    #[test]
    fn test_time_to_minutes_rejects_out_of_range() {
        assert_eq!(time_to_minutes("99999999:00"), 0);
        assert_eq!(time_to_minutes("24:00"), 0);
        assert_eq!(time_to_minutes("9:75"), 0);
        assert_eq!(time_to_minutes("23:59"), 1439);
        assert_eq!(to_24_hour("4294967295:00", Some("PM")), "4294967295:00");
    }

    #[test]
    fn test_is_time_range() {
        assert!(is_time_range("8:00-9:20"));
        assert!(is_time_range("8:00 – 9:20"));
        assert!(is_time_range("10:40  —  12:00"));
        assert!(!is_time_range("Monday"));
        assert!(!is_time_range("8:00"));
    }

    #[test]
    fn test_clean_time_text() {
        assert_eq!(clean_time_text("8:00–9:20"), "8:00 - 9:20");
        assert_eq!(clean_time_text(" 8:00\t9:20 "), "8:00 - 9:20");
        assert_eq!(clean_time_text("8:00   -9:20"), "8:00 - 9:20");
    }

    #[test]
    fn test_parse_clock_range_with_periods() {
        assert_eq!(
            parse_clock_range("10:45 AM TO 12:25 PM"),
            Some(TimeRange::new("10:45", "12:25"))
        );
        assert_eq!(
            parse_clock_range("1:00 pm to 2:20 pm"),
            Some(TimeRange::new("13:00", "14:20"))
        );
        assert_eq!(
            parse_clock_range("12:10 AM - 1:00 AM"),
            Some(TimeRange::new("00:10", "01:00"))
        );
        assert_eq!(
            parse_clock_range("2:00 – 3:20"),
            Some(TimeRange::new("2:00", "3:20"))
        );
        assert_eq!(parse_clock_range("Lab"), None);
    }

    #[test]
    fn test_time_range_from_text() {
        assert_eq!(TimeRange::from_text("8:00–9:20"), TimeRange::new("8:00", "9:20"));
        assert_eq!(TimeRange::from_text("9:00"), TimeRange::new("9:00", "9:00"));
        assert_eq!(TimeRange::from_text("TBA - later"), TimeRange::new("TBA", "later"));
        assert_eq!(TimeRange::new("8:00", "9:20").to_string(), "8:00 - 9:20");
    }

    #[test]
    fn test_header_clocks() {
        assert_eq!(first_clock("8:00 - 9:20").as_deref(), Some("8:00"));
        assert_eq!(trailing_clock("9:20 - 10:40").as_deref(), Some("10:40"));
        assert_eq!(trailing_clock("9:20 - 10:40 (Lab)"), None);
    }

    #[test]
    fn test_normalize_and_sort_key() {
        assert_eq!(normalize_time("1:30"), "01:30");
        assert_eq!(normalize_time("11:30"), "11:30");
        assert_eq!(start_sort_key("9:00"), 900);
        assert_eq!(start_sort_key("13:30"), 1330);
        assert_eq!(start_sort_key("TBA"), 0);
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(weekday_name(" monday "), Some("Monday"));
        assert_eq!(weekday_name("Mon"), None);
        assert_eq!(weekday_index("Monday"), 0);
        assert_eq!(weekday_index("SUNDAY"), 6);
        assert!(weekday_index("Holiday") > weekday_index("Sunday"));
    }
}
