//! Compiled regular expressions shared by the recognizers

use regex::Regex;
use std::sync::OnceLock;
use tracing::error;

fn compile_regex(pattern: &str, label: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            error!("invalid {label} regex: {err}");
            None
        }
    }
}

macro_rules! cached_regex {
    ($name:ident, $label:literal, $pattern:expr) => {
        pub(crate) fn $name() -> Option<&'static Regex> {
            static RE: OnceLock<Option<Regex>> = OnceLock::new();
            RE.get_or_init(|| compile_regex($pattern, $label)).as_ref()
        }
    };
}

// Header-style range such as "8:00-9:20" or "8:00 – 9:20".
cached_regex!(time_range, "time_range", r"\d{1,2}:\d{2}\s*[-–—]\s*\d{1,2}:\d{2}");

cached_regex!(clock, "clock", r"\d{1,2}:\d{2}");

cached_regex!(trailing_clock, "trailing_clock", r"(\d{1,2}:\d{2})\s*$");

cached_regex!(
    clock_range,
    "clock_range",
    r"(?i)(\d{1,2}:\d{2})\s*(AM|PM)?\s*(?:-|–|—|\bto\b)\s*(\d{1,2}:\d{2})\s*(AM|PM)?"
);

cached_regex!(tabbed_range, "tabbed_range", r"(\d{1,2}:\d{2})\s*\t\s*(\d{1,2}:\d{2})");

cached_regex!(dash_spacing, "dash_spacing", r"\s*-\s*");

cached_regex!(bare_parenthesized, "bare_parenthesized", r"^\s*\(([^)]+)\)\s*$");

cached_regex!(trailing_parenthesized, "trailing_parenthesized", r"^(.*?)\s*\(([^)]+)\)\s*$");

cached_regex!(
    group_line,
    "group_line",
    r"\b[A-Z]{2,4}(?:/[A-Z]{2,4})*[-/]\d+[A-Za-z]+\b"
);

cached_regex!(
    shared_section,
    "shared_section",
    r"\b([A-Z]{2,4})/([A-Z]{2,4})-(\d+[A-Za-z]*)\b"
);

cached_regex!(
    slashed_groups,
    "slashed_groups",
    r"\b([A-Z]{2,4}-\d+[A-Za-z]*)/([A-Z]{2,4}-\d+[A-Za-z]*)\b"
);

cached_regex!(
    comma_sections,
    "comma_sections",
    r"\b[A-Z]{2,4}-\d+[A-Za-z]*(?:\s*,\s*(?:[A-Z]{2,4}-)?\d+[A-Za-z]*)+\b"
);

cached_regex!(semester, "semester", r"(Fall|Spring|Summer)-(\d{2})");
