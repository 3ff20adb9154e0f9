//! Parser for the free text inside one timetable cell
//!
//! The first line is the subject. Every following line is classified, in
//! priority order, as a group line, a bare `(time range)` line, a
//! `name (time range)` line, or a plain teacher line.

use crate::config::ExtractConfig;
use crate::groups;
use crate::patterns;
use crate::time::{parse_clock_range, TimeRange};
use serde::{Deserialize, Serialize};

/// Structured content of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellContent {
    pub subject: String,
    /// Teacher lines as written (may hold several names each)
    pub teachers: Vec<String>,
    /// Normalized group tokens
    pub groups: Vec<String>,
    /// Time written inside the cell, which wins over the column header
    pub time_override: Option<TimeRange>,
}

/// Classification of one non-subject line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Groups(Vec<String>),
    Time(TimeRange),
    TeacherWithTime {
        name: String,
        time: Option<TimeRange>,
    },
    Teacher(String),
    /// A parenthesized note such as `(Visiting)` that carries no time
    Note,
}

/// Classify a single line
pub fn classify_line(line: &str) -> LineKind {
    if groups::is_group_line(line) {
        return LineKind::Groups(groups::group_tokens(line));
    }

    if let Some(inner) = bare_parenthesized(line) {
        return match parse_clock_range(inner) {
            Some(time) => LineKind::Time(time),
            None => LineKind::Note,
        };
    }

    if let Some((name, time)) = teacher_with_time(line) {
        return LineKind::TeacherWithTime { name, time };
    }

    LineKind::Teacher(line.trim().to_string())
}

/// Inner text of a line that is wholly parenthesized, e.g. `(10:45 am to 12:25 pm)`
fn bare_parenthesized(line: &str) -> Option<&str> {
    let caps = patterns::bare_parenthesized()?.captures(line)?;
    Some(caps.get(1)?.as_str().trim())
}

/// `Ms. Namra Amjad (10:45 AM TO 12:25 PM)`; the time is kept only if it parses
fn teacher_with_time(line: &str) -> Option<(String, Option<TimeRange>)> {
    let caps = patterns::trailing_parenthesized()?.captures(line)?;
    let name = caps.get(1)?.as_str().trim();
    if name.is_empty() {
        return None;
    }
    let time = parse_clock_range(caps.get(2)?.as_str().trim());
    Some((name.to_string(), time))
}

/// Parse a cell's text. Returns `None` for empty and filler cells.
pub fn parse_cell(text: &str, config: &ExtractConfig) -> Option<CellContent> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let subject = lines.next()?;
    if config.is_filler(subject) {
        return None;
    }

    let mut content = CellContent {
        subject: subject.to_string(),
        teachers: Vec::new(),
        groups: Vec::new(),
        time_override: None,
    };

    for line in lines {
        match classify_line(line) {
            LineKind::Groups(tokens) => {
                for token in tokens {
                    push_unique(&mut content.groups, token);
                }
            }
            LineKind::Time(time) => content.time_override = Some(time),
            LineKind::TeacherWithTime { name, time } => {
                push_unique(&mut content.teachers, name);
                if time.is_some() {
                    content.time_override = time;
                }
            }
            LineKind::Teacher(name) => push_unique(&mut content.teachers, name),
            LineKind::Note => {}
        }
    }

    Some(content)
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}
