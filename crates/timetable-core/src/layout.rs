//! Day-block detection
//!
//! A sheet holds one block per weekday: a day marker in the label column, a
//! header row of time ranges, and a run of room rows below. Sheets lay the
//! header out in one of three ways, each recognized by its own function:
//!
//! - [`same_row_header`]: the time ranges sit on the day marker's row
//! - [`rooms_label_header`]: a "Rooms" label row below the marker carries them
//! - [`default_offset_header`]: the row just above the marker carries them
//!
//! The first shape that matches wins. Candidates without time columns or room
//! rows are dropped; sheets routinely contain legends and decoration.

use crate::config::ExtractConfig;
use crate::grid::{CellValue, Grid};
use crate::time::{is_time_range, weekday_name};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One weekday's region of a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlock {
    /// Canonical weekday name, e.g. "Monday"
    pub day_name: String,
    /// Row of the day marker
    pub day_row: usize,
    /// Row carrying the time-range headers
    pub time_row: usize,
    /// Columns with a time-range header, strictly increasing
    pub time_columns: Vec<usize>,
    /// Rows with a room label
    pub room_rows: Vec<usize>,
}

/// Where a block's header lives, as decided by one of the layout shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub day_row: usize,
    pub time_row: usize,
    pub rooms_start: usize,
    /// Rows claimed by this block that must not start another block
    pub consumed: Vec<usize>,
}

type ShapeFn = fn(&Grid, usize, &ExtractConfig) -> Option<Header>;

const SHAPES: [ShapeFn; 3] = [same_row_header, rooms_label_header, default_offset_header];

/// Weekday named by a cell: free text or a date value
pub fn day_of(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Text(text) => weekday_name(text).map(str::to_string),
        CellValue::DateTime(_) => value.weekday().map(|day| {
            let index = day.num_days_from_monday() as usize;
            crate::time::WEEKDAYS[index].to_string()
        }),
        _ => None,
    }
}

fn label(grid: &Grid, row: usize, config: &ExtractConfig) -> String {
    grid.text(row, config.label_column)
}

fn is_rooms_label(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("rooms")
}

/// Time ranges on the marker row itself. A repeated marker on the next row
/// makes that row the day row and pushes rooms down by one.
pub fn same_row_header(grid: &Grid, row: usize, config: &ExtractConfig) -> Option<Header> {
    let has_time = (config.first_time_column..config.same_row_probe_limit)
        .any(|col| is_time_range(&grid.text(row, col)));
    if !has_time {
        return None;
    }

    let here = day_of(grid.resolve(row, config.label_column));
    let below = day_of(grid.resolve(row + 1, config.label_column));
    if here.is_some() && here == below {
        return Some(Header {
            day_row: row + 1,
            time_row: row,
            rooms_start: row + 2,
            consumed: vec![row, row + 1],
        });
    }

    Some(Header {
        day_row: row,
        time_row: row,
        rooms_start: row + 1,
        consumed: vec![row],
    })
}

/// A "Rooms" label within a few rows below the marker
pub fn rooms_label_header(grid: &Grid, row: usize, config: &ExtractConfig) -> Option<Header> {
    let last = (row + config.rooms_label_lookahead).min(grid.row_count().saturating_sub(1));
    let rooms_row = (row + 1..=last).find(|&r| is_rooms_label(&label(grid, r, config)))?;

    Some(Header {
        day_row: row,
        time_row: rooms_row,
        rooms_start: rooms_row + 1,
        consumed: vec![row],
    })
}

/// Header on the row just above the marker
pub fn default_offset_header(_grid: &Grid, row: usize, _config: &ExtractConfig) -> Option<Header> {
    let time_row = row.checked_sub(1)?;
    Some(Header {
        day_row: row,
        time_row,
        rooms_start: row + 1,
        consumed: vec![row],
    })
}

/// Try each layout shape in order; first match wins
pub fn detect_header(grid: &Grid, row: usize, config: &ExtractConfig) -> Option<Header> {
    SHAPES.iter().find_map(|shape| shape(grid, row, config))
}

/// Columns of a row whose value looks like a time range
pub fn time_columns(grid: &Grid, time_row: usize, config: &ExtractConfig) -> Vec<usize> {
    (config.first_time_column..config.time_column_limit)
        .filter(|&col| is_time_range(&grid.text(time_row, col)))
        .collect()
}

/// Room rows starting at `start`: stops at the next day marker, or once two
/// of the next three labels are empty after at least one room was found
pub fn room_rows(grid: &Grid, start: usize, config: &ExtractConfig) -> Vec<usize> {
    let end = (start + config.room_window).min(grid.row_count());
    let mut rooms = Vec::new();

    for row in start..end {
        let value = grid.resolve(row, config.label_column);
        if day_of(value).is_some() {
            break;
        }

        let text = value.to_string_value();
        let text = text.trim();
        if !text.is_empty() {
            if !is_rooms_label(text) {
                rooms.push(row);
            }
        } else if !rooms.is_empty() {
            let probe_end = (row + 3).min(grid.row_count());
            let empty = (row..probe_end)
                .filter(|&r| grid.resolve(r, config.label_column).is_empty())
                .count();
            if empty >= 2 {
                break;
            }
        }
    }

    rooms
}

/// Detect every day block in a sheet, top to bottom
pub fn detect_day_blocks(grid: &Grid, config: &ExtractConfig) -> Vec<DayBlock> {
    let mut blocks = Vec::new();
    let mut consumed: HashSet<usize> = HashSet::new();

    for row in 0..grid.row_count() {
        if consumed.contains(&row) {
            continue;
        }
        if day_of(grid.resolve(row, config.label_column)).is_none() {
            continue;
        }

        let Some(header) = detect_header(grid, row, config) else {
            debug!(sheet = %grid.name, row, "day marker without a usable header row");
            continue;
        };
        consumed.extend(header.consumed.iter().copied());

        let time_columns = time_columns(grid, header.time_row, config);
        if time_columns.is_empty() {
            debug!(sheet = %grid.name, row, "skipping day marker: no time columns");
            continue;
        }

        let room_rows = room_rows(grid, header.rooms_start, config);
        if room_rows.is_empty() {
            debug!(sheet = %grid.name, row, "skipping day marker: no room rows");
            continue;
        }

        let day_name = day_of(grid.resolve(header.day_row, config.label_column))
            .unwrap_or_else(|| "Unknown".to_string());

        debug!(
            sheet = %grid.name,
            day = %day_name,
            day_row = header.day_row,
            time_row = header.time_row,
            rooms = room_rows.len(),
            time_cols = time_columns.len(),
            "detected day block"
        );

        blocks.push(DayBlock {
            day_name,
            day_row: header.day_row,
            time_row: header.time_row,
            time_columns,
            room_rows,
        });
    }

    blocks
}
