//! Record builder: turns detected day blocks into raw slots

use crate::config::ExtractConfig;
use crate::content::parse_cell;
use crate::grid::Grid;
use crate::layout::{detect_day_blocks, DayBlock};
use crate::time::{clean_time_text, first_clock, trailing_clock, TimeRange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// One extracted (room, time) fact before per-teacher explosion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSlot {
    pub day: String,
    pub room: String,
    pub time: TimeRange,
    pub subject: String,
    /// Teacher text as written in the cell, one entry per line
    pub teachers: Vec<String>,
    pub groups: Vec<String>,
}

impl RawSlot {
    /// Teachers as a single space-separated field, commas removed
    pub fn teacher_field(&self) -> String {
        self.teachers
            .iter()
            .flat_map(|t| t.split(','))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Groups joined with ` & `
    pub fn group_field(&self) -> String {
        self.groups.join(" & ")
    }
}

/// Header text of every time column, cleaned
fn header_times(grid: &Grid, block: &DayBlock) -> BTreeMap<usize, String> {
    block
        .time_columns
        .iter()
        .map(|&col| (col, clean_time_text(&grid.text(block.time_row, col))))
        .collect()
}

/// Time range of a cell: a merge across several time columns spans from the
/// first column's start to the last column's end. Anything that cannot be
/// read that way falls back to the cell's own column header.
fn cell_time_range(
    grid: &Grid,
    block: &DayBlock,
    headers: &BTreeMap<usize, String>,
    row: usize,
    col: usize,
) -> TimeRange {
    let own_header = || TimeRange::from_text(headers.get(&col).map(String::as_str).unwrap_or_default());

    let Some(range) = grid.merge_at(row, col) else {
        return own_header();
    };

    let covered: Vec<usize> = block
        .time_columns
        .iter()
        .copied()
        .filter(|&c| range.spans_column(c))
        .collect();

    match covered.as_slice() {
        [first, .., last] => {
            let start = headers.get(first).and_then(|h| first_clock(h));
            let end = headers.get(last).and_then(|h| trailing_clock(h));
            match (start, end) {
                (Some(start), Some(end)) => TimeRange::new(start, end),
                _ => own_header(),
            }
        }
        [only] => TimeRange::from_text(headers.get(only).map(String::as_str).unwrap_or_default()),
        [] => own_header(),
    }
}

/// Build raw slots for the given blocks of one sheet
pub fn build_slots(grid: &Grid, blocks: &[DayBlock], config: &ExtractConfig) -> Vec<RawSlot> {
    let mut slots = Vec::new();

    for block in blocks {
        let headers = header_times(grid, block);
        let mut processed: HashSet<(usize, usize)> = HashSet::new();
        let before = slots.len();

        for &row in &block.room_rows {
            let room = grid.text(row, config.label_column);

            for &col in &block.time_columns {
                if processed.contains(&(row, col)) {
                    continue;
                }

                let value = grid.resolve(row, col);
                if value.is_empty() {
                    continue;
                }

                match grid.merge_at(row, col) {
                    Some(range) => {
                        for r in range.start_row..=range.end_row {
                            for &c in &block.time_columns {
                                if range.contains(r, c) {
                                    processed.insert((r, c));
                                }
                            }
                        }
                    }
                    None => {
                        processed.insert((row, col));
                    }
                }

                let Some(content) = parse_cell(&value.to_string_value(), config) else {
                    continue;
                };

                let time = match content.time_override {
                    Some(time) => time,
                    None => cell_time_range(grid, block, &headers, row, col),
                };

                slots.push(RawSlot {
                    day: block.day_name.clone(),
                    room: room.clone(),
                    time,
                    subject: content.subject,
                    teachers: content.teachers,
                    groups: content.groups,
                });
            }
        }

        debug!(
            sheet = %grid.name,
            day = %block.day_name,
            slots = slots.len() - before,
            "extracted block"
        );
    }

    slots
}

/// Detect blocks in one sheet and extract its slots
pub fn extract_sheet(grid: &Grid, config: &ExtractConfig) -> Vec<RawSlot> {
    let blocks = detect_day_blocks(grid, config);
    info!(sheet = %grid.name, blocks = blocks.len(), "detected day blocks");
    build_slots(grid, &blocks, config)
}

/// Extract slots from every sheet of a workbook, in sheet order
pub fn extract_workbook(grids: &[Grid], config: &ExtractConfig) -> Vec<RawSlot> {
    grids
        .iter()
        .flat_map(|grid| extract_sheet(grid, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MergeRange;

    fn sheet() -> Grid {
        Grid::from_rows(
            "s",
            &[
                &["", "Monday", "8:00-9:20", "9:20-10:40", "10:40-12:00"],
                &["", "Lab 1", "OOP\nMr. Ali\nBSSE-2A", "", "DB\nDr. Sara\nBSAI-4B"],
                &["", "Lab 2", "Namaz Break", "", "AI\nMs. Hina\n(11:00 AM to 12:30 PM)"],
            ],
        )
    }

    #[test]
    fn test_single_cells_use_column_header() {
        let grid = sheet();
        let slots = extract_sheet(&grid, &ExtractConfig::default());

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].day, "Monday");
        assert_eq!(slots[0].room, "Lab 1");
        assert_eq!(slots[0].time, TimeRange::new("8:00", "9:20"));
        assert_eq!(slots[0].subject, "OOP");
        assert_eq!(slots[0].teachers, vec!["Mr. Ali"]);
        assert_eq!(slots[0].groups, vec!["BSSE-2A"]);
        assert_eq!(slots[1].time, TimeRange::new("10:40", "12:00"));
    }

    #[test]
    fn test_inline_time_overrides_header() {
        let grid = sheet();
        let slots = extract_sheet(&grid, &ExtractConfig::default());
        let ai = slots.iter().find(|s| s.subject == "AI").unwrap();
        assert_eq!(ai.time, TimeRange::new("11:00", "12:30"));
    }

    #[test]
    fn test_merge_across_columns_spans_headers() {
        let mut grid = sheet();
        grid.add_merge(MergeRange::new(1, 2, 1, 3));
        let slots = extract_sheet(&grid, &ExtractConfig::default());

        let oop: Vec<_> = slots.iter().filter(|s| s.subject == "OOP").collect();
        assert_eq!(oop.len(), 1);
        assert_eq!(oop[0].time, TimeRange::new("8:00", "10:40"));
    }

    #[test]
    fn test_vertical_merge_emits_once() {
        let mut grid = sheet();
        grid.set(2, 4, crate::grid::CellValue::Empty);
        grid.add_merge(MergeRange::new(1, 4, 2, 4));
        let slots = extract_sheet(&grid, &ExtractConfig::default());

        let db: Vec<_> = slots.iter().filter(|s| s.subject == "DB").collect();
        assert_eq!(db.len(), 1);
        assert_eq!(db[0].room, "Lab 1");
    }

    #[test]
    fn test_unreadable_merged_header_falls_back_to_own_column() {
        let mut grid = Grid::from_rows(
            "s",
            &[
                &["", "Tuesday", "8:00-9:20", "9:20-10:40 (Lab)"],
                &["", "Lab 1", "Maths\nMr. Bilal"],
            ],
        );
        grid.add_merge(MergeRange::new(1, 2, 1, 3));
        let slots = extract_sheet(&grid, &ExtractConfig::default());
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].time, TimeRange::new("8:00", "9:20"));
    }

    #[test]
    fn test_teacher_and_group_fields() {
        let slot = RawSlot {
            day: "Monday".to_string(),
            room: "Lab 1".to_string(),
            time: TimeRange::new("8:00", "9:20"),
            subject: "OOP".to_string(),
            teachers: vec!["Mr. Ali,".to_string(), "Dr. Sara, Ms. Hina".to_string()],
            groups: vec!["BSSE-2A".to_string(), "BSSE-2B".to_string()],
        };
        assert_eq!(slot.teacher_field(), "Mr. Ali Dr. Sara Ms. Hina");
        assert_eq!(slot.group_field(), "BSSE-2A & BSSE-2B");
    }
}
