//! Sheet grid with merge-aware cell resolution

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static EMPTY: CellValue = CellValue::Empty;

/// A single sheet: cell values plus merged ranges
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Sheet name
    pub name: String,
    cells: Vec<Vec<CellValue>>,
    merges: Vec<MergeRange>,
    /// Covered cell -> index into `merges`
    merge_index: HashMap<(usize, usize), usize>,
}

impl Grid {
    /// Create an empty grid
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a grid from text rows (handy for tests and CSV-like input)
    pub fn from_rows(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let mut grid = Self::new(name);
        for (row, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                grid.set(row, col, CellValue::parse(value));
            }
        }
        grid
    }

    /// Set the raw value of a cell, growing the grid as needed
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.cells.len() <= row {
            self.cells.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.cells[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Register a merged range; cells inside it resolve to its anchor
    pub fn add_merge(&mut self, range: MergeRange) {
        let id = self.merges.len();
        for row in range.start_row..=range.end_row {
            for col in range.start_col..=range.end_col {
                self.merge_index.insert((row, col), id);
            }
        }
        self.merges.push(range);
    }

    /// Number of rows (one past the maximum row index)
    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Merged ranges of this sheet
    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// The cell's own value, ignoring merges
    pub fn raw(&self, row: usize, col: usize) -> &CellValue {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// The merged range covering a cell, if any
    pub fn merge_at(&self, row: usize, col: usize) -> Option<&MergeRange> {
        self.merge_index
            .get(&(row, col))
            .and_then(|&id| self.merges.get(id))
    }

    /// The effective value of a cell: the anchor's value inside a merge
    pub fn resolve(&self, row: usize, col: usize) -> &CellValue {
        match self.merge_at(row, col) {
            Some(range) => self.raw(range.start_row, range.start_col),
            None => self.raw(row, col),
        }
    }

    /// Resolved value as trimmed display text
    pub fn text(&self, row: usize, col: usize) -> String {
        self.resolve(row, col).to_string_value().trim().to_string()
    }
}

/// A rectangular merged range, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergeRange {
    /// Create a range from its corners; corners are normalized
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row: start_row.min(end_row),
            start_col: start_col.min(end_col),
            end_row: start_row.max(end_row),
            end_col: start_col.max(end_col),
        }
    }

    /// Check if a cell lies inside the range
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.start_row..=self.end_row).contains(&row) && (self.start_col..=self.end_col).contains(&col)
    }

    /// Check if a column lies inside the range's column span
    pub fn spans_column(&self, col: usize) -> bool {
        (self.start_col..=self.end_col).contains(&col)
    }
}

/// A cell value with type detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Text value (may span several lines)
    Text(String),
    /// Numeric value
    Number(f64),
    /// Date or date-time value
    DateTime(NaiveDateTime),
    /// Empty/null cell
    Empty,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting numbers
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Number(f);
        }

        CellValue::Text(trimmed.to_string())
    }

    /// Check if the cell is empty (whitespace-only text counts as empty)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Weekday of a date value
    pub fn weekday(&self) -> Option<Weekday> {
        match self {
            CellValue::DateTime(dt) => Some(dt.weekday()),
            _ => None,
        }
    }

    /// Convert to a display string
    pub fn to_string_value(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Empty => write!(f, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Grid {
        let mut grid = Grid::from_rows(
            "Sheet1",
            &[
                &["", "Rooms", "8:00-9:20", "9:20-10:40", "10:40-12:00"],
                &["", "Lab 1", "OOP\nMr. Ali", "", "DB"],
                &["", "Lab 2", "", "", ""],
            ],
        );
        grid.add_merge(MergeRange::new(1, 2, 2, 3));
        grid
    }

    #[test]
    fn test_resolve_interior_equals_anchor() {
        let grid = sample();
        for range in grid.merges().to_vec() {
            let anchor = grid.resolve(range.start_row, range.start_col).clone();
            for row in range.start_row..=range.end_row {
                for col in range.start_col..=range.end_col {
                    assert_eq!(grid.resolve(row, col), &anchor);
                }
            }
        }
    }

    #[test]
    fn test_resolve_outside_merge_uses_own_value() {
        let grid = sample();
        assert_eq!(grid.text(1, 4), "DB");
        assert!(grid.raw(2, 3).is_empty());
        assert_eq!(grid.text(2, 3), "OOP\nMr. Ali");
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let grid = sample();
        assert!(grid.resolve(100, 100).is_empty());
        assert_eq!(grid.row_count(), 3);
    }

    #[test]
    fn test_merge_range_normalizes_corners() {
        let range = MergeRange::new(4, 5, 2, 3);
        assert_eq!(range, MergeRange::new(2, 3, 4, 5));
        assert!(range.contains(3, 4));
        assert!(!range.contains(1, 4));
        assert!(range.spans_column(5));
    }

    #[test]
    fn test_cell_value_parse() {
        assert_eq!(CellValue::parse("  "), CellValue::Empty);
        assert_eq!(CellValue::parse("101"), CellValue::Number(101.0));
        assert_eq!(CellValue::parse(" Lab 3 "), CellValue::Text("Lab 3".to_string()));
        assert_eq!(CellValue::Number(101.0).to_string_value(), "101");
    }

    #[test]
    fn test_date_weekday() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(date).weekday(), Some(Weekday::Mon));
        assert_eq!(CellValue::parse("Monday").weekday(), None);
    }
}
