//! Workbook reader: loads `.xlsx` sheets into grids with their merged ranges

use crate::error::{Error, Result};
use crate::grid::{CellValue, Grid, MergeRange};
use calamine::{open_workbook, Data, Dimensions, Range, Reader, Xlsx};
use std::path::Path;
use tracing::{debug, info};

/// Read every worksheet of a workbook, in sheet order
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Vec<Grid>> {
    let path = path.as_ref();
    let workbook_err = |source: calamine::XlsxError| Error::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(workbook_err)?;
    workbook.load_merged_regions().map_err(workbook_err)?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut grids = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = workbook.worksheet_range(&name).map_err(workbook_err)?;
        let merges: Vec<Dimensions> = workbook
            .merged_regions_by_sheet(&name)
            .into_iter()
            .map(|(_, _, dims)| dims.clone())
            .collect();

        let grid = grid_from_range(&name, &range, &merges);
        debug!(sheet = %name, rows = grid.row_count(), merges = merges.len(), "loaded sheet");
        grids.push(grid);
    }

    info!(path = %path.display(), sheets = grids.len(), "read workbook");
    Ok(grids)
}

/// Build a grid using absolute sheet coordinates (A1 = row 0, column 0)
pub(crate) fn grid_from_range(name: &str, range: &Range<Data>, merges: &[Dimensions]) -> Grid {
    let mut grid = Grid::new(name);
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    for (row, col, data) in range.used_cells() {
        let value = cell_value(data);
        if !value.is_empty() {
            grid.set(row + row_offset, col + col_offset, value);
        }
    }

    for dims in merges {
        grid.add_merge(MergeRange::new(
            dims.start.0 as usize,
            dims.start.1 as usize,
            dims.end.0 as usize,
            dims.end.1 as usize,
        ));
    }

    grid
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::parse(text),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::parse(&data.to_string()),
        },
        Data::DateTimeIso(text) => chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::DateTime)
            .unwrap_or_else(|_| CellValue::parse(text)),
        _ => CellValue::parse(&data.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_range_keeps_absolute_positions() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 3));
        range.set_value((2, 1), Data::String("Monday".to_string()));
        range.set_value((2, 2), Data::String("8:00-9:20".to_string()));
        range.set_value((3, 1), Data::String("Lab 1".to_string()));
        range.set_value((3, 2), Data::String("OOP\nMr. Ali".to_string()));
        range.set_value((3, 3), Data::Float(42.0));

        let merges = vec![Dimensions {
            start: (3, 2),
            end: (3, 3),
        }];
        let grid = grid_from_range("Sheet1", &range, &merges);

        assert_eq!(grid.text(2, 1), "Monday");
        assert_eq!(grid.text(3, 2), "OOP\nMr. Ali");
        assert_eq!(grid.text(3, 3), "OOP\nMr. Ali");
        assert_eq!(grid.raw(3, 3), &CellValue::Number(42.0));
        assert_eq!(grid.row_count(), 4);
    }

    #[test]
    fn test_cell_values() {
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            cell_value(&Data::String(" Rooms ".to_string())),
            CellValue::Text("Rooms".to_string())
        );
        assert!(matches!(
            cell_value(&Data::DateTimeIso("2025-09-01T00:00:00".to_string())),
            CellValue::DateTime(_)
        ));
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        let err = read_workbook("/no/such/timetable.xlsx").unwrap_err();
        assert!(matches!(err, Error::Workbook { .. }));
    }
}
