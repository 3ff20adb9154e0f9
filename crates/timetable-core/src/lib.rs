//! timetable-core: Core library for extracting teaching schedules from
//! timetable spreadsheets
//!
//! This library provides functionality to:
//! - Read `.xlsx` workbooks into grids with merged-cell resolution
//! - Detect day blocks (day, time header row, room rows) in each sheet
//! - Parse cell text into subject, teachers, groups and time overrides
//! - Write and read the flat slot CSV
//! - Normalize slots into per-teacher schedules with consecutive merging
//! - Query the resulting index by teacher, section or room

pub mod builder;
pub mod config;
pub mod content;
pub mod error;
pub mod grid;
pub mod groups;
pub mod handle;
pub mod index;
pub mod layout;
pub mod normalizer;
mod patterns;
pub mod reader;
pub mod scanner;
pub mod store;
pub mod teachers;
pub mod time;

pub use builder::{build_slots, extract_sheet, extract_workbook, RawSlot};
pub use config::ExtractConfig;
pub use content::{parse_cell, CellContent};
pub use error::{Error, Result};
pub use grid::{CellValue, Grid, MergeRange};
pub use handle::{IndexHandle, LoadStatus, Source};
pub use index::{SourceKind, TimetableIndex};
pub use layout::{detect_day_blocks, DayBlock};
pub use normalizer::{normalize, ScheduleEntry};
pub use reader::read_workbook;
pub use scanner::{convert_workbook, resolve_upload_source, semester_info, ConversionSummary};
pub use store::{read_slots, read_slots_str, write_slots, write_slots_to};
pub use time::TimeRange;
