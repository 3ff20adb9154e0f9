//! Slot CSV: the flat intermediate form between extraction and indexing
//!
//! Columns are `Day, Time, Room, Subject, Class/Group, Teacher(s) Name`, one
//! row per raw slot. `Time` is written as `H:MM - H:MM` and `Class/Group` as
//! `&`-joined tokens.

use crate::builder::RawSlot;
use crate::error::{Error, Result};
use crate::groups::parse_groups;
use crate::time::{clean_time_text, TimeRange};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Header row of the slot CSV
pub const HEADERS: [&str; 6] = ["Day", "Time", "Room", "Subject", "Class/Group", "Teacher(s) Name"];

#[derive(Debug, Serialize, Deserialize)]
struct SlotRow {
    #[serde(rename = "Day")]
    day: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Room")]
    room: String,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Class/Group", default)]
    groups: String,
    #[serde(rename = "Teacher(s) Name", default)]
    teachers: String,
}

impl From<&RawSlot> for SlotRow {
    fn from(slot: &RawSlot) -> Self {
        Self {
            day: slot.day.clone(),
            time: clean_time_text(&slot.time.to_string()),
            room: slot.room.clone(),
            subject: slot.subject.clone(),
            groups: slot.group_field(),
            teachers: slot.teacher_field(),
        }
    }
}

impl From<SlotRow> for RawSlot {
    fn from(row: SlotRow) -> Self {
        let teachers = row.teachers.trim();
        Self {
            day: row.day.trim().to_string(),
            room: row.room.trim().to_string(),
            time: TimeRange::from_text(&row.time),
            subject: row.subject.trim().to_string(),
            teachers: if teachers.is_empty() {
                Vec::new()
            } else {
                vec![teachers.to_string()]
            },
            groups: parse_groups(&row.groups),
        }
    }
}

/// Write slots as CSV to any writer; the header is always written
pub fn write_slots_to<W: Write>(writer: W, slots: &[RawSlot], name: &Path) -> Result<()> {
    let csv_err = |source: csv::Error| Error::Csv {
        path: name.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADERS).map_err(csv_err)?;
    for slot in slots {
        csv_writer.serialize(SlotRow::from(slot)).map_err(csv_err)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write slots to a CSV file, creating parent directories as needed
pub fn write_slots<P: AsRef<Path>>(path: P, slots: &[RawSlot]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_slots_to(BufWriter::new(file), slots, path)
}

fn read_slots_from<R: Read>(reader: R, path: PathBuf) -> Result<Vec<RawSlot>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;
    for required in ["Day", "Time", "Room", "Subject"] {
        if !headers.iter().any(|h| h.trim() == required) {
            return Err(Error::CsvParse {
                path,
                message: format!("missing column '{}'", required),
            });
        }
    }

    let mut slots = Vec::new();
    for result in csv_reader.deserialize::<SlotRow>() {
        let row = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;
        slots.push(RawSlot::from(row));
    }

    Ok(slots)
}

/// Read slots from a CSV file
pub fn read_slots<P: AsRef<Path>>(path: P) -> Result<Vec<RawSlot>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_slots_from(BufReader::new(file), path.to_path_buf())
}

/// Read slots from CSV text (useful for testing)
pub fn read_slots_str(content: &str, source_name: &str) -> Result<Vec<RawSlot>> {
    read_slots_from(content.as_bytes(), PathBuf::from(source_name))
}
