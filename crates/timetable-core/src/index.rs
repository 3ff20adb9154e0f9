//! Queryable, immutable timetable index

use crate::builder::{extract_workbook, RawSlot};
use crate::config::ExtractConfig;
use crate::error::{Error, Result};
use crate::normalizer::{normalize, sort_entries, ScheduleEntry};
use crate::reader::read_workbook;
use crate::scanner::semester_info;
use crate::store::read_slots;
use crate::teachers::sort_teachers;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Per-teacher schedules plus the derived section and room sets.
///
/// Built once from a source and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimetableIndex {
    teachers: BTreeMap<String, Vec<ScheduleEntry>>,
    sections: BTreeSet<String>,
    rooms: BTreeSet<String>,
    source: Option<PathBuf>,
    semester: String,
}

/// How a source file is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Workbook,
    SlotCsv,
}

impl SourceKind {
    /// Decide by file extension
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(SourceKind::Workbook),
            "csv" => Some(SourceKind::SlotCsv),
            _ => None,
        }
    }
}

impl TimetableIndex {
    /// An index with no entries
    pub fn empty() -> Self {
        Self {
            semester: "No Data".to_string(),
            ..Self::default()
        }
    }

    /// Build an index from raw slots
    pub fn from_slots(slots: &[RawSlot], config: &ExtractConfig) -> Self {
        let teachers = normalize(slots, config);

        let mut sections = BTreeSet::new();
        let mut rooms = BTreeSet::new();
        for entry in teachers.values().flatten() {
            sections.extend(entry.groups.iter().cloned());
            if !entry.location.is_empty() {
                rooms.insert(entry.location.clone());
            }
        }

        Self {
            teachers,
            sections,
            rooms,
            source: None,
            semester: "Current Semester".to_string(),
        }
    }

    fn with_source(mut self, path: &Path) -> Self {
        self.semester = semester_info(&path.to_string_lossy());
        self.source = Some(path.to_path_buf());
        self
    }

    /// Build an index straight from an `.xlsx` workbook
    pub fn from_workbook<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<Self> {
        let path = path.as_ref();
        let grids = read_workbook(path)?;
        let slots = extract_workbook(&grids, config);
        Ok(Self::from_slots(&slots, config).with_source(path))
    }

    /// Build an index from a slot CSV
    pub fn from_csv<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<Self> {
        let path = path.as_ref();
        let slots = read_slots(path)?;
        Ok(Self::from_slots(&slots, config).with_source(path))
    }

    /// Build an index from either kind of source, chosen by extension
    pub fn load<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::SourceNotFound(path.to_path_buf()));
        }
        match SourceKind::of(path) {
            Some(SourceKind::Workbook) => Self::from_workbook(path, config),
            Some(SourceKind::SlotCsv) => Self::from_csv(path, config),
            None => Err(Error::UnsupportedSource(path.to_path_buf())),
        }
    }

    /// Schedule of one teacher (name is matched case-insensitively)
    pub fn by_teacher(&self, name: &str) -> Vec<ScheduleEntry> {
        self.teachers
            .get(&name.trim().to_uppercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Entries whose groups contain the token, case-insensitively
    pub fn by_section(&self, token: &str) -> Vec<ScheduleEntry> {
        let needle = token.trim().to_lowercase();
        self.filtered(|e| e.groups.iter().any(|g| g.to_lowercase().contains(&needle)))
    }

    /// Entries whose location contains the token, case-insensitively
    pub fn by_room(&self, token: &str) -> Vec<ScheduleEntry> {
        let needle = token.trim().to_lowercase();
        self.filtered(|e| e.location.to_lowercase().contains(&needle))
    }

    /// Every entry of every teacher, in canonical order
    pub fn all_entries(&self) -> Vec<ScheduleEntry> {
        self.filtered(|_| true)
    }

    fn filtered(&self, keep: impl Fn(&ScheduleEntry) -> bool) -> Vec<ScheduleEntry> {
        let mut entries: Vec<ScheduleEntry> = self
            .teachers
            .values()
            .flatten()
            .filter(|e| keep(e))
            .cloned()
            .collect();
        sort_entries(&mut entries);
        entries
    }

    /// All group tokens, sorted
    pub fn all_sections(&self) -> &BTreeSet<String> {
        &self.sections
    }

    /// All room names, sorted
    pub fn all_rooms(&self) -> &BTreeSet<String> {
        &self.rooms
    }

    /// All teachers ordered by honorific rank, then name
    pub fn all_teachers(&self) -> Vec<String> {
        sort_teachers(self.teachers.keys().cloned())
    }

    /// Number of teachers
    pub fn teacher_count(&self) -> usize {
        self.teachers.len()
    }

    /// Number of per-teacher entries
    pub fn entry_count(&self) -> usize {
        self.teachers.values().map(Vec::len).sum()
    }

    /// Check if the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
    }

    /// File the index was built from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Semester label derived from the source file name
    pub fn semester(&self) -> &str {
        &self.semester
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeRange;

    fn slot(day: &str, start: &str, room: &str, subject: &str, teachers: &str, groups: &[&str]) -> RawSlot {
        RawSlot {
            day: day.to_string(),
            room: room.to_string(),
            time: TimeRange::new(start, "23:00"),
            subject: subject.to_string(),
            teachers: vec![teachers.to_string()],
            groups: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn index() -> TimetableIndex {
        let slots = vec![
            slot("Tuesday", "9:00", "Lab 1", "OOP", "Mr. Ali", &["BSSE-2A"]),
            slot("Monday", "14:00", "CR-5", "DB", "Mr. Ali Dr. Sara", &["BSAI-4B", "BSDS-4B"]),
            slot("Wednesday", "10:00", "Lab 2", "AI", "Ms. Hina", &["BSAI-6A"]),
        ];
        TimetableIndex::from_slots(&slots, &ExtractConfig::default())
    }

    #[test]
    fn test_by_teacher_is_case_insensitive_and_sorted() {
        let idx = index();
        let entries = idx.by_teacher("mr. ali");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].day, "Monday");
        assert_eq!(entries[1].day, "Tuesday");
        assert!(idx.by_teacher("Dr. Nobody").is_empty());
    }

    #[test]
    fn test_by_section_substring() {
        let idx = index();
        let entries = idx.by_section("bsai");
        // DB is taught by two teachers, so it appears once per teacher
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].subject, "DB");
        assert_eq!(entries[2].subject, "AI");
    }

    #[test]
    fn test_by_room_substring() {
        let idx = index();
        let subjects: Vec<_> = idx.by_room("lab").into_iter().map(|e| e.subject).collect();
        assert_eq!(subjects, vec!["OOP", "AI"]);
    }

    #[test]
    fn test_listings() {
        let idx = index();
        assert_eq!(
            idx.all_sections().iter().cloned().collect::<Vec<_>>(),
            vec!["BSAI-4B", "BSAI-6A", "BSDS-4B", "BSSE-2A"]
        );
        assert_eq!(
            idx.all_rooms().iter().cloned().collect::<Vec<_>>(),
            vec!["CR-5", "Lab 1", "Lab 2"]
        );
        assert_eq!(idx.all_teachers(), vec!["MS. HINA", "MR. ALI", "DR. SARA"]);
        assert_eq!(idx.teacher_count(), 3);
        assert_eq!(idx.entry_count(), 4);
        assert_eq!(idx.all_entries().len(), 4);
    }

    #[test]
    fn test_empty_index() {
        let idx = TimetableIndex::empty();
        assert!(idx.is_empty());
        assert_eq!(idx.semester(), "No Data");
        assert!(idx.all_entries().is_empty());
    }

    #[test]
    fn test_source_kind() {
        assert_eq!(SourceKind::of(Path::new("a/b.XLSX")), Some(SourceKind::Workbook));
        assert_eq!(SourceKind::of(Path::new("b.csv")), Some(SourceKind::SlotCsv));
        assert_eq!(SourceKind::of(Path::new("b.txt")), None);
    }

    #[test]
    fn test_garbage_time_text_from_csv_still_indexes() {
        let csv = "Day,Time,Room,Subject,Class/Group,Teacher(s) Name\n\
                   Monday,99999999:00 - TBA,Lab 1,OOP,BSSE-2A,Mr. Ali\n\
                   Monday,8:00 - 9:20,Lab 1,OOP,BSSE-2A,Mr. Ali\n";
        let slots = crate::store::read_slots_str(csv, "t.csv").unwrap();
        let idx = TimetableIndex::from_slots(&slots, &ExtractConfig::default());

        let entries = idx.by_teacher("Mr. Ali");
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.start_time == "99999999:00"));
    }

    #[test]
    fn test_load_missing_source() {
        let err = TimetableIndex::load("/definitely/not/here.csv", &ExtractConfig::default());
        assert!(matches!(err, Err(Error::SourceNotFound(_))));
    }
}
