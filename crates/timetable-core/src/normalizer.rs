//! Normalizer: merges consecutive slots and builds per-teacher schedules

use crate::builder::RawSlot;
use crate::config::ExtractConfig;
use crate::groups::parse_groups;
use crate::teachers::parse_teachers;
use crate::time::{normalize_time, start_sort_key, time_to_minutes, weekday_index};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// A finalized, per-teacher schedule record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub subject: String,
    pub groups: Vec<String>,
    /// Every teacher of the class, comma-joined for display
    pub teachers: String,
}

impl ScheduleEntry {
    /// Two entries are duplicates when they describe the same class slot
    fn same_slot(&self, other: &ScheduleEntry) -> bool {
        self.day == other.day
            && self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.location == other.location
            && self.subject == other.subject
    }
}

/// A slot with its teachers resolved, ready for merging
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeachingSlot {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub subject: String,
    pub groups: Vec<String>,
    pub teachers: Vec<String>,
}

impl TeachingSlot {
    fn can_extend(&self, next: &TeachingSlot) -> bool {
        let same_teachers = self.teachers.iter().collect::<BTreeSet<_>>()
            == next.teachers.iter().collect::<BTreeSet<_>>();

        self.day == next.day
            && self.subject == next.subject
            && self.location == next.location
            && self.groups == next.groups
            && same_teachers
            && normalize_time(&self.end_time) == normalize_time(&next.start_time)
    }
}

/// Resolve teachers and groups of raw slots.
///
/// Slots with an empty or placeholder subject are skipped, as are slots whose
/// teacher text holds no recognizable honorific; the latter are reported.
pub fn teaching_slots(slots: &[RawSlot], config: &ExtractConfig) -> Vec<TeachingSlot> {
    let mut result = Vec::with_capacity(slots.len());

    for slot in slots {
        let subject = slot.subject.trim();
        let teacher_text = slot.teacher_field();
        if subject.is_empty() || config.is_placeholder_subject(subject) || teacher_text.is_empty() {
            continue;
        }

        let teachers = parse_teachers(&teacher_text);
        if teachers.is_empty() {
            warn!(
                day = %slot.day,
                room = %slot.room,
                subject = %subject,
                teachers = %teacher_text,
                "dropping slot: no recognizable teacher"
            );
            continue;
        }

        result.push(TeachingSlot {
            day: slot.day.trim().to_string(),
            start_time: slot.time.start.trim().to_string(),
            end_time: slot.time.end.trim().to_string(),
            location: slot.room.trim().to_string(),
            subject: subject.to_string(),
            groups: parse_groups(&slot.group_field()),
            teachers,
        });
    }

    result
}

/// Merge time-adjacent slots that agree on everything but time.
///
/// Exact duplicates are removed first so that loading the same content twice
/// yields the same spans as loading it once.
pub fn merge_consecutive(slots: Vec<TeachingSlot>) -> Vec<TeachingSlot> {
    let mut seen = HashSet::new();
    let mut slots: Vec<TeachingSlot> = slots
        .into_iter()
        .filter(|slot| seen.insert(slot.clone()))
        .collect();

    slots.sort_by(|a, b| {
        a.day
            .cmp(&b.day)
            .then_with(|| time_to_minutes(&a.start_time).cmp(&time_to_minutes(&b.start_time)))
            .then_with(|| a.subject.cmp(&b.subject))
            .then_with(|| a.location.cmp(&b.location))
            .then_with(|| a.teachers.join(", ").cmp(&b.teachers.join(", ")))
    });

    let mut merged: Vec<TeachingSlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(current) if current.can_extend(&slot) => {
                debug!(
                    day = %current.day,
                    subject = %current.subject,
                    from = %current.start_time,
                    to = %slot.end_time,
                    "merging consecutive slots"
                );
                current.end_time = slot.end_time;
            }
            _ => merged.push(slot),
        }
    }

    merged
}

/// Order entries by weekday, then by the digits of their start time
pub fn sort_entries(entries: &mut [ScheduleEntry]) {
    entries.sort_by_key(|e| (weekday_index(&e.day), start_sort_key(&e.start_time)));
}

/// Explode merged slots into one entry per teacher, dropping duplicates
pub fn explode_by_teacher(slots: &[TeachingSlot]) -> BTreeMap<String, Vec<ScheduleEntry>> {
    let mut by_teacher: BTreeMap<String, Vec<ScheduleEntry>> = BTreeMap::new();

    for slot in slots {
        let display = slot.teachers.join(", ");
        for teacher in &slot.teachers {
            let entry = ScheduleEntry {
                day: slot.day.clone(),
                start_time: slot.start_time.clone(),
                end_time: slot.end_time.clone(),
                location: slot.location.clone(),
                subject: slot.subject.clone(),
                groups: slot.groups.clone(),
                teachers: display.clone(),
            };

            let entries = by_teacher.entry(teacher.clone()).or_default();
            if !entries.iter().any(|existing| existing.same_slot(&entry)) {
                entries.push(entry);
            }
        }
    }

    for entries in by_teacher.values_mut() {
        sort_entries(entries);
    }

    by_teacher
}

/// Full normalization: resolve, merge, explode, dedup and sort
pub fn normalize(slots: &[RawSlot], config: &ExtractConfig) -> BTreeMap<String, Vec<ScheduleEntry>> {
    let merged = merge_consecutive(teaching_slots(slots, config));
    explode_by_teacher(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TimeRange;

    fn raw(day: &str, start: &str, end: &str, subject: &str, teachers: &str) -> RawSlot {
        RawSlot {
            day: day.to_string(),
            room: "Lab 1".to_string(),
            time: TimeRange::new(start, end),
            subject: subject.to_string(),
            teachers: vec![teachers.to_string()],
            groups: vec!["BSSE-2A".to_string()],
        }
    }

    #[test]
    fn test_merge_two_adjacent() {
        let slots = vec![
            raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali"),
            raw("Monday", "9:20", "10:40", "OOP", "Mr. Ali"),
        ];
        let schedule = normalize(&slots, &ExtractConfig::default());
        let entries = &schedule["MR. ALI"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start_time, "8:00");
        assert_eq!(entries[0].end_time, "10:40");
    }

    #[test]
    fn test_merge_run_of_three_matches_single_span() {
        let slots = vec![
            raw("Monday", "2:00", "3:00", "Lab", "Dr. Zia"),
            raw("Monday", "12:00", "1:00", "Lab", "Dr. Zia"),
            raw("Monday", "1:00", "2:00", "Lab", "Dr. Zia"),
        ];
        let merged = merge_consecutive(teaching_slots(&slots, &ExtractConfig::default()));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_time, "12:00");
        assert_eq!(merged[0].end_time, "3:00");

        let combined = merge_consecutive(teaching_slots(
            &[raw("Monday", "12:00", "3:00", "Lab", "Dr. Zia")],
            &ExtractConfig::default(),
        ));
        assert_eq!(merged, combined);
    }

    #[test]
    fn test_padded_times_are_adjacent() {
        let slots = vec![
            raw("Monday", "8:00", "09:20", "OOP", "Mr. Ali"),
            raw("Monday", "9:20", "10:40", "OOP", "Mr. Ali"),
        ];
        let merged = merge_consecutive(teaching_slots(&slots, &ExtractConfig::default()));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_different_rooms_do_not_merge() {
        let mut second = raw("Monday", "9:20", "10:40", "OOP", "Mr. Ali");
        second.room = "Lab 2".to_string();
        let slots = vec![raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali"), second];
        let merged = merge_consecutive(teaching_slots(&slots, &ExtractConfig::default()));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_teacher_order_does_not_block_merge() {
        let slots = vec![
            raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali Dr. Sara"),
            raw("Monday", "9:20", "10:40", "OOP", "Dr. Sara Mr. Ali"),
        ];
        let merged = merge_consecutive(teaching_slots(&slots, &ExtractConfig::default()));
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_explode_per_teacher_keeps_display() {
        let slots = vec![raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali Dr. Sara")];
        let schedule = normalize(&slots, &ExtractConfig::default());
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule["DR. SARA"][0].teachers, "MR. ALI, DR. SARA");
        assert_eq!(schedule["MR. ALI"][0].groups, vec!["BSSE-2A"]);
    }

    #[test]
    fn test_loading_twice_has_no_duplicates() {
        let once = vec![
            raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali"),
            raw("Monday", "9:20", "10:40", "OOP", "Mr. Ali"),
            raw("Tuesday", "11:00", "12:20", "OOP", "Mr. Ali"),
        ];
        let mut twice = once.clone();
        twice.extend(once.clone());

        let config = ExtractConfig::default();
        assert_eq!(normalize(&twice, &config), normalize(&once, &config));
        assert_eq!(normalize(&twice, &config)["MR. ALI"].len(), 2);
    }

    #[test]
    fn test_dedup_ignores_groups() {
        let mut other = raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali");
        other.groups = vec!["BSSE-2B".to_string()];
        let slots = vec![raw("Monday", "8:00", "9:20", "OOP", "Mr. Ali"), other];
        let schedule = normalize(&slots, &ExtractConfig::default());
        assert_eq!(schedule["MR. ALI"].len(), 1);
    }

    #[test]
    fn test_sort_monday_first() {
        let slots = vec![
            raw("Tuesday", "09:00", "10:00", "OOP", "Mr. Ali"),
            raw("Monday", "14:00", "15:00", "DB", "Mr. Ali"),
        ];
        let schedule = normalize(&slots, &ExtractConfig::default());
        let days: Vec<_> = schedule["MR. ALI"].iter().map(|e| e.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Tuesday"]);
    }

    #[test]
    fn test_unknown_day_sorts_last() {
        let mut entries = vec![
            ScheduleEntry {
                day: "Someday".to_string(),
                start_time: "8:00".to_string(),
                end_time: "9:00".to_string(),
                location: String::new(),
                subject: String::new(),
                groups: Vec::new(),
                teachers: String::new(),
            },
            ScheduleEntry {
                day: "Sunday".to_string(),
                start_time: "13:00".to_string(),
                end_time: "14:00".to_string(),
                location: String::new(),
                subject: String::new(),
                groups: Vec::new(),
                teachers: String::new(),
            },
        ];
        sort_entries(&mut entries);
        assert_eq!(entries[0].day, "Sunday");
    }

    #[test]
    fn test_skips_placeholder_and_unrecognized() {
        let slots = vec![
            raw("Monday", "8:00", "9:20", "F25", "Mr. Ali"),
            raw("Monday", "8:00", "9:20", "OOP", "Visiting Faculty"),
            raw("Monday", "8:00", "9:20", "OOP", ""),
        ];
        assert!(teaching_slots(&slots, &ExtractConfig::default()).is_empty());
    }
}
