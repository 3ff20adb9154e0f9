//! Extraction settings
//!
//! Every knob has a default matching the department sheets this tool was
//! written against; a JSON file can override any subset of them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for layout detection and cell filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Column holding day names and room labels (0-based, B = 1)
    pub label_column: usize,
    /// First column probed for time headers
    pub first_time_column: usize,
    /// Exclusive end of the time-header column window (19 stops after column S)
    pub time_column_limit: usize,
    /// Exclusive end of the window probed for a same-row time header
    pub same_row_probe_limit: usize,
    /// Rows below a day marker searched for a "Rooms" label
    pub rooms_label_lookahead: usize,
    /// Maximum number of rows scanned for rooms in one block
    pub room_window: usize,
    /// Subject lines that mark a cell as non-teaching (compared lowercase)
    pub filler_phrases: Vec<String>,
    /// Subjects that are placeholders and never produce schedule entries
    pub subject_placeholders: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            label_column: 1,
            first_time_column: 2,
            time_column_limit: 19,
            same_row_probe_limit: 15,
            rooms_label_lookahead: 4,
            room_window: 20,
            filler_phrases: vec![
                "used in cs department".to_string(),
                "namaz break".to_string(),
            ],
            subject_placeholders: vec!["F25".to_string()],
        }
    }
}

impl ExtractConfig {
    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save settings to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check whether a subject line marks the whole cell as filler
    pub fn is_filler(&self, subject: &str) -> bool {
        let lowered = subject.trim().to_lowercase();
        self.filler_phrases
            .iter()
            .any(|phrase| phrase.trim().to_lowercase() == lowered)
    }

    /// Check whether a subject is a placeholder
    pub fn is_placeholder_subject(&self, subject: &str) -> bool {
        let subject = subject.trim();
        self.subject_placeholders.iter().any(|p| p == subject)
    }
}
