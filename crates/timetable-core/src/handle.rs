//! Shared index handle with change-driven reloads
//!
//! Readers take an `Arc` snapshot and keep using it for as long as they
//! like. A refresh builds a complete new index off to the side and swaps it
//! in with a single write, so nobody ever sees a half-built index.

use crate::config::ExtractConfig;
use crate::index::TimetableIndex;
use crate::scanner::resolve_upload_source;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

/// Where the handle looks for its timetable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A single workbook or slot CSV
    File(PathBuf),
    /// An uploads directory with `xlsx/` and `csv/` subdirectories
    Uploads(PathBuf),
}

/// Outcome of the most recent load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded {
        source: PathBuf,
        semester: String,
        teachers: usize,
        entries: usize,
        modified: DateTime<Utc>,
    },
    Empty {
        reason: String,
    },
}

impl LoadStatus {
    fn empty(reason: impl Into<String>) -> Self {
        LoadStatus::Empty {
            reason: reason.into(),
        }
    }

    /// Check if an index was loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }

    /// Path of the loaded source, if any
    pub fn source(&self) -> Option<&Path> {
        match self {
            LoadStatus::Loaded { source, .. } => Some(source),
            LoadStatus::Empty { .. } => None,
        }
    }
}

#[derive(Debug)]
struct LoadState {
    stamp: Option<(PathBuf, SystemTime)>,
    status: LoadStatus,
}

/// Holds the current index snapshot and reloads it when the source changes
#[derive(Debug)]
pub struct IndexHandle {
    source: Source,
    config: ExtractConfig,
    current: RwLock<Arc<TimetableIndex>>,
    state: Mutex<LoadState>,
}

impl IndexHandle {
    /// Create a handle and perform the first load
    pub fn new(source: Source, config: ExtractConfig) -> Self {
        let handle = Self {
            source,
            config,
            current: RwLock::new(Arc::new(TimetableIndex::empty())),
            state: Mutex::new(LoadState {
                stamp: None,
                status: LoadStatus::empty("not loaded yet"),
            }),
        };
        handle.refresh();
        handle
    }

    /// Current index; stays valid even if a reload happens afterwards
    pub fn snapshot(&self) -> Arc<TimetableIndex> {
        Arc::clone(&self.current.read())
    }

    /// Status of the most recent load
    pub fn status(&self) -> LoadStatus {
        self.state.lock().status.clone()
    }

    /// Rebuild the index if the source file or its modification time changed.
    ///
    /// Returns `true` when a new snapshot was published.
    pub fn refresh(&self) -> bool {
        let mut state = self.state.lock();

        let path = match self.resolve() {
            Ok(path) => path,
            Err(reason) => return self.publish_empty(&mut state, reason),
        };
        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                return self.publish_empty(&mut state, format!("{}: {}", path.display(), e))
            }
        };

        if let Some((last_path, last_modified)) = &state.stamp {
            if *last_path == path && *last_modified == modified {
                return false;
            }
        }

        match TimetableIndex::load(&path, &self.config) {
            Ok(index) => {
                info!(
                    source = %path.display(),
                    teachers = index.teacher_count(),
                    entries = index.entry_count(),
                    "loaded timetable"
                );
                state.status = LoadStatus::Loaded {
                    source: path.clone(),
                    semester: index.semester().to_string(),
                    teachers: index.teacher_count(),
                    entries: index.entry_count(),
                    modified: DateTime::<Utc>::from(modified),
                };
                state.stamp = Some((path, modified));
                *self.current.write() = Arc::new(index);
                true
            }
            Err(e) => self.publish_empty(&mut state, e.to_string()),
        }
    }

    /// Force a rebuild regardless of modification times
    pub fn reload(&self) -> bool {
        self.state.lock().stamp = None;
        self.refresh()
    }

    fn resolve(&self) -> std::result::Result<PathBuf, String> {
        match &self.source {
            Source::File(path) => Ok(path.clone()),
            Source::Uploads(root) => match resolve_upload_source(root, &self.config) {
                Ok(Some(path)) => Ok(path),
                Ok(None) => Err(format!("no timetable found under {}", root.display())),
                Err(e) => Err(e.to_string()),
            },
        }
    }

    fn publish_empty(&self, state: &mut LoadState, reason: String) -> bool {
        warn!("timetable unavailable: {}", reason);
        let changed = state.stamp.is_some() || !self.current.read().is_empty();
        state.stamp = None;
        state.status = LoadStatus::empty(reason);
        *self.current.write() = Arc::new(TimetableIndex::empty());
        changed
    }

    /// Source this handle was created with
    pub fn source(&self) -> &Source {
        &self.source
    }
}
