//! Upload directory scanner: finds the newest timetable source

use crate::builder::extract_workbook;
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::patterns;
use crate::reader::read_workbook;
use crate::store::write_slots;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};
use walkdir::WalkDir;

/// A file found during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Last modification time
    pub modified: SystemTime,
}

/// Result of converting a workbook to a slot CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheets: usize,
    pub slots: usize,
}

/// Newest file under `root` (recursively) with one of the given extensions
pub fn latest_file<P: AsRef<Path>>(root: P, extensions: &[&str]) -> Result<Option<SourceFile>> {
    let root = root.as_ref();
    if !root.exists() {
        return Ok(None);
    }

    let mut newest: Option<SourceFile> = None;
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        if !matches || !entry.file_type().is_file() {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |n| modified > n.modified) {
            newest = Some(SourceFile {
                path: path.to_path_buf(),
                modified,
            });
        }
    }

    Ok(newest)
}

/// Newest `.xlsx` workbook under `root`
pub fn latest_workbook<P: AsRef<Path>>(root: P) -> Result<Option<SourceFile>> {
    latest_file(root, &["xlsx"])
}

/// CSV path a workbook converts to inside `csv_dir`
pub fn csv_path_for(workbook: &Path, csv_dir: &Path) -> PathBuf {
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "timetable".to_string());
    csv_dir.join(format!("{}.csv", stem))
}

/// A conversion is needed when the CSV is missing or older than the workbook
pub fn needs_conversion(workbook: &Path, csv: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(workbook), modified(csv)) {
        (Some(book), Some(csv)) => book > csv,
        (_, None) => true,
        (None, Some(_)) => false,
    }
}

/// Convert a workbook into a slot CSV. Without an explicit output path the
/// CSV is written next to the workbook with a `.csv` extension.
pub fn convert_workbook(
    input: &Path,
    output: Option<&Path>,
    config: &ExtractConfig,
) -> Result<ConversionSummary> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("csv"));

    let grids = read_workbook(input)?;
    let slots = extract_workbook(&grids, config);
    if slots.is_empty() {
        warn!(input = %input.display(), "no day blocks detected in workbook");
    }
    write_slots(&output, &slots)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        slots = slots.len(),
        "converted workbook"
    );

    Ok(ConversionSummary {
        input: input.to_path_buf(),
        output,
        sheets: grids.len(),
        slots: slots.len(),
    })
}

/// Pick the timetable to serve from an uploads directory laid out as
/// `<root>/xlsx/*.xlsx` and `<root>/csv/*.csv`.
///
/// The newest workbook is converted when its CSV is missing or stale. If
/// that fails, or there is no workbook, the newest existing CSV is used.
pub fn resolve_upload_source(root: &Path, config: &ExtractConfig) -> Result<Option<PathBuf>> {
    let csv_dir = root.join("csv");

    if let Some(workbook) = latest_workbook(root.join("xlsx"))? {
        let expected = csv_path_for(&workbook.path, &csv_dir);
        if !needs_conversion(&workbook.path, &expected) {
            return Ok(Some(expected));
        }
        match convert_workbook(&workbook.path, Some(&expected), config) {
            Ok(summary) => return Ok(Some(summary.output)),
            Err(e) => warn!(workbook = %workbook.path.display(), "conversion failed: {}", e),
        }
    }

    Ok(latest_file(&csv_dir, &["csv"])?.map(|f| f.path))
}

/// Semester label from a file name, e.g. `"Fall-25"`
pub fn semester_info(file_name: &str) -> String {
    patterns::semester()
        .and_then(|re| re.captures(file_name))
        .map(|caps| format!("{}-{}", &caps[1], &caps[2]))
        .unwrap_or_else(|| "Current Semester".to_string())
}
