// ============================================================
// Layer 4 — Driving Log Reader
// ============================================================
// Reads the simulator's `driving_log.csv` using the csv crate.
//
// Each line looks like:
//   IMG/center_2016_12_01.jpg, IMG/left_2016_12_01.jpg, IMG/right_2016_12_01.jpg, 0, 0, 0, 22.14
//   └──────── center ───────┘ └──────── left ────────┘ └──────── right ────────┘ steer throttle brake speed
//
// Only the first four columns matter for training. The file has
// no header, except for some published datasets that start with
// "center,left,right,steering,...". That single header row is
// recognised and skipped.
//
// Image paths are relative to the directory the log lives in
// unless the simulator wrote absolute paths.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::domain::driving_record::DrivingRecord;
use crate::domain::traits::RecordSource;

/// File name the simulator writes next to its IMG/ folder
pub const DEFAULT_LOG_FILE: &str = "driving_log.csv";

/// Index of the steering column in a log row
const STEERING_COLUMN: usize = 3;

/// Reads driving records from a CSV log inside a data directory.
/// Implements the RecordSource trait from Layer 3.
pub struct DrivingLogReader {
    /// Directory containing the log and (usually) the IMG/ folder
    data_dir: PathBuf,
    /// Log file name inside `data_dir`
    log_file: String,
}

impl DrivingLogReader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }

    /// Read a differently named log file from the same directory
    pub fn with_log_file(mut self, log_file: impl Into<String>) -> Self {
        self.log_file = log_file.into();
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }

    /// Resolve an image path from the log against the data directory.
    pub fn resolve(&self, image_path: &str) -> PathBuf {
        resolve_image_path(&self.data_dir, image_path)
    }
}

impl RecordSource for DrivingLogReader {
    fn load_all(&self) -> Result<Vec<DrivingRecord>> {
        let path = self.log_path();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Cannot open driving log '{}'", path.display()))?;

        let mut records = Vec::new();

        for (idx, row) in reader.records().enumerate() {
            let row = row.with_context(|| {
                format!("Malformed CSV in '{}' (record {})", path.display(), idx + 1)
            })?;
            // Physical line, which differs from idx + 1 once a quoted field spans lines
            let line = row.position().map_or(idx as u64 + 1, |p| p.line());

            if idx == 0 && is_header(&row) {
                tracing::debug!("Skipping header row in '{}'", path.display());
                continue;
            }

            records.push(parse_row(&row, line)?);
        }

        tracing::info!(
            "Read {} driving records from '{}'",
            records.len(),
            path.display()
        );
        Ok(records)
    }
}

/// True when the row's steering column carries the column name
fn is_header(row: &csv::StringRecord) -> bool {
    row.get(STEERING_COLUMN)
        .map(|s| s.trim().eq_ignore_ascii_case("steering"))
        .unwrap_or(false)
}

fn parse_row(row: &csv::StringRecord, line: u64) -> Result<DrivingRecord> {
    if row.len() <= STEERING_COLUMN {
        bail!(
            "Line {}: expected at least {} columns (center, left, right, steering), found {}",
            line,
            STEERING_COLUMN + 1,
            row.len()
        );
    }

    let raw_angle = row[STEERING_COLUMN].trim();
    let steering: f32 = raw_angle
        .parse()
        .with_context(|| format!("Line {}: invalid steering angle '{}'", line, raw_angle))?;

    Ok(DrivingRecord::new(&row[0], &row[1], &row[2], steering))
}

/// Absolute paths are used as-is, relative ones are joined onto `data_dir`.
pub fn resolve_image_path(data_dir: &Path, image_path: &str) -> PathBuf {
    let trimmed = Path::new(image_path.trim());
    if trimmed.is_absolute() {
        trimmed.to_path_buf()
    } else {
        data_dir.join(trimmed)
    }
}
