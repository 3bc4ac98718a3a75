// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records the learning curve to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: sample-weighted MSE on the training set
//   - val_loss:   MSE on the validation set (dropout disabled)
//   - improved:   whether val_loss set a new best
//
// Output file: checkpoints/metrics.csv, recreated at the start
// of every training run.
//
// Example CSV output:
//   epoch,train_loss,val_loss,improved
//   1,0.031200,0.024100,true
//   2,0.022800,0.025300,false
//
// Reference: csv crate documentation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs::{self, File}, path::PathBuf};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean squared steering error over all training samples
    pub train_loss: f64,

    /// Mean squared steering error on the validation set
    pub val_loss: f64,

    /// True if val_loss was the best seen so far
    pub improved: bool,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, improved: bool) -> Self {
        Self { epoch, train_loss, val_loss, improved }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
    writer:   csv::Writer<File>,
}

impl MetricsLogger {
    /// Create `{dir}/metrics.csv`, replacing any previous run's file.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let writer   = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { csv_path, writer })
    }

    /// Append one epoch's metrics and flush so the file is readable mid-run.
    pub fn log(&mut self, m: &EpochMetrics) -> Result<()> {
        self.writer.serialize(RoundedRow::from(m))?;
        self.writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

/// CSV row with losses printed to 6 decimal places
#[derive(Serialize)]
struct RoundedRow {
    epoch:      usize,
    train_loss: String,
    val_loss:   String,
    improved:   bool,
}

impl From<&EpochMetrics> for RoundedRow {
    fn from(m: &EpochMetrics) -> Self {
        Self {
            epoch:      m.epoch,
            train_loss: format!("{:.6}", m.train_loss),
            val_loss:   format!("{:.6}", m.val_loss),
            improved:   m.improved,
        }
    }
}

/// Read back a metrics CSV written by MetricsLogger
#[cfg(test)]
pub fn read_metrics(path: &std::path::Path) -> Result<Vec<EpochMetrics>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<EpochMetrics>, _>>()
        .with_context(|| format!("Malformed metrics in '{}'", path.display()))?;
    Ok(rows)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_header_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let mut logger = MetricsLogger::create(tmp.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.0312, 0.0241, true)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.0228, 0.0253, false)).unwrap();

        let text = std::fs::read_to_string(logger.csv_path()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("epoch,train_loss,val_loss,improved"));
        assert_eq!(lines.next(), Some("1,0.031200,0.024100,true"));
        assert_eq!(lines.next(), Some("2,0.022800,0.025300,false"));
    }

    #[test]
    fn test_new_run_replaces_old_file() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut first = MetricsLogger::create(tmp.path()).unwrap();
            first.log(&EpochMetrics::new(1, 1.0, 1.0, true)).unwrap();
            first.log(&EpochMetrics::new(2, 0.5, 0.5, true)).unwrap();
        }
        let mut second = MetricsLogger::create(tmp.path()).unwrap();
        second.log(&EpochMetrics::new(1, 0.1, 0.2, true)).unwrap();

        let rows = read_metrics(second.csv_path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].epoch, 1);
        assert!((rows[0].val_loss - 0.2).abs() < 1e-9);
    }
}
