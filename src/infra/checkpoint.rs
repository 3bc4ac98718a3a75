// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the trained network using Burn's gzipped
// MessagePack recorder at full precision, plus the run
// configuration as JSON.
//
// What gets saved:
//   1. Model weights (model.mpk.gz)  — all learned parameters
//   2. train_config.json             — data + architecture config
//   3. training_report.json          — how the run ended
//
// The config is needed to rebuild the exact architecture (input
// shape, crop) before the weights can be loaded into it, and to
// re-derive the same train/test split for evaluation.
//
// File layout:
//   checkpoints/
//     model.mpk.gz
//     train_config.json
//     training_report.json
//     metrics.csv            ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::SteeringModel;
use crate::ml::trainer::TrainingReport;

const MODEL_FILE:  &str = "model";
const CONFIG_FILE: &str = "train_config.json";
const REPORT_FILE: &str = "training_report.json";

/// f32 weights in `model.mpk.gz`, so a reloaded model reproduces the trained one
type ModelRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Manages saving and loading of the trained model and its metadata.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Point at a checkpoint directory. Nothing is created until something is saved.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))
    }

    /// Save model weights to `{dir}/model.mpk.gz`.
    pub fn save_model<B: Backend>(&self, model: &SteeringModel<B>) -> Result<()> {
        self.ensure_dir()?;
        // Without extension — the recorder adds it
        let path = self.dir.join(MODEL_FILE);

        ModelRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save model to '{}'", path.display())
            })?;

        tracing::info!("Saved model to '{}'", path.display());
        Ok(())
    }

    /// Load weights into a freshly initialised model of the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  SteeringModel<B>,
        device: &B::Device,
    ) -> Result<SteeringModel<B>> {
        let path = self.dir.join(MODEL_FILE);

        let record = ModelRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?",
                    path.display())
            })?;

        tracing::info!("Loaded model from '{}'", path.display());
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        if self.dir.join(REPORT_FILE).exists() {
            match self.read_json::<TrainingReport>(REPORT_FILE) {
                Ok(report) => tracing::info!(
                    "Checkpoint trained for {} epochs (final val_loss {:.5})",
                    report.epochs_run,
                    report.final_val_loss
                ),
                Err(e) => tracing::warn!("Ignoring unreadable training report: {e:#}"),
            }
        }

        self.read_json(CONFIG_FILE).with_context(|| {
            "Make sure you have run 'train' with this checkpoint directory first."
        })
    }

    pub fn save_report(&self, report: &TrainingReport) -> Result<()> {
        self.write_json(REPORT_FILE, report)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;

        serde_json::from_str(&json)
            .with_context(|| format!("Invalid JSON in '{}'", path.display()))
    }
}
