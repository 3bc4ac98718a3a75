// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Prepare data (log → frames → images → train/test)
//   Step 2: Carve the validation tail off the training pool
//   Step 3: Build Burn datasets                (Layer 4 - data)
//   Step 4: Save config                        (Layer 6 - infra)
//   Step 5: Train, save model + report         (Layer 5 - ml)
//   Step 6: Optionally evaluate on the test set
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::pipeline::prepare_data;
use crate::data::{
    dataset::DrivingDataset,
    image_loader::{DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH},
    log_reader::DEFAULT_LOG_FILE,
    splitter::{
        split_validation_tail, DatasetSummary,
        DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION, DEFAULT_VALIDATION_FRACTION,
    },
};
use crate::domain::driving_record::DEFAULT_STEERING_CORRECTION;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    backend::BackendKind,
    early_stopping::DEFAULT_PATIENCE,
    evaluator::{evaluate_checkpoint, EvaluationReport},
    model::SteeringModelConfig,
    trainer::{run_training, TrainingReport},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a run needs: where the data is, how it is labelled
// and split, the network's input shape, and the optimiser settings.
// Saved next to the model so evaluation can rebuild both the
// network and the exact same train/test split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:            String,
    pub log_file:            String,
    pub checkpoint_dir:      String,
    pub steering_correction: f32,
    pub test_fraction:       f64,
    pub validation_fraction: f64,
    pub seed:                u64,
    pub image_height:        usize,
    pub image_width:         usize,
    pub crop_top:            usize,
    pub crop_bottom:         usize,
    pub dropout:             f64,
    pub epochs:              usize,
    pub batch_size:          usize,
    pub learning_rate:       f64,
    pub patience:            usize,
    pub backend:             BackendKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:            "Training Data".to_string(),
            log_file:            DEFAULT_LOG_FILE.to_string(),
            checkpoint_dir:      "checkpoints".to_string(),
            steering_correction: DEFAULT_STEERING_CORRECTION,
            test_fraction:       DEFAULT_TEST_FRACTION,
            validation_fraction: DEFAULT_VALIDATION_FRACTION,
            seed:                DEFAULT_SPLIT_SEED,
            image_height:        DEFAULT_IMAGE_HEIGHT,
            image_width:         DEFAULT_IMAGE_WIDTH,
            crop_top:            70,
            crop_bottom:         25,
            dropout:             0.25,
            epochs:              10,
            batch_size:          32,
            learning_rate:       1e-3,
            patience:            DEFAULT_PATIENCE,
            backend:             BackendKind::default(),
        }
    }
}

impl TrainConfig {
    /// Architecture config derived from the image shape and crop settings
    pub fn model_config(&self) -> SteeringModelConfig {
        SteeringModelConfig::new()
            .with_input_height(self.image_height)
            .with_input_width(self.image_width)
            .with_crop_top(self.crop_top)
            .with_crop_bottom(self.crop_bottom)
            .with_dropout(self.dropout)
    }
}

/// Everything a finished `train` run produced
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub summary:    DatasetSummary,
    pub report:     TrainingReport,
    pub evaluation: Option<EvaluationReport>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config:         TrainConfig,
    evaluate_after: bool,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, evaluate_after: false }
    }

    /// Evaluate the saved model on the held-out test set once training ends
    pub fn with_evaluation(mut self, evaluate_after: bool) -> Self {
        self.evaluate_after = evaluate_after;
        self
    }

    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg = &self.config;

        // Fail on an impossible architecture before decoding thousands of images
        cfg.model_config().feature_dims()?;

        // ── Step 1: Prepare data ──────────────────────────────────────────────
        let data = prepare_data(cfg)?;

        // ── Step 2: Validation tail ───────────────────────────────────────────
        let (train_samples, val_samples) =
            split_validation_tail(data.train, cfg.validation_fraction)?;

        // ── Step 3: Burn datasets ─────────────────────────────────────────────
        let train_dataset = DrivingDataset::new(train_samples);
        let val_dataset   = DrivingDataset::new(val_samples);
        let test_dataset  = DrivingDataset::new(data.test);

        // ── Step 4: Save config ───────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 5: Train ─────────────────────────────────────────────────────
        let report = run_training(cfg, train_dataset, val_dataset, &ckpt_manager)?;

        // ── Step 6: Evaluate ──────────────────────────────────────────────────
        let evaluation = if self.evaluate_after {
            Some(evaluate_checkpoint(cfg, &ckpt_manager, test_dataset)?)
        } else {
            None
        };

        Ok(TrainOutcome { summary: data.summary, report, evaluation })
    }
}
