// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Loads a trained model and measures its MSE on the test set.
//
// The test set is rebuilt from the config saved at training
// time (same log, correction, fraction and seed), so it is the
// same set of frames that training held out.

use anyhow::Result;

use crate::application::pipeline::prepare_data;
use crate::data::dataset::DrivingDataset;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{
    backend::BackendKind,
    evaluator::{evaluate_checkpoint, EvaluationReport},
};

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    /// Read the recording from a different location than at training time
    data_dir:       Option<String>,
    backend:        Option<BackendKind>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: impl Into<String>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into(), data_dir: None, backend: None }
    }

    pub fn with_data_dir(mut self, data_dir: Option<String>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn with_backend(mut self, backend: Option<BackendKind>) -> Self {
        self.backend = backend;
        self
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir);
        let mut cfg      = ckpt_manager.load_config()?;

        if let Some(dir) = &self.data_dir {
            cfg.data_dir = dir.clone();
        }
        if let Some(backend) = self.backend {
            cfg.backend = backend;
        }

        let data = prepare_data(&cfg)?;
        evaluate_checkpoint(&cfg, &ckpt_manager, DrivingDataset::new(data.test))
    }
}
