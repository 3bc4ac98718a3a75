// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Rebuilds the network from the saved config, loads the saved
// weights and measures mean squared error on a dataset.
//
// The loss is weighted by batch size so a short final batch
// counts for exactly as many samples as it holds.

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{FrameBatch, FrameBatcher},
    dataset::DrivingDataset,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::BackendKind;
use crate::ml::model::SteeringModel;

type GpuBackend = burn::backend::Wgpu;
type CpuBackend = burn::backend::NdArray;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub samples: usize,
    pub mse:     f64,
}

impl EvaluationReport {
    /// MSE scaled by 100, easier to read for small steering errors
    pub fn scaled(&self) -> f64 {
        self.mse * 100.0
    }
}

/// Sample-weighted mean squared error of `model` over every batch in `loader`.
/// Returns NaN when the loader yields no samples.
pub fn mean_squared_error<B: Backend>(
    model:  &SteeringModel<B>,
    loader: &dyn DataLoader<FrameBatch<B>>,
) -> (f64, usize) {
    let mut loss_sum = 0.0f64;
    let mut seen     = 0usize;

    for batch in loader.iter() {
        let n = batch.steering.dims()[0];
        let (loss, _) = model.forward_loss(batch.images, batch.steering);
        loss_sum += loss.into_scalar().elem::<f64>() * n as f64;
        seen     += n;
    }

    let mse = if seen > 0 { loss_sum / seen as f64 } else { f64::NAN };
    (mse, seen)
}

/// Load the checkpoint in `ckpt_manager` and evaluate it on `dataset`.
pub fn evaluate_checkpoint(
    cfg:          &TrainConfig,
    ckpt_manager: &CheckpointManager,
    dataset:      DrivingDataset,
) -> Result<EvaluationReport> {
    tracing::info!("Evaluating on {} test frames ({} backend)", dataset.sample_count(), cfg.backend);
    match cfg.backend {
        BackendKind::Wgpu    => evaluate_on::<GpuBackend>(cfg, ckpt_manager, dataset),
        BackendKind::NdArray => evaluate_on::<CpuBackend>(cfg, ckpt_manager, dataset),
    }
}

fn evaluate_on<B: Backend>(
    cfg:          &TrainConfig,
    ckpt_manager: &CheckpointManager,
    dataset:      DrivingDataset,
) -> Result<EvaluationReport> {
    let device = B::Device::default();

    let model: SteeringModel<B> = cfg.model_config().init(&device)?;
    let model = ckpt_manager.load_model(model, &device)?;

    let loader = DataLoaderBuilder::new(FrameBatcher::<B>::new(device))
        .batch_size(cfg.batch_size)
        .build(dataset);

    let (mse, samples) = mean_squared_error(&model, loader.as_ref());
    tracing::debug!("Evaluated {} samples, mse={:.6}", samples, mse);

    Ok(EvaluationReport { samples, mse })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::FrameSample;
    use crate::ml::model::SteeringModelConfig;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    fn tiny_config() -> SteeringModelConfig {
        SteeringModelConfig::new()
            .with_input_height(61)
            .with_input_width(61)
            .with_crop_top(0)
            .with_crop_bottom(0)
            .with_dropout(0.0)
    }

    fn frame(steering: f32) -> FrameSample {
        FrameSample { pixels: vec![100; 61 * 61 * 3], height: 61, width: 61, steering }
    }

    #[test]
    fn test_empty_loader_gives_nan() {
        let device = Default::default();
        let model: SteeringModel<TestBackend> = tiny_config().init(&device).unwrap();
        let loader = DataLoaderBuilder::new(FrameBatcher::<TestBackend>::new(device))
            .batch_size(4)
            .build(DrivingDataset::new(Vec::new()));

        let (mse, seen) = mean_squared_error(&model, loader.as_ref());
        assert_eq!(seen, 0);
        assert!(mse.is_nan());
    }

    #[test]
    fn test_mse_is_weighted_by_samples() {
        let device = Default::default();
        let model: SteeringModel<TestBackend> = tiny_config().init(&device).unwrap();

        // Identical frames → identical predictions p. With labels a and b,
        // the batch-size-1 and batch-size-3 runs must agree.
        let samples = vec![frame(0.5), frame(0.5), frame(-0.5)];

        let small = DataLoaderBuilder::new(FrameBatcher::<TestBackend>::new(device.clone()))
            .batch_size(1)
            .build(DrivingDataset::new(samples.clone()));
        let whole = DataLoaderBuilder::new(FrameBatcher::<TestBackend>::new(device))
            .batch_size(3)
            .build(DrivingDataset::new(samples));

        let (a, n_a) = mean_squared_error(&model, small.as_ref());
        let (b, n_b) = mean_squared_error(&model, whole.as_ref());
        assert_eq!(n_a, 3);
        assert_eq!(n_b, 3);
        assert!((a - b).abs() < 1e-5);
    }

    #[test]
    fn test_scaled_report() {
        let report = EvaluationReport { samples: 10, mse: 0.0123 };
        assert!((report.scaled() - 1.23).abs() < 1e-9);
    }
}
