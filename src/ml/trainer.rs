// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam,
// with mean squared error as the regression loss.
//
// Per epoch:
//   1. shuffled pass over the training frames, Adam step per batch
//   2. validation pass on model.valid() (dropout disabled)
//   3. metrics row appended to metrics.csv
//   4. early-stopping check on validation loss
//
// The weights from the LAST epoch run are what get saved,
// not the best epoch's.
//
// Key Burn insight:
//   - Training uses Autodiff<Inner> for gradients
//   - model.valid() returns the model on the inner backend,
//     so the validation batcher uses B::InnerBackend too
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    backend::Autodiff,
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::FrameBatcher, dataset::DrivingDataset};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::backend::BackendKind;
use crate::ml::early_stopping::{EarlyStopping, StopDecision};
use crate::ml::evaluator::mean_squared_error;
use crate::ml::model::SteeringModel;

type GpuBackend = Autodiff<burn::backend::Wgpu>;
type CpuBackend = Autodiff<burn::backend::NdArray>;

/// How a training run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs_run:       usize,
    pub final_train_loss: f64,
    pub final_val_loss:   f64,
    pub best_val_loss:    Option<f64>,
    pub stopped_early:    bool,
}

/// Train on the backend chosen in `cfg`, then save the final weights
/// and the training report into `ckpt_manager`.
pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: DrivingDataset,
    val_dataset:   DrivingDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<TrainingReport> {
    tracing::info!("Training on the {} backend", cfg.backend);
    match cfg.backend {
        BackendKind::Wgpu    => train_and_save::<GpuBackend>(cfg, train_dataset, val_dataset, ckpt_manager),
        BackendKind::NdArray => train_and_save::<CpuBackend>(cfg, train_dataset, val_dataset, ckpt_manager),
    }
}

fn train_and_save<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: DrivingDataset,
    val_dataset:   DrivingDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<TrainingReport> {
    let device      = B::Device::default();
    let mut metrics = MetricsLogger::create(ckpt_manager.dir())?;

    let (model, report) = train::<B>(cfg, train_dataset, val_dataset, &mut metrics, device)?;

    ckpt_manager.save_model(&model)?;
    ckpt_manager.save_report(&report)?;
    Ok(report)
}

/// The training loop proper, generic over any autodiff backend.
pub fn train<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: DrivingDataset,
    val_dataset:   DrivingDataset,
    metrics:       &mut MetricsLogger,
    device:        B::Device,
) -> Result<(SteeringModel<B>, TrainingReport)> {
    if train_dataset.sample_count() == 0 {
        bail!("No training samples: check the driving log and split fractions");
    }
    if cfg.batch_size == 0 {
        bail!("Batch size must be at least 1");
    }

    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: SteeringModel<B> = cfg.model_config().init(&device)?;
    tracing::info!(
        "Model ready: input {}x{}, crop top={} bottom={}, dropout={}",
        cfg.image_height, cfg.image_width, cfg.crop_top, cfg.crop_bottom, cfg.dropout
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().with_epsilon(1e-7).init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader = DataLoaderBuilder::new(FrameBatcher::<B>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(FrameBatcher::<B::InnerBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_dataset);

    let mut early_stop = EarlyStopping::new(cfg.patience);
    let mut report     = TrainingReport {
        epochs_run:       0,
        final_train_loss: f64::NAN,
        final_val_loss:   f64::NAN,
        best_val_loss:    None,
        stopped_early:    false,
    };

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        let mut train_loss_sum = 0.0f64;
        let mut train_seen     = 0usize;

        for batch in train_loader.iter() {
            let n = batch.steering.dims()[0];
            let (loss, _) = model.forward_loss(batch.images, batch.steering);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>() * n as f64;
            train_seen     += n;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.learning_rate, model, grads);
        }

        let train_loss = if train_seen > 0 { train_loss_sum / train_seen as f64 } else { f64::NAN };

        let (val_loss, _) = mean_squared_error(&model.valid(), val_loader.as_ref());
        let decision      = early_stop.update(val_loss);

        println!(
            "Epoch {:>3}/{} | train_loss={:.5} | val_loss={:.5}",
            epoch, cfg.epochs, train_loss, val_loss,
        );
        metrics.log(&EpochMetrics::new(
            epoch,
            train_loss,
            val_loss,
            decision == StopDecision::Improved,
        ))?;

        report.epochs_run       = epoch;
        report.final_train_loss = train_loss;
        report.final_val_loss   = val_loss;

        if decision == StopDecision::Stop {
            tracing::info!(
                "Early stopping after epoch {}: val_loss has not improved for {} epochs",
                epoch,
                early_stop.epochs_without_improvement()
            );
            report.stopped_early = true;
            break;
        }
    }

    report.best_val_loss = early_stop.best();
    tracing::info!(
        "Training complete after {} epochs, learning curve in '{}'",
        report.epochs_run,
        metrics.csv_path().display()
    );
    Ok((model, report))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::FrameSample;
    use burn::backend::NdArray;

    type TestBackend = Autodiff<NdArray<f32>>;

    fn tiny_config(epochs: usize, patience: usize) -> TrainConfig {
        TrainConfig {
            image_height: 61,
            image_width:  61,
            crop_top:     0,
            crop_bottom:  0,
            epochs,
            patience,
            batch_size:   4,
            backend:      BackendKind::NdArray,
            ..TrainConfig::default()
        }
    }

    fn frames(n: usize) -> Vec<FrameSample> {
        (0..n)
            .map(|i| FrameSample {
                pixels:   vec![(i * 20 % 256) as u8; 61 * 61 * 3],
                height:   61,
                width:    61,
                steering: (i as f32 - n as f32 / 2.0) * 0.05,
            })
            .collect()
    }

    #[test]
    fn test_runs_all_epochs_and_logs_them() {
        let tmp     = tempfile::tempdir().unwrap();
        let mut log = MetricsLogger::create(tmp.path()).unwrap();
        let cfg     = tiny_config(2, 10);

        let (_, report) = train::<TestBackend>(
            &cfg,
            DrivingDataset::new(frames(8)),
            DrivingDataset::new(frames(2)),
            &mut log,
            Default::default(),
        )
        .unwrap();

        assert_eq!(report.epochs_run, 2);
        assert!(!report.stopped_early);
        assert!(report.final_train_loss.is_finite());
        assert!(report.final_val_loss.is_finite());
        assert!(report.best_val_loss.is_some());

        let rows = crate::infra::metrics::read_metrics(log.csv_path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].improved);
    }

    #[test]
    fn test_flat_validation_loss_stops_training_early() {
        let tmp     = tempfile::tempdir().unwrap();
        let mut log = MetricsLogger::create(tmp.path()).unwrap();
        // Zero learning rate: weights never move, so val_loss repeats exactly
        let cfg     = TrainConfig { learning_rate: 0.0, ..tiny_config(20, 1) };

        let (_, report) = train::<TestBackend>(
            &cfg,
            DrivingDataset::new(frames(8)),
            DrivingDataset::new(frames(2)),
            &mut log,
            Default::default(),
        )
        .unwrap();

        assert!(report.stopped_early);
        assert_eq!(report.epochs_run, 2);
        assert_eq!(report.best_val_loss, Some(report.final_val_loss));

        let rows = crate::infra::metrics::read_metrics(log.csv_path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].improved);
        assert!(!rows[1].improved);
    }

    #[test]
    fn test_without_validation_trains_every_epoch() {
        let tmp     = tempfile::tempdir().unwrap();
        let mut log = MetricsLogger::create(tmp.path()).unwrap();
        let cfg     = tiny_config(2, 0);

        let (_, report) = train::<TestBackend>(
            &cfg,
            DrivingDataset::new(frames(4)),
            DrivingDataset::new(Vec::new()),
            &mut log,
            Default::default(),
        )
        .unwrap();

        assert_eq!(report.epochs_run, 2);
        assert!(!report.stopped_early);
        assert_eq!(report.best_val_loss, None);
    }

    #[test]
    fn test_empty_training_set_is_an_error() {
        let tmp     = tempfile::tempdir().unwrap();
        let mut log = MetricsLogger::create(tmp.path()).unwrap();
        let cfg     = tiny_config(1, 2);

        let result = train::<TestBackend>(
            &cfg,
            DrivingDataset::new(Vec::new()),
            DrivingDataset::new(frames(2)),
            &mut log,
            Default::default(),
        );
        assert!(result.is_err());
    }
}
