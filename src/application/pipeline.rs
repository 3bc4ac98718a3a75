// ============================================================
// Layer 2 — Data Preparation Pipeline
// ============================================================
// The part of every run that happens before any model exists:
//
//   Step 1: Read driving_log.csv               (Layer 4 - data)
//   Step 2: Expand to center/left/right frames (Layer 3 - domain)
//   Step 3: Decode all camera images           (Layer 4 - data)
//   Step 4: Seeded train/test split            (Layer 4 - data)
//
// `train` and `evaluate` both start here with the same config,
// so the test set the model is evaluated on is exactly the one
// it never saw during training.

use anyhow::{bail, Result};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    dataset::FrameSample,
    image_loader::ImageLoader,
    log_reader::DrivingLogReader,
    splitter::{ensure_fraction, split_train_test, DatasetSummary},
};
use crate::domain::{driving_record::expand_records, traits::RecordSource};

/// Frames ready for training, already split off from the test set
#[derive(Debug)]
pub struct PreparedData {
    /// Train pool; the validation tail is carved out of this later
    pub train:   Vec<FrameSample>,
    pub test:    Vec<FrameSample>,
    pub summary: DatasetSummary,
}

pub fn prepare_data(cfg: &TrainConfig) -> Result<PreparedData> {
    // Checked up front so a bad flag fails before any image is decoded
    ensure_fraction("test fraction", cfg.test_fraction)?;
    ensure_fraction("validation fraction", cfg.validation_fraction)?;

    // ── Step 1: Read the driving log ──────────────────────────────────────────
    let reader  = DrivingLogReader::new(&cfg.data_dir).with_log_file(&cfg.log_file);
    let records = reader.load_all()?;
    if records.is_empty() {
        bail!("Driving log '{}' contains no records", reader.log_path().display());
    }

    // ── Step 2: Three labelled frames per record ──────────────────────────────
    let frames = expand_records(&records, cfg.steering_correction);
    tracing::info!(
        "Expanded {} records into {} frames (steering correction {})",
        records.len(),
        frames.len(),
        cfg.steering_correction
    );

    // ── Step 3: Decode images ─────────────────────────────────────────────────
    let loader  = ImageLoader::new(cfg.image_height, cfg.image_width);
    let samples = loader.load_frames(&frames, |p| reader.resolve(p))?;

    // ── Step 4: Train / test split ────────────────────────────────────────────
    let (train, test) = split_train_test(samples, cfg.test_fraction, cfg.seed)?;
    let summary       = DatasetSummary::new(train.len(), test.len(), cfg.validation_fraction)?;

    tracing::info!(
        "Split {} frames: {} training, {} validation, {} testing",
        summary.total(),
        summary.training,
        summary.validation,
        summary.testing
    );

    Ok(PreparedData { train, test, summary })
}

// ─── PrepareUseCase ───────────────────────────────────────────────────────────
// Load and split the data without building a model. Useful to
// check a recording before committing to a long training run.
pub struct PrepareUseCase {
    config: TrainConfig,
}

impl PrepareUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<DatasetSummary> {
        Ok(prepare_data(&self.config)?.summary)
    }
}

// ─── Test fixtures ────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod fixtures {
    use image::{Rgb, RgbImage};
    use std::{fmt::Write as _, fs, path::Path};

    /// Smallest frame the conv stack accepts without cropping
    pub const SIDE: u32 = 61;

    /// Write `records` rows of center/left/right PNGs plus a driving log.
    pub fn write_recording(dir: &Path, records: usize) {
        fs::create_dir_all(dir.join("IMG")).unwrap();
        let mut log = String::new();

        for i in 0..records {
            for cam in ["center", "left", "right"] {
                let shade = ((i * 37 + cam.len() * 11) % 256) as u8;
                RgbImage::from_pixel(SIDE, SIDE, Rgb([shade, 128, 255 - shade]))
                    .save(dir.join(format!("IMG/{cam}_{i}.png")))
                    .unwrap();
            }
            let angle = (i as f32 / records as f32) - 0.5;
            writeln!(
                log,
                "IMG/center_{i}.png, IMG/left_{i}.png, IMG/right_{i}.png, {angle}, 0.5, 0, 30"
            )
            .unwrap();
        }

        fs::write(dir.join("driving_log.csv"), log).unwrap();
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_for(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            data_dir:     dir.to_string_lossy().into_owned(),
            image_height: fixtures::SIDE as usize,
            image_width:  fixtures::SIDE as usize,
            crop_top:     0,
            crop_bottom:  0,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_prepare_splits_three_frames_per_record() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_recording(tmp.path(), 5);

        let data = prepare_data(&config_for(tmp.path())).unwrap();
        // 5 records → 15 frames → 3 test, 12 train → 9 train / 3 validation
        assert_eq!(data.test.len(), 3);
        assert_eq!(data.train.len(), 12);
        assert_eq!(data.summary, DatasetSummary { training: 9, validation: 3, testing: 3 });
    }

    #[test]
    fn test_same_seed_gives_same_test_set() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_recording(tmp.path(), 4);
        let cfg = config_for(tmp.path());

        let a = prepare_data(&cfg).unwrap();
        let b = prepare_data(&cfg).unwrap();
        let labels = |v: &[FrameSample]| v.iter().map(|s| s.steering).collect::<Vec<_>>();
        assert_eq!(labels(&a.test), labels(&b.test));
    }

    #[test]
    fn test_empty_log_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("driving_log.csv"), "").unwrap();
        assert!(prepare_data(&config_for(tmp.path())).is_err());
    }

    #[test]
    fn test_bad_validation_fraction_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_recording(tmp.path(), 3);

        for bad in [-0.5, 1.7, f64::NAN] {
            let cfg = TrainConfig { validation_fraction: bad, ..config_for(tmp.path()) };
            let err = prepare_data(&cfg).unwrap_err();
            assert!(err.to_string().contains("validation fraction"));
        }
    }

    #[test]
    fn test_zero_test_fraction_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_recording(tmp.path(), 3);

        let cfg = TrainConfig { test_fraction: 0.0, ..config_for(tmp.path()) };
        assert!(prepare_data(&cfg).is_err());
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_recording(tmp.path(), 2);
        fs::remove_file(tmp.path().join("IMG/left_1.png")).unwrap();

        let err = prepare_data(&config_for(tmp.path())).unwrap_err();
        assert!(format!("{err:#}").contains("left_1.png"));
    }

    #[test]
    fn test_prepare_use_case_returns_summary() {
        let tmp = tempfile::tempdir().unwrap();
        fixtures::write_recording(tmp.path(), 5);

        let summary = PrepareUseCase::new(config_for(tmp.path())).execute().unwrap();
        assert_eq!(summary.total(), 15);
    }
}
