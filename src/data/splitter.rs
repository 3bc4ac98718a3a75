// ============================================================
// Layer 4 — Train/Test and Validation Splitters
// ============================================================
// Two different splits happen before training:
//
//   1. Train/test split (shuffled, seeded)
//        n_test  = ceil(test_fraction * n)
//        n_train = n - n_test
//      The seed is fixed (1 by default) so `train` and `evaluate`
//      runs carve out exactly the same test set.
//
//   2. Validation split (NOT shuffled)
//        split_at = floor(n * (1 - validation_fraction))
//        training   = samples[..split_at]
//        validation = samples[split_at..]
//      The tail of the (already shuffled) training set becomes the
//      validation set used for early stopping.
//
// Reference: rand crate documentation (SliceRandom, StdRng)

use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

/// Fraction of all frames held out for final evaluation
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
/// Fraction of the training frames used for validation
pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.2;
/// Seed for the train/test shuffle
pub const DEFAULT_SPLIT_SEED: u64 = 1;

/// Error unless `value` lies in [0, 1). NaN is rejected too.
pub fn ensure_fraction(name: &str, value: f64) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        bail!("{} must be in [0, 1), got {}", name, value);
    }
    Ok(())
}

/// Shuffle `samples` with a seeded RNG and split into (train, test).
///
/// Fails if the split would leave either side empty, since there
/// would be nothing to train on or nothing to evaluate.
pub fn split_train_test<T>(
    mut samples:   Vec<T>,
    test_fraction: f64,
    seed:          u64,
) -> Result<(Vec<T>, Vec<T>)> {
    ensure_fraction("test fraction", test_fraction)?;

    let total  = samples.len();
    let n_test = ((total as f64) * test_fraction).ceil() as usize;

    if total > 0 && n_test >= total {
        bail!(
            "With {} samples and test fraction {}, the training set would be empty",
            total,
            test_fraction
        );
    }
    if total > 0 && n_test == 0 {
        bail!(
            "With {} samples and test fraction {}, the test set would be empty",
            total,
            test_fraction
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let test = samples.split_off(total - n_test);

    tracing::debug!(
        "Train/test split: {} training, {} testing (seed {})",
        samples.len(),
        test.len(),
        seed
    );

    Ok((samples, test))
}

/// Split off the last `validation_fraction` of `samples` without shuffling.
pub fn split_validation_tail<T>(
    mut samples:         Vec<T>,
    validation_fraction: f64,
) -> Result<(Vec<T>, Vec<T>)> {
    ensure_fraction("validation fraction", validation_fraction)?;
    let split_at = ((samples.len() as f64) * (1.0 - validation_fraction)).floor() as usize;
    let split_at = split_at.min(samples.len());

    let val = samples.split_off(split_at);
    Ok((samples, val))
}

/// Sizes of the three sets a run works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub training:   usize,
    pub validation: usize,
    pub testing:    usize,
}

impl DatasetSummary {
    /// Summary for a train pool that will later be split for validation
    pub fn new(train_pool: usize, testing: usize, validation_fraction: f64) -> Result<Self> {
        ensure_fraction("validation fraction", validation_fraction)?;
        let training = (((train_pool as f64) * (1.0 - validation_fraction)).floor() as usize)
            .min(train_pool);
        Ok(Self {
            training,
            validation: train_pool - training,
            testing,
        })
    }

    pub fn total(&self) -> usize {
        self.training + self.validation + self.testing
    }
}

impl std::fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of training examples:   {}", self.training)?;
        writeln!(f, "Number of validation examples: {}", self.validation)?;
        write!(f, "Number of testing examples:    {}", self.testing)
    }
}
