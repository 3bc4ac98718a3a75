// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands and their flags:
//
//   prepare  — load + split the recording, print set sizes
//   train    — train the network and save it
//   evaluate — score a saved network on the held-out test set
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;
use crate::ml::backend::BackendKind;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the driving log and images, split them, and report set sizes
    Prepare(DataArgs),

    /// Train the steering network on a recorded driving log
    Train(TrainArgs),

    /// Evaluate a trained model on the held-out test set
    Evaluate(EvaluateArgs),
}

/// Where the recording lives and how it is labelled and split.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Directory containing driving_log.csv and the IMG/ folder
    #[arg(long, default_value = "Training Data")]
    pub data_dir: String,

    /// Name of the driving log inside --data-dir
    #[arg(long, default_value = "driving_log.csv")]
    pub log_file: String,

    /// Steering offset added to left-camera and subtracted from right-camera labels
    #[arg(long, default_value_t = 0.2, allow_negative_numbers = true)]
    pub steer_correction: f32,

    /// Fraction of all frames held out as the test set
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Fraction of the training frames used for validation
    #[arg(long, default_value_t = 0.2)]
    pub validation_fraction: f64,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Expected camera frame height in pixels
    #[arg(long, default_value_t = 160)]
    pub image_height: usize,

    /// Expected camera frame width in pixels
    #[arg(long, default_value_t = 320)]
    pub image_width: usize,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory to save the model, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Maximum number of passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Number of frames per gradient step
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 2)]
    pub patience: usize,

    /// Dropout probability between the dense layers
    #[arg(long, default_value_t = 0.25)]
    pub dropout: f64,

    /// Rows cropped from the top of every frame
    #[arg(long, default_value_t = 70)]
    pub crop_top: usize,

    /// Rows cropped from the bottom of every frame
    #[arg(long, default_value_t = 25)]
    pub crop_bottom: usize,

    /// Burn backend: wgpu or ndarray
    #[arg(long, default_value = "wgpu")]
    pub backend: BackendKind,

    /// Evaluate on the test set as soon as training finishes
    #[arg(long)]
    pub evaluate: bool,
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where `train` saved the model
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Override the data directory stored with the model
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Override the backend stored with the model
    #[arg(long)]
    pub backend: Option<BackendKind>,
}

/// Convert CLI DataArgs into an application-layer TrainConfig
/// with default training settings.
impl From<DataArgs> for TrainConfig {
    fn from(a: DataArgs) -> Self {
        TrainConfig {
            data_dir:            a.data_dir,
            log_file:            a.log_file,
            steering_correction: a.steer_correction,
            test_fraction:       a.test_fraction,
            validation_fraction: a.validation_fraction,
            seed:                a.seed,
            image_height:        a.image_height,
            image_width:         a.image_width,
            ..TrainConfig::default()
        }
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<&TrainArgs> for TrainConfig {
    fn from(a: &TrainArgs) -> Self {
        TrainConfig {
            checkpoint_dir: a.checkpoint_dir.clone(),
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            learning_rate:  a.lr,
            patience:       a.patience,
            dropout:        a.dropout,
            crop_top:       a.crop_top,
            crop_bottom:    a.crop_bottom,
            backend:        a.backend,
            ..TrainConfig::from(a.data.clone())
        }
    }
}
