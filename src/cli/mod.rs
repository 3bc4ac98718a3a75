// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and prints results. All work is
// delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `prepare`  — load and split the recording only
//   2. `train`    — train and save the model
//   3. `evaluate` — load the model and score the test set
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DataArgs, EvaluateArgs, TrainArgs};

use crate::ml::evaluator::EvaluationReport;

#[derive(Parser, Debug)]
#[command(
    name = "behavioral-cloning",
    version,
    about = "Train a CNN to predict steering angles from simulator camera frames."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prepare(args)  => run_prepare(args),
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_prepare(args: DataArgs) -> Result<()> {
    use crate::application::pipeline::PrepareUseCase;

    tracing::info!("Preparing data from: {}", args.data_dir);
    let summary = PrepareUseCase::new(args.into()).execute()?;
    println!("{summary}");
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on recording in: {}", args.data.data_dir);

    let outcome = TrainUseCase::new((&args).into())
        .with_evaluation(args.evaluate)
        .execute()?;

    println!("{}", outcome.summary);
    println!(
        "Trained {} epochs{} (best val_loss {}). Model saved to '{}'.",
        outcome.report.epochs_run,
        if outcome.report.stopped_early { ", stopped early" } else { "" },
        outcome
            .report
            .best_val_loss
            .map(|v| format!("{v:.5}"))
            .unwrap_or_else(|| "n/a".to_string()),
        args.checkpoint_dir,
    );

    if let Some(eval) = outcome.evaluation {
        print_evaluation(&eval);
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.checkpoint_dir)
        .with_data_dir(args.data_dir)
        .with_backend(args.backend)
        .execute()?;

    print_evaluation(&report);
    Ok(())
}

fn print_evaluation(report: &EvaluationReport) {
    println!(
        "Test MSE over {} frames: {:.6} (x100 = {:.4})",
        report.samples,
        report.mse,
        report.scaled()
    );
}
