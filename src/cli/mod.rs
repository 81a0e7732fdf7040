// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `index` — scan the species directories into images.csv
//   2. `pairs` — sample before/after pairs into pairs.csv
//   3. `infer` — run fold or single checkpoints over the test
//                set and write the submission CSV
//   4. `eval`  — score one checkpoint on a labelled pair table

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs, IndexArgs, InferArgs, PairsArgs};

#[derive(Parser, Debug)]
#[command(
    name = "growth-delta",
    version = "0.1.0",
    about = "Sample plant image pairs and predict the days elapsed between them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Index(args) => run_index(args),
            Commands::Pairs(args) => run_pairs(args),
            Commands::Infer(args) => run_infer(args),
            Commands::Eval(args)  => run_eval(args),
        }
    }
}

fn run_index(args: IndexArgs) -> Result<()> {
    use crate::application::pairs_use_case::IndexUseCase;

    tracing::info!("Indexing images under: {}", args.root);
    let output = args.output.clone();
    let count  = IndexUseCase::new(args.into()).execute()?;

    println!("Indexed {count} images into {output}");
    Ok(())
}

fn run_pairs(args: PairsArgs) -> Result<()> {
    use crate::application::pairs_use_case::PairsUseCase;

    let output = args.output.clone();
    let count  = PairsUseCase::new(args.into()).execute()?;

    println!("Sampled {count} pairs into {output}");
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    use crate::application::infer_use_case::InferUseCase;

    let output = args.submission_file.clone();

    // Validation happens before any data or weights are read
    let use_case = InferUseCase::new(args.into())?;
    let labels   = use_case.execute()?;

    println!("Wrote {} predictions to {output}", labels.len());
    Ok(())
}

fn run_eval(args: EvalArgs) -> Result<()> {
    use crate::application::eval_use_case::EvalUseCase;

    let report = EvalUseCase::new(args.into())?.execute()?;
    println!(
        "MAE {:.4} days, RMSE {:.4} days over {} pairs",
        report.mae, report.rmse, report.pairs
    );
    Ok(())
}
