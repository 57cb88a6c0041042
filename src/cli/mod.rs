// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
// Results are printed here; use cases only return them.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CaptionArgs, Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "image-captioner",
    version = "0.1.0",
    about = "Train a CNN+LSTM merge captioning model, caption images, and score captions with BLEU."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Caption(args)  => run_caption(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on captions in: {}", args.captions_file);
    let checkpoint_dir = args.checkpoint_dir.clone();

    TrainUseCase::new(args.into()).execute()?;

    println!("Training complete. Checkpoints saved to '{checkpoint_dir}'.");
    Ok(())
}

fn run_caption(args: CaptionArgs) -> Result<()> {
    use crate::application::caption_use_case::CaptionUseCase;

    let use_case = CaptionUseCase::new(&args.checkpoint_dir)?;
    let caption  = use_case.caption(&args.image_id, &args.features_file, args.raw)?;
    println!("{caption}");
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::caption_use_case::EvaluateUseCase;

    // evaluate_model prints the BLEU report itself
    let use_case = EvaluateUseCase::new(&args.checkpoint_dir)?;
    use_case.evaluate(&args.captions_file, &args.features_file, args.test_images.as_deref())?;
    Ok(())
}
