// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `caption` and `evaluate`.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;
use crate::data::splitter::SPLIT_SEED;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the captioning model on captions + precomputed image features
    Train(TrainArgs),

    /// Generate a caption for one image using a trained checkpoint
    Caption(CaptionArgs),

    /// Report corpus BLEU-1..4 of generated captions against references
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Flickr8k-style token file: `<image>.jpg#<n>\t<caption>` per line
    #[arg(long, default_value = "data/Flickr8k.token.txt")]
    pub captions_file: String,

    /// JSON object mapping image id → 4096 feature values
    #[arg(long, default_value = "data/features.json")]
    pub features_file: String,

    /// Image list for training (default: 80% of captioned images)
    #[arg(long)]
    pub train_images: Option<String>,

    /// Image list for validation (default: images not used for training)
    #[arg(long)]
    pub val_images: Option<String>,

    /// Directory to save checkpoints, vocabulary and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Dropout probability on both input branches
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Width of the image projection and the word embedding
    #[arg(long, default_value_t = 256)]
    pub emb_size: usize,

    /// Seed for the train/validation split and batch shuffling
    #[arg(long, default_value_t = SPLIT_SEED)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            captions_file:  a.captions_file,
            features_file:  a.features_file,
            train_images:   a.train_images,
            val_images:     a.val_images,
            checkpoint_dir: a.checkpoint_dir,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            dropout:        a.dropout,
            emb_size:       a.emb_size,
            seed:           a.seed,
            ..TrainConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct CaptionArgs {
    /// Image id (file name without extension)
    #[arg(long)]
    pub image_id: String,

    #[arg(long, default_value = "data/features.json")]
    pub features_file: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Keep the startseq/endseq markers in the output
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "data/Flickr8k.token.txt")]
    pub captions_file: String,

    #[arg(long, default_value = "data/features.json")]
    pub features_file: String,

    /// Image list to evaluate on (default: every captioned image)
    #[arg(long)]
    pub test_images: Option<String>,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::cli::Cli;
    use super::*;

    #[test]
    fn test_train_args_into_config() {
        let cli = Cli::try_parse_from([
            "image-captioner", "train", "--epochs", "3", "--train-images", "train.txt",
        ])
        .unwrap();

        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.train_images.as_deref(), Some("train.txt"));
        assert_eq!(cfg.dropout, 0.5);
        assert_eq!(cfg.vocab_size, 0);
    }

    #[test]
    fn test_caption_requires_image_id() {
        assert!(Cli::try_parse_from(["image-captioner", "caption"]).is_err());
    }
}
