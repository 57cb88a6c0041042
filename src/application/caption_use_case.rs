// ============================================================
// Layer 2 — Caption / Evaluate Use Cases
// ============================================================
// Both workflows start from a trained checkpoint directory:
//   tokenizer.json + train_config.json + latest weights
//
//   CaptionUseCase  → one image id → one generated caption
//   EvaluateUseCase → every (test) image → BLEU-1..4 report

use anyhow::{Context, Result};

use crate::application::train_use_case::load_clean_captions;
use crate::data::loader::{load_features, load_image_list};
use crate::domain::caption::strip_markers;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{CaptionTokenizer, TokenizerStore},
};
use crate::ml::decoding::generate_caption;
use crate::ml::evaluator::{evaluate_model, BleuReport};
use crate::ml::inferencer::{InferBackend, Inferencer};

/// Tokenizer, model and decoding length restored from a checkpoint.
struct TrainedCaptioner {
    tokenizer:  CaptionTokenizer,
    inferencer: Inferencer,
    max_length: usize,
}

impl TrainedCaptioner {
    fn load(checkpoint_dir: &str) -> Result<Self> {
        let tokenizer  = TokenizerStore::new(checkpoint_dir).load()?;
        let ckpt       = CheckpointManager::new(checkpoint_dir)?;
        let device     = burn::backend::wgpu::WgpuDevice::default();
        let inferencer = Inferencer::<InferBackend>::from_checkpoint(&ckpt, &device)?;
        let max_length = inferencer.max_len();
        Ok(Self { tokenizer, inferencer, max_length })
    }
}

// ─── CaptionUseCase ───────────────────────────────────────────────────────────
pub struct CaptionUseCase {
    captioner: TrainedCaptioner,
}

impl CaptionUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        Ok(Self { captioner: TrainedCaptioner::load(checkpoint_dir)? })
    }

    /// Generate a caption for `image_id`. With `raw`, the
    /// startseq/endseq markers are kept.
    pub fn caption(&self, image_id: &str, features_file: &str, raw: bool) -> Result<String> {
        let features = load_features(features_file)?;
        let image = features
            .get(image_id)
            .with_context(|| format!("No features for image '{image_id}' in '{features_file}'"))?;

        let c = &self.captioner;
        let caption = generate_caption(&c.inferencer, &c.tokenizer, image, c.max_length)?;
        tracing::debug!("Raw caption: {}", caption);

        Ok(if raw { caption } else { strip_markers(&caption) })
    }
}

// ─── EvaluateUseCase ──────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    captioner: TrainedCaptioner,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        Ok(Self { captioner: TrainedCaptioner::load(checkpoint_dir)? })
    }

    /// Score generated captions against the cleaned references of
    /// every image in `test_images` (or every image in the file).
    pub fn evaluate(
        &self,
        captions_file: &str,
        features_file: &str,
        test_images:   Option<&str>,
    ) -> Result<BleuReport> {
        let mut captions = load_clean_captions(captions_file)?;
        if let Some(list) = test_images {
            captions = captions.restrict_to(&load_image_list(list)?);
        }
        let features = load_features(features_file)?;
        tracing::info!("Evaluating on {} images", captions.len());

        let c = &self.captioner;
        evaluate_model(&c.inferencer, &features, &captions, &c.tokenizer, c.max_length)
    }
}
