// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load raw captions           (Layer 4 - data)
//   Step 2: Clean + wrap captions       (Layer 4 - data)
//   Step 3: Split train/validation ids  (Layer 4 - data)
//   Step 4: Build vocabulary            (Layer 6 - infra)
//   Step 5: Load image features         (Layer 4 - data)
//   Step 6: Create next-word sequences  (Layer 4 - data)
//   Step 7: Save resolved config        (Layer 6 - infra)
//   Step 8: Run training loop           (Layer 5 - ml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::data::{
    dataset::CaptionDataset,
    loader::{load_features, load_image_list, TokenFileLoader},
    preprocessor::Preprocessor,
    sequences::create_sequences,
    splitter::{split_train_val, SPLIT_SEED},
};
use crate::domain::caption::{wrap_caption, CaptionSet};
use crate::domain::traits::{CaptionSource, WordIndex};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// Hyperparameters and inputs for a training run. vocab_size and
// max_length are filled in from the data before the config is
// saved, so inference can rebuild the same model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub captions_file:  String,
    pub features_file:  String,
    pub train_images:   Option<String>,
    pub val_images:     Option<String>,
    pub checkpoint_dir: String,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub dropout:        f64,
    pub emb_size:       usize,
    pub seed:           u64,
    pub vocab_size:     usize,
    pub max_length:     usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            captions_file:  "data/Flickr8k.token.txt".to_string(),
            features_file:  "data/features.json".to_string(),
            train_images:   None,
            val_images:     None,
            checkpoint_dir: "checkpoints".to_string(),
            batch_size:     64,
            epochs:         20,
            lr:             1e-3,
            dropout:        0.5,
            emb_size:       256,
            seed:           SPLIT_SEED,
            vocab_size:     0,
            max_length:     0,
        }
    }
}

/// Load raw captions and clean + wrap every one of them.
pub fn load_clean_captions(captions_file: &str) -> Result<CaptionSet> {
    let raw  = TokenFileLoader::new(captions_file).load_all()?;
    let prep = Preprocessor::new();
    Ok(raw.map_captions(|c| wrap_caption(&prep.clean(c))))
}

/// Decide which images train and which validate.
///
///   - both lists given   → use them
///   - one list given     → the other side is every remaining image
///   - no lists           → seeded 80/20 split of all images
fn resolve_split(
    all_ids:      Vec<String>,
    train_images: Option<&str>,
    val_images:   Option<&str>,
    seed:         u64,
) -> Result<(Vec<String>, Vec<String>)> {
    let complement = |taken: &[String]| -> Vec<String> {
        let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
        all_ids.iter().filter(|id| !taken.contains(id.as_str())).cloned().collect()
    };

    Ok(match (train_images, val_images) {
        (Some(t), Some(v)) => (load_image_list(t)?, load_image_list(v)?),
        (Some(t), None) => {
            let train = load_image_list(t)?;
            let val   = complement(&train);
            (train, val)
        }
        (None, Some(v)) => {
            let val   = load_image_list(v)?;
            let train = complement(&val);
            (train, val)
        }
        (None, None) => split_train_val(all_ids.clone(), 0.8, seed),
    })
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let mut cfg = self.config.clone();

        // ── Steps 1-2: captions ───────────────────────────────────────────────
        let captions = load_clean_captions(&cfg.captions_file)?;
        if captions.is_empty() {
            bail!("No captions found in '{}'", cfg.captions_file);
        }

        // ── Step 3: split ─────────────────────────────────────────────────────
        let (train_ids, val_ids) = resolve_split(
            captions.image_ids(),
            cfg.train_images.as_deref(),
            cfg.val_images.as_deref(),
            cfg.seed,
        )?;
        let train_set = captions.restrict_to(&train_ids);
        let val_set   = captions.restrict_to(&val_ids);
        if train_set.is_empty() {
            bail!("The training split contains no captioned images");
        }
        tracing::info!(
            "Split: {} train images, {} validation images",
            train_set.len(),
            val_set.len()
        );

        // ── Step 4: vocabulary from training captions only ────────────────────
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.build_and_save(train_set.all_captions())?;
        cfg.vocab_size = tokenizer.vocab_size();
        cfg.max_length = train_set.max_length();
        tracing::info!("Vocabulary size: {}, max caption length: {}", cfg.vocab_size, cfg.max_length);

        // ── Step 5: features ──────────────────────────────────────────────────
        let features = Arc::new(load_features(&cfg.features_file)?);

        // ── Step 6: sequences ─────────────────────────────────────────────────
        let train_items = create_sequences(&tokenizer, &train_set, cfg.max_length)?;
        let val_items   = create_sequences(&tokenizer, &val_set, cfg.max_length)?;
        let train_dataset = CaptionDataset::new(features.clone(), train_items);
        let val_dataset   = CaptionDataset::new(features, val_items);
        tracing::info!(
            "Built {} training and {} validation sequences",
            train_dataset.sample_count(),
            val_dataset.sample_count()
        );
        if train_dataset.sample_count() == 0 {
            bail!("No training sequences: check that the feature file covers the training images");
        }

        // ── Step 7: save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(&cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 8: train ─────────────────────────────────────────────────────
        run_training(&cfg, train_dataset, val_dataset, &ckpt_manager, &metrics)
    }
}
