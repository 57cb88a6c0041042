// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// File layout:
//   checkpoints/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz
//     ...
//     latest_epoch.json      ← number of the latest epoch
//     train_config.json      ← resolved TrainConfig (vocab_size,
//                              max_length, emb_size, ...)
//
// The config is needed at inference time to rebuild the exact
// architecture before the weights are loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::CaptionModel;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Write {dir}/model_epoch_{epoch}.mpk.gz and move the
    /// latest-epoch pointer to it.
    pub fn save_model<B: Backend>(&self, model: &CaptionModel<B>, epoch: usize) -> Result<()> {
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the latest saved weights into `model`, which must have
    /// the same architecture as the one that was saved.
    pub fn load_model<B: Backend>(
        &self,
        model:  CaptionModel<B>,
        device: &B::Device,
    ) -> Result<CaptionModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| {
                format!("Cannot write config to '{}'", path.display())
            })?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))
    }

    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. \
                 Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::ml::model::CaptionModelConfig;

    fn temp_manager() -> (tempfile::TempDir, CheckpointManager) {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_string_lossy()).unwrap();
        (dir, ckpt)
    }

    #[test]
    fn test_config_round_trip() {
        let (_dir, ckpt) = temp_manager();

        let cfg = TrainConfig { vocab_size: 42, max_length: 9, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.vocab_size, 42);
        assert_eq!(loaded.max_length, 9);
    }

    #[test]
    fn test_weights_round_trip() {
        let (_dir, ckpt) = temp_manager();
        let device = Default::default();

        let config = CaptionModelConfig::new(5, 3)
            .with_emb_size(4)
            .with_lstm_units(4)
            .with_decoder_units(4)
            .with_feature_size(4);
        let saved = config.init::<NdArray>(&device);
        ckpt.save_model(&saved, 2).unwrap();

        let loaded = ckpt.load_model(config.init::<NdArray>(&device), &device).unwrap();

        let a: Vec<f32> = saved.output.weight.val().into_data().to_vec().unwrap();
        let b: Vec<f32> = loaded.output.weight.val().into_data().to_vec().unwrap();
        // CompactRecorder stores half precision
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_load_without_training_fails() {
        let (_dir, ckpt) = temp_manager();
        assert!(ckpt.load_config().is_err());
    }
}
