// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Holds a trained CaptionModel on a device and answers single
// next-word queries: one image, one padded prefix → one
// probability per vocabulary index.
use anyhow::Result;
use burn::prelude::*;

use crate::domain::traits::NextWordPredictor;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{CaptionModel, CaptionModelConfig};

pub type InferBackend = burn::backend::Wgpu;

pub struct Inferencer<B: Backend = InferBackend> {
    model:  CaptionModel<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    /// Rebuild the architecture from the saved config and load the
    /// latest checkpoint into it.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: &B::Device) -> Result<Self> {
        let cfg = ckpt_manager.load_config()?;

        let model: CaptionModel<B> = CaptionModelConfig::from(&cfg)
            .with_dropout(0.0)
            .init(device);
        let model = ckpt_manager.load_model(model, device)?;
        tracing::info!(
            "Model loaded from checkpoint (vocab_size={}, max_length={})",
            cfg.vocab_size,
            cfg.max_length
        );
        Ok(Self { model, device: device.clone() })
    }

    #[cfg(test)]
    pub fn new(model: CaptionModel<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    pub fn max_len(&self) -> usize {
        self.model.max_len
    }
}

impl<B: Backend> NextWordPredictor for Inferencer<B> {
    fn predict(&self, image: &[f32], sequence: &[u32]) -> Result<Vec<f32>> {
        let features = Tensor::<B, 1>::from_floats(image, &self.device)
            .reshape([1, image.len()]);

        let ids: Vec<i32> = sequence.iter().map(|&x| x as i32).collect();
        let input_ids = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device)
            .reshape([1, sequence.len()]);

        self.model
            .forward(features, input_ids)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read model output: {e:?}"))
    }
}
