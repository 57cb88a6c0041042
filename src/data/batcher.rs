// ============================================================
// Layer 4 — Caption Batcher
// ============================================================
// Implements Burn's Batcher trait to stack CaptionSamples into
// tensors for one forward pass.
//
//   Input:  Vec of N CaptionSamples
//   Output: features  [N, 4096]   float
//           input_ids [N, max_len] int
//           targets   [N]          int
//
// All prefixes are already padded to max_len, so rows can be
// flattened and reshaped without any dynamic padding here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::CaptionSample;

/// A batch of next-word examples ready for the model.
#[derive(Debug, Clone)]
pub struct CaptionBatch<B: Backend> {
    /// Image features — shape: [batch_size, feature_size]
    pub features: Tensor<B, 2>,

    /// Left-padded word prefixes — shape: [batch_size, max_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Next-word indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct CaptionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> CaptionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<CaptionSample, CaptionBatch<B>> for CaptionBatcher<B> {
    fn batch(&self, items: Vec<CaptionSample>) -> CaptionBatch<B> {
        let batch_size   = items.len();
        let feature_size = items[0].features.len();
        let seq_len      = items[0].input_ids.len();

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        // Burn Int tensors are built from i32
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let targets: Vec<i32> = items.iter().map(|s| s.target as i32).collect();

        let features = Tensor::<B, 1>::from_floats(
            features_flat.as_slice(), &self.device
        ).reshape([batch_size, feature_size]);

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(
            targets.as_slice(), &self.device
        );

        CaptionBatch { features, input_ids, targets }
    }
}
