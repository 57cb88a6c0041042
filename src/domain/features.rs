// ============================================================
// Layer 3 — Image Feature Domain Type
// ============================================================
// Image features are produced ahead of time by a separate
// CNN feature extractor (VGG16 fc2 output). The captioner
// only ever sees the resulting fixed-length vectors.

use std::collections::HashMap;

/// Length of every image feature vector.
pub const FEATURE_SIZE: usize = 4096;

/// Image id → feature vector of length `FEATURE_SIZE`.
pub type FeatureMap = HashMap<String, Vec<f32>>;
