// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Decoding and evaluation are written against these traits
// instead of concrete types, so the tokenizer and model are
// always explicit parameters:
//   - CaptionTokenizer implements WordIndex
//   - Inferencer (Burn model + device) implements NextWordPredictor
//   - tests plug in scripted predictors
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::caption::CaptionSet;

// ─── CaptionSource ────────────────────────────────────────────────────────────
/// Any component that can load reference captions.
///
/// Implementations:
///   - TokenFileLoader → Flickr8k-style `<image>#<n>\t<caption>` files
pub trait CaptionSource {
    fn load_all(&self) -> Result<CaptionSet>;
}

// ─── WordIndex ────────────────────────────────────────────────────────────────
/// A word ↔ integer vocabulary.
///
/// Index 0 is reserved for padding and never maps to a word.
pub trait WordIndex {
    /// Encode a text into word indices. Words outside the
    /// vocabulary are dropped.
    fn texts_to_sequence(&self, text: &str) -> Result<Vec<u32>>;

    /// The word for `index`, if any.
    fn index_word(&self, index: u32) -> Option<&str>;

    /// Number of output classes the model needs (largest index + 1).
    fn vocab_size(&self) -> usize;
}

// ─── NextWordPredictor ────────────────────────────────────────────────────────
/// A trained captioning model seen as a black box.
pub trait NextWordPredictor {
    /// Run one forward pass for a single image and a padded
    /// sequence, returning a probability per vocabulary index.
    fn predict(&self, image: &[f32], sequence: &[u32]) -> Result<Vec<f32>>;
}
