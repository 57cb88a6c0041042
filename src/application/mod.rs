// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// training, captioning a single image, or BLEU evaluation.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// Captioning and evaluation from a trained checkpoint
pub mod caption_use_case;
