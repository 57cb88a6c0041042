// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here, next to the decoding and
// scoring logic that drives it.
//
//   model.rs      — merge captioner: image branch + LSTM branch,
//                   concatenated into a softmax decoder
//   trainer.rs    — Adam training loop with validation and
//                   per-epoch checkpoints
//   inferencer.rs — trained model on a device, answering
//                   single next-word queries
//   decoding.rs   — greedy caption generation
//   bleu.rs       — corpus BLEU
//   evaluator.rs  — caption a labelled set and report BLEU-1..4
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vinyals et al. (2015) Show and Tell
//            Tanti et al. (2017) Where to put the image in an image caption generator

/// Merge-architecture captioning model
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Checkpoint-backed next-word predictor
pub mod inferencer;

/// Greedy autoregressive decoding
pub mod decoding;

/// Corpus BLEU scoring
pub mod bleu;

/// BLEU evaluation over a caption set
pub mod evaluator;
