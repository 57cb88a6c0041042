// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that persists state between runs:
//
//   checkpoint.rs      — model weights (CompactRecorder) plus the
//                        resolved TrainConfig so inference can
//                        rebuild the same architecture
//
//   tokenizer_store.rs — the caption vocabulary: builds the word
//                        index from training captions, stores it as
//                        tokenizer.json, loads it back
//
//   metrics.rs         — per-epoch loss/accuracy rows in metrics.csv
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
