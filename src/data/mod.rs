// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the files on disk and tensor batches:
//
//   Flickr8k.token.txt        features.json
//       │                         │
//       ▼                         │
//   TokenFileLoader               │   → raw CaptionSet
//       │                         │
//       ▼                         │
//   Preprocessor                  │   → clean + wrap captions
//       │                         │
//       ▼                         │
//   splitter                      │   → train / validation ids
//       │                         │
//       ▼                         ▼
//   sequences  ────────────►  CaptionDataset
//                                 │
//                                 ▼
//                             CaptionBatcher → DataLoader
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads caption files, image lists and feature JSON
pub mod loader;

/// Cleans raw captions
pub mod preprocessor;

/// Padding and prefix → next-word expansion
pub mod sequences;

/// Implements Burn's Dataset trait for next-word samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded train/validation split of image ids
pub mod splitter;
