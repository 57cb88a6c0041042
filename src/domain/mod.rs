// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing what the captioner
// works with: captions, image features, and the two seams
// (word index and next-word predictor) that decoding and
// evaluation are written against.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Caption sets and the startseq/endseq boundary tokens
pub mod caption;

// Precomputed image feature vectors
pub mod features;

// Core abstractions (traits) that other layers implement
pub mod traits;
