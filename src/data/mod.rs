// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a folder of dated photos and GPU-ready
// tensor batches.
//
// Building training pairs:
//
//   <root>/BC, <root>/LT
//       │
//       ▼
//   DirectoryScanner  → lists .png files, parses day numbers
//       │
//       ▼
//   PairSampler       → draws random (before, after, delta) pairs
//       │
//       ▼
//   pairs.csv
//
// Feeding a model:
//
//   pairs / test_data.csv
//       │
//       ▼
//   PairDataset       → implements Burn's Dataset trait,
//       │               decodes + resizes images on access
//       ▼
//   PairBatcher       → stacks items into [N, 3, H, W] tensors

/// Day-number parsing from image file names
pub mod day;

/// Walks the species directories to build the image table
pub mod scanner;

/// Random before/after pair sampling
pub mod sampler;

/// Decode, resize and convert images to CHW floats
pub mod transform;

/// Implements Burn's Dataset trait for image pairs
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// CSV reading and writing for every table the tool touches
pub mod tables;
