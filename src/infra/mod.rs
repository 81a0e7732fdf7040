// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   checkpoint.rs — Saving and loading CompareNet weights with
//                   Burn's CompactRecorder, plus discovery of
//                   per-fold checkpoints inside an experiment
//                   directory.

/// Model checkpoint saving, loading and k-fold discovery
pub mod checkpoint;
