// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All forward-pass code lives here.
//
//   model.rs      — CompareNet: a shared conv encoder applied
//                   to both images, followed by a small MLP
//                   regression head over [before, after, diff]
//
//   inferencer.rs — Runs one loaded checkpoint over a dataset
//                   in batches, clamping predictions to ≥ 1 day
//
//   ensemble.rs   — Averages the predictions of every fold
//                   checkpoint into the final answer

/// Siamese comparison network
pub mod model;

/// Single-checkpoint batched inference
pub mod inferencer;

/// K-fold prediction averaging
pub mod ensemble;
