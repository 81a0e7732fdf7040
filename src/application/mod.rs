// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each.
//
// Rules for this layer:
//   - No model code here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - File formats belong to Layer 4 and 6
//   - Only workflow coordination

/// Image indexing and pair sampling
pub mod pairs_use_case;

/// Fold / single checkpoint inference into a submission
pub mod infer_use_case;

/// Checkpoint error on a labelled pair table
pub mod eval_use_case;
