// ============================================================
// Layer 4 — Pair Dataset
// ============================================================
// Implements Burn's Dataset trait over a pair table. Rows keep
// only paths; both images are decoded and transformed when an
// item is requested. Training rows carry time_delta, test rows
// do not.

use anyhow::{anyhow, Result};
use burn::data::dataset::Dataset;

use crate::data::transform::{ImageTransform, TransformedImage};
use crate::domain::pair::{ImagePair, TestPair};

/// One loaded pair: both images transformed, plus the label
/// when the row came from the training table.
#[derive(Debug, Clone)]
pub struct PairItem {
    pub before:     TransformedImage,
    pub after:      TransformedImage,
    pub time_delta: Option<u32>,
}

#[derive(Debug, Clone)]
struct PairRow {
    before_file_path: String,
    after_file_path:  String,
    time_delta:       Option<u32>,
}

/// Pixels are decoded on access, never held for the whole table.
pub struct PairDataset {
    rows:      Vec<PairRow>,
    transform: ImageTransform,
}

impl PairDataset {
    pub fn train(pairs: Vec<ImagePair>) -> Self {
        let rows = pairs
            .into_iter()
            .map(|p| PairRow {
                before_file_path: p.before_file_path,
                after_file_path:  p.after_file_path,
                time_delta:       Some(p.time_delta),
            })
            .collect();
        Self { rows, transform: ImageTransform::default() }
    }

    pub fn test(pairs: Vec<TestPair>) -> Self {
        let rows = pairs
            .into_iter()
            .map(|p| PairRow {
                before_file_path: p.before_file_path,
                after_file_path:  p.after_file_path,
                time_delta:       None,
            })
            .collect();
        Self { rows, transform: ImageTransform::default() }
    }

    pub fn with_transform(mut self, transform: ImageTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Load row `index`, surfacing decode errors instead of hiding them.
    pub fn try_get(&self, index: usize) -> Result<PairItem> {
        let row = self
            .rows
            .get(index)
            .ok_or_else(|| anyhow!("Index {} out of range for {} pairs", index, self.rows.len()))?;

        Ok(PairItem {
            before:     self.transform.load(&row.before_file_path)?,
            after:      self.transform.load(&row.after_file_path)?,
            time_delta: row.time_delta,
        })
    }
}

impl Dataset<PairItem> for PairDataset {
    fn get(&self, index: usize) -> Option<PairItem> {
        if index >= self.rows.len() {
            return None;
        }
        match self.try_get(index) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!("Skipping pair {}: {:#}", index, e);
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}
