// ============================================================
// Layer 5 — K-Fold Ensemble
// ============================================================
// Each fold of a k-fold run leaves behind one checkpoint. At
// inference time every checkpoint predicts the full test set
// and the final answer is the plain arithmetic mean:
//
//   mean[i] = (p_1[i] + p_2[i] + ... + p_k[i]) / k
//
// Models are loaded one at a time and dropped once their
// predictions are summed, so memory stays at one model.

use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;

use crate::data::dataset::PairDataset;

/// Anything that turns a dataset into one prediction per row.
pub trait DeltaPredictor {
    fn predict(&self, dataset: &PairDataset) -> Result<Vec<f32>>;
}

/// Running sum of member predictions.
#[derive(Debug, Clone)]
pub struct EnsembleAccumulator {
    sum:   Vec<f64>,
    count: usize,
}

impl EnsembleAccumulator {
    pub fn new(len: usize) -> Self {
        Self { sum: vec![0.0; len], count: 0 }
    }

    pub fn add(&mut self, predictions: &[f32]) -> Result<()> {
        ensure!(
            predictions.len() == self.sum.len(),
            "Ensemble member produced {} predictions, expected {}",
            predictions.len(),
            self.sum.len()
        );
        for (acc, &p) in self.sum.iter_mut().zip(predictions) {
            *acc += f64::from(p);
        }
        self.count += 1;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Result<Vec<f64>> {
        ensure!(self.count > 0, "Cannot average an empty ensemble");
        let k = self.count as f64;
        Ok(self.sum.iter().map(|s| s / k).collect())
    }
}

/// Build each predictor lazily, predict, accumulate, then average.
pub fn ensemble_predict<P, I>(dataset: &PairDataset, predictors: I) -> Result<Vec<f64>>
where
    P: DeltaPredictor,
    I: IntoIterator<Item = Result<P>>,
{
    let mut acc = EnsembleAccumulator::new(dataset.len());
    for predictor in predictors {
        let predictor = predictor?;
        acc.add(&predictor.predict(dataset)?)?;
        tracing::debug!("Ensemble now has {} members", acc.count());
    }
    acc.mean()
}
