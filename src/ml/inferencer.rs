// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{anyhow, bail, ensure, Result};
use burn::{data::dataloader::batcher::Batcher, data::dataset::Dataset, prelude::*};
use serde::Serialize;
use std::path::Path;

use crate::data::{batcher::PairBatcher, dataset::PairDataset};
use crate::infra::checkpoint;
use crate::ml::ensemble::DeltaPredictor;
use crate::ml::model::{CompareNet, CompareNetConfig};

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// A day delta is never reported below one day.
pub const MIN_DELTA: f32 = 1.0;

pub struct Inferencer<B: Backend> {
    model:      CompareNet<B>,
    device:     B::Device,
    batch_size: usize,
    label:      String,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(model: CompareNet<B>, device: B::Device, batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        Self { model, device, batch_size, label: "single".to_string() }
    }

    /// Build the model from `config` and load weights from `path`.
    pub fn from_checkpoint(
        config:     &CompareNetConfig,
        path:       &Path,
        device:     B::Device,
        batch_size: usize,
    ) -> Result<Self> {
        let model = config.init::<B>(&device);
        let model = checkpoint::load_model(model, path, &device)?;
        Ok(Self::new(model, device, batch_size))
    }

    /// Name shown in progress logs, e.g. `Fold-2`.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Score clamped predictions against a labelled pair table.
    pub fn evaluate(&self, dataset: &PairDataset) -> Result<EvalReport> {
        let batcher = PairBatcher::<B>::new(self.device.clone());
        let total   = dataset.len();
        ensure!(total > 0, "Cannot evaluate an empty pair table");

        let (mut abs_sum, mut sq_sum) = (0.0_f64, 0.0_f64);
        for start in (0..total).step_by(self.batch_size) {
            let end = (start + self.batch_size).min(total);
            let items = (start..end)
                .map(|i| dataset.try_get(i))
                .collect::<Result<Vec<_>>>()?;

            let batch = batcher.batch(items);
            let Some(targets) = batch.time_delta else {
                bail!("Evaluation needs pairs with a time_delta column");
            };
            let preds   = self.forward_values(batch.before, batch.after, end - start)?;
            let targets = targets
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read targets: {e:?}"))?;

            for (p, t) in preds.iter().zip(&targets) {
                let err = f64::from(p - t);
                abs_sum += err.abs();
                sq_sum  += err * err;
            }
        }

        let n = total as f64;
        let report = EvalReport { pairs: total, mae: abs_sum / n, rmse: (sq_sum / n).sqrt() };
        tracing::info!("{}: MAE {:.4} RMSE {:.4} over {} pairs", self.label, report.mae, report.rmse, total);
        Ok(report)
    }

    /// Forward one batch and read back `n` clamped predictions.
    fn forward_values(&self, before: Tensor<B, 4>, after: Tensor<B, 4>, n: usize) -> Result<Vec<f32>> {
        let logits = self.model.forward(before, after); // [n, 1]
        let values = logits
            .reshape([n])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))?;
        Ok(values.into_iter().map(|v| v.max(MIN_DELTA)).collect())
    }
}

/// Error of a checkpoint on labelled pairs, in days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvalReport {
    pub pairs: usize,
    pub mae:   f64,
    pub rmse:  f64,
}

impl<B: Backend> DeltaPredictor for Inferencer<B> {
    fn predict(&self, dataset: &PairDataset) -> Result<Vec<f32>> {
        let batcher = PairBatcher::<B>::new(self.device.clone());
        let total   = dataset.len();
        let batches = total.div_ceil(self.batch_size);
        let mut out = Vec::with_capacity(total);

        for (batch_idx, start) in (0..total).step_by(self.batch_size).enumerate() {
            let end = (start + self.batch_size).min(total);
            let items = (start..end)
                .map(|i| dataset.try_get(i))
                .collect::<Result<Vec<_>>>()?;

            let batch = batcher.batch(items);
            out.extend(self.forward_values(batch.before, batch.after, end - start)?);
            tracing::debug!("{}: batch {}/{}", self.label, batch_idx + 1, batches);
        }

        tracing::info!("{}: predicted {} pairs", self.label, out.len());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::transform::ImageTransform;
    use crate::domain::image_record::Species;
    use crate::domain::pair::{ImagePair, TestPair};
    use crate::ml::model::Backbone;
    use burn::backend::NdArray;
    use image::{Rgb, RgbImage};

    type TestBackend = NdArray<f32>;

    fn dataset(dir: &Path, n: usize) -> PairDataset {
        let rows = (0..n)
            .map(|i| {
                let before = dir.join(format!("b{i}.png"));
                let after  = dir.join(format!("a{i}.png"));
                RgbImage::from_pixel(10, 10, Rgb([i as u8 * 20, 40, 60])).save(&before).unwrap();
                RgbImage::from_pixel(10, 10, Rgb([200, i as u8 * 10, 5])).save(&after).unwrap();
                TestPair {
                    idx:              i.to_string(),
                    before_file_path: before.to_string_lossy().into_owned(),
                    after_file_path:  after.to_string_lossy().into_owned(),
                }
            })
            .collect();
        PairDataset::test(rows).with_transform(ImageTransform::new(8))
    }

    #[test]
    fn test_one_prediction_per_row_clamped() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = CompareNetConfig::new(Backbone::Tiny).init::<TestBackend>(&device);

        // batch size 2 over 5 rows exercises the ragged last batch
        let inferencer = Inferencer::new(model, device, 2).with_label("Fold-0");
        let preds = inferencer.predict(&dataset(tmp.path(), 5)).unwrap();

        assert_eq!(preds.len(), 5);
        assert!(preds.iter().all(|p| *p >= MIN_DELTA));
    }

    #[test]
    fn test_batching_does_not_change_results() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = CompareNetConfig::new(Backbone::Tiny).init::<TestBackend>(&device);
        let ds     = dataset(tmp.path(), 3);

        let one_by_one = Inferencer::new(model.clone(), device.clone(), 1).predict(&ds).unwrap();
        let all_at_once = Inferencer::new(model, device, 64).predict(&ds).unwrap();
        for (a, b) in one_by_one.iter().zip(&all_at_once) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_evaluate_matches_predictions() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = CompareNetConfig::new(Backbone::Tiny).init::<TestBackend>(&device);
        let test   = dataset(tmp.path(), 3);

        // Same images, now labelled 2, 4, 6 days
        let pairs: Vec<ImagePair> = (0..3)
            .map(|i| ImagePair {
                before_file_path: tmp.path().join(format!("b{i}.png")).to_string_lossy().into_owned(),
                after_file_path:  tmp.path().join(format!("a{i}.png")).to_string_lossy().into_owned(),
                time_delta:       2 * (i + 1),
                species:          Species::Bc,
            })
            .collect();
        let train = PairDataset::train(pairs).with_transform(ImageTransform::new(8));

        let inferencer = Inferencer::new(model, device, 2);
        let preds  = inferencer.predict(&test).unwrap();
        let report = inferencer.evaluate(&train).unwrap();

        let expected_mae = preds
            .iter()
            .zip([2.0_f32, 4.0, 6.0])
            .map(|(p, t)| f64::from((p - t).abs()))
            .sum::<f64>()
            / 3.0;
        assert_eq!(report.pairs, 3);
        assert!((report.mae - expected_mae).abs() < 1e-4);
        assert!(report.rmse >= report.mae - 1e-9);
    }

    #[test]
    fn test_evaluate_needs_labels() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model  = CompareNetConfig::new(Backbone::Tiny).init::<TestBackend>(&device);
        let inferencer = Inferencer::new(model, device, 4);

        assert!(inferencer.evaluate(&dataset(tmp.path(), 2)).is_err());
        assert!(inferencer.evaluate(&PairDataset::test(Vec::new())).is_err());
    }

    #[test]
    fn test_missing_image_fails_prediction() {
        let device = Default::default();
        let model  = CompareNetConfig::new(Backbone::Tiny).init::<TestBackend>(&device);
        let ds = PairDataset::test(vec![TestPair {
            idx:              "0".into(),
            before_file_path: "/missing/b.png".into(),
            after_file_path:  "/missing/a.png".into(),
        }]);
        assert!(Inferencer::new(model, device, 4).predict(&ds).is_err());
    }
}
