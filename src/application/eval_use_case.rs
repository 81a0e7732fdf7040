// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Scores one checkpoint against a labelled pair table, e.g. a
// held-out pairs.csv written by `pairs`:
//
//   Step 1: Read pairs.csv              (Layer 4 - data)
//   Step 2: Build the labelled dataset  (Layer 4 - data)
//   Step 3: Load checkpoint + evaluate  (Layer 5 - ml)

use anyhow::{ensure, Result};
use burn::prelude::Backend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::infer_use_case::BackendKind;
use crate::data::{
    dataset::PairDataset,
    tables::read_pair_table,
    transform::{ImageTransform, DEFAULT_IMAGE_SIZE},
};
use crate::ml::{
    inferencer::{EvalReport, Inferencer, DEFAULT_BATCH_SIZE},
    model::{Backbone, CompareNetConfig},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub pairs:      String,
    pub checkpoint: String,
    pub backbone:   Backbone,
    pub batch_size: usize,
    pub image_size: u32,
    pub backend:    BackendKind,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            pairs:      "pairs.csv".to_string(),
            checkpoint: String::new(),
            backbone:   Backbone::Small,
            batch_size: DEFAULT_BATCH_SIZE,
            image_size: DEFAULT_IMAGE_SIZE,
            backend:    BackendKind::Wgpu,
        }
    }
}

pub struct EvalUseCase {
    config: EvalConfig,
}

impl EvalUseCase {
    pub fn new(config: EvalConfig) -> Result<Self> {
        ensure!(
            Path::new(&config.checkpoint).exists(),
            "Wrong Model Path: '{}' does not exist",
            config.checkpoint
        );
        ensure!(config.batch_size > 0, "Batch size must be positive");
        ensure!(config.image_size > 0, "Image size must be positive");
        Ok(Self { config })
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let cfg = &self.config;

        let pairs   = read_pair_table(Path::new(&cfg.pairs))?;
        let dataset = PairDataset::train(pairs).with_transform(ImageTransform::new(cfg.image_size));

        match cfg.backend {
            BackendKind::Wgpu => self.evaluate::<burn::backend::Wgpu>(
                &dataset,
                burn::backend::wgpu::WgpuDevice::default(),
            ),
            BackendKind::Ndarray => self.evaluate::<burn::backend::NdArray>(
                &dataset,
                burn::backend::ndarray::NdArrayDevice::Cpu,
            ),
        }
    }

    fn evaluate<B: Backend>(&self, dataset: &PairDataset, device: B::Device) -> Result<EvalReport> {
        let cfg       = &self.config;
        let model_cfg = CompareNetConfig::new(cfg.backbone);
        let path      = PathBuf::from(&cfg.checkpoint);

        Inferencer::<B>::from_checkpoint(&model_cfg, &path, device, cfg.batch_size)?
            .with_label("Eval")
            .evaluate(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tables::write_pair_table;
    use crate::domain::{image_record::Species, pair::ImagePair};
    use crate::infra::checkpoint::save_model;
    use crate::ml::model::CompareNet;
    use burn::backend::NdArray;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_eval_reads_pair_table() {
        let tmp = tempfile::tempdir().unwrap();
        let mut pairs = Vec::new();
        for i in 0..3u32 {
            let before = tmp.path().join(format!("BC_{i}_D01.png"));
            let after  = tmp.path().join(format!("BC_{i}_D09.png"));
            RgbImage::from_pixel(10, 10, Rgb([10 * i as u8, 20, 30])).save(&before).unwrap();
            RgbImage::from_pixel(10, 10, Rgb([90, 10 * i as u8, 30])).save(&after).unwrap();
            pairs.push(ImagePair {
                before_file_path: before.to_string_lossy().into_owned(),
                after_file_path:  after.to_string_lossy().into_owned(),
                time_delta:       8,
                species:          Species::Bc,
            });
        }
        let table = tmp.path().join("pairs.csv");
        write_pair_table(&table, &pairs).unwrap();

        let model: CompareNet<NdArray<f32>> =
            CompareNetConfig::new(Backbone::Tiny).init(&Default::default());
        let checkpoint = save_model(&model, &tmp.path().join("model")).unwrap();

        let report = EvalUseCase::new(EvalConfig {
            pairs:      table.to_string_lossy().into_owned(),
            checkpoint: checkpoint.to_string_lossy().into_owned(),
            backbone:   Backbone::Tiny,
            batch_size: 2,
            image_size: 8,
            backend:    BackendKind::Ndarray,
        })
        .unwrap()
        .execute()
        .unwrap();

        assert_eq!(report.pairs, 3);
        assert!(report.mae >= 0.0);
        assert!(report.rmse >= report.mae - 1e-9);
    }

    #[test]
    fn test_eval_rejects_missing_checkpoint() {
        let cfg = EvalConfig { checkpoint: "/missing/model.mpk".into(), ..EvalConfig::default() };
        assert!(EvalUseCase::new(cfg).is_err());
    }
}
