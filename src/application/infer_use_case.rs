// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Orchestrates submission generation:
//
//   Step 1: Validate arguments           (fail fast, before any I/O)
//   Step 2: Read + resolve test table    (Layer 4 - data)
//   Step 3: Build the test dataset       (Layer 4 - data)
//   Step 4: Predict                      (Layer 5 - ml)
//             fold   → mean over every fold checkpoint
//             single → one checkpoint
//   Step 5: Format labels (int / float)
//   Step 6: Write idx,time_delta CSV     (Layer 4 - data)

use anyhow::{bail, ensure, Result};
use burn::prelude::Backend;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::data::{
    dataset::PairDataset,
    tables::{read_test_table, write_submission, DeltaLabel},
    transform::{ImageTransform, DEFAULT_IMAGE_SIZE},
};
use crate::infra::checkpoint::{get_kfold_model_paths, resolve_fold_root};
use crate::ml::{
    ensemble::{ensemble_predict, DeltaPredictor},
    inferencer::{Inferencer, DEFAULT_BATCH_SIZE},
    model::{Backbone, CompareNetConfig},
};

// ─── Options ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceType {
    Fold,
    Single,
}

impl FromStr for InferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fold"   => Ok(Self::Fold),
            "single" => Ok(Self::Single),
            other    => Err(format!("Choose Inference Type : fold or single (got '{other}')")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    Int,
    Float,
}

impl FromStr for LabelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "int"   => Ok(Self::Int),
            "float" => Ok(Self::Float),
            other   => Err(format!("Choose Label Type : int or float (got '{other}')")),
        }
    }
}

impl LabelType {
    /// `Int` rounds half to even, so 2.5 → 2 and 3.5 → 4.
    pub fn format(&self, mean: f64) -> DeltaLabel {
        match self {
            LabelType::Int   => DeltaLabel::Int(mean.round_ties_even() as i64),
            LabelType::Float => DeltaLabel::Float(mean),
        }
    }

    /// Same as `format`, but a float label keeps single precision.
    pub fn format_single(&self, value: f32) -> DeltaLabel {
        match self {
            LabelType::Int   => DeltaLabel::Int(value.round_ties_even() as i64),
            LabelType::Float => DeltaLabel::Float32(value),
        }
    }
}

/// Fold mode averages in f64; a single checkpoint keeps its f32 output.
#[derive(Debug, Clone, PartialEq)]
pub enum Predictions {
    Mean(Vec<f64>),
    Single(Vec<f32>),
}

impl Predictions {
    pub fn labels(&self, label_type: LabelType) -> Vec<DeltaLabel> {
        match self {
            Predictions::Mean(values)   => values.iter().map(|&v| label_type.format(v)).collect(),
            Predictions::Single(values) => values.iter().map(|&v| label_type.format_single(v)).collect(),
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Predictions::Mean(values)   => values.clone(),
            Predictions::Single(values) => values.iter().map(|&v| f64::from(v)).collect(),
        }
    }
}

/// Where tensors live. `ndarray` is the CPU fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Wgpu,
    Ndarray,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wgpu"    => Ok(Self::Wgpu),
            "ndarray" => Ok(Self::Ndarray),
            other     => Err(format!("Choose Backend : wgpu or ndarray (got '{other}')")),
        }
    }
}

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferConfig {
    pub fold_path:       Option<String>,
    pub exp_dir:         String,
    pub backbone:        Backbone,
    pub submission_file: String,
    pub label_type:      LabelType,
    pub inf_type:        InferenceType,
    pub single_path:     Option<String>,
    pub test_path:       String,
    pub batch_size:      usize,
    /// Shorter-edge resize target
    pub image_size:      u32,
    pub backend:         BackendKind,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            fold_path:       None,
            exp_dir:         "./exp/".to_string(),
            backbone:        Backbone::Small,
            submission_file: "./submission.csv".to_string(),
            label_type:      LabelType::Float,
            inf_type:        InferenceType::Fold,
            single_path:     None,
            test_path:       "../data/test_dataset/".to_string(),
            batch_size:      DEFAULT_BATCH_SIZE,
            image_size:      DEFAULT_IMAGE_SIZE,
            backend:         BackendKind::Wgpu,
        }
    }
}

/// Checkpoints selected by validation.
#[derive(Debug, Clone, PartialEq)]
enum ModelSource {
    Folds(PathBuf),
    Single(PathBuf),
}

// ─── InferUseCase ─────────────────────────────────────────────────────────────

pub struct InferUseCase {
    config: InferConfig,
    source: ModelSource,
}

impl InferUseCase {
    /// Validate the configuration. Nothing is read yet.
    pub fn new(config: InferConfig) -> Result<Self> {
        let source = match config.inf_type {
            InferenceType::Fold => {
                let Some(arg) = config.fold_path.as_deref() else {
                    bail!("Wrong Model Path: --fold-path is required for fold inference");
                };
                ModelSource::Folds(resolve_fold_root(arg, Path::new(&config.exp_dir))?)
            }
            InferenceType::Single => {
                let Some(arg) = config.single_path.as_deref() else {
                    bail!("Wrong Model Path: --single-path is required for single inference");
                };
                let path = PathBuf::from(arg);
                ensure!(path.exists(), "Wrong Model Path: '{}' does not exist", path.display());
                ModelSource::Single(path)
            }
        };

        let is_csv = Path::new(&config.submission_file)
            .extension()
            .and_then(|e| e.to_str())
            == Some("csv");
        ensure!(is_csv, "Wrong Output File Name: '{}'", config.submission_file);
        ensure!(config.batch_size > 0, "Batch size must be positive");
        ensure!(config.image_size > 0, "Image size must be positive");

        Ok(Self { config, source })
    }

    /// Run inference and write the submission. Returns the labels written.
    pub fn execute(&self) -> Result<Vec<DeltaLabel>> {
        let cfg = &self.config;
        tracing::info!("Inference config: {}", serde_json::to_string(cfg)?);

        // ── Steps 2-3: Test data ──────────────────────────────────────────────
        let test_rows = read_test_table(Path::new(&cfg.test_path))?;
        let ids: Vec<String> = test_rows.iter().map(|r| r.idx.clone()).collect();
        let dataset = PairDataset::test(test_rows)
            .with_transform(ImageTransform::new(cfg.image_size));

        // ── Step 4: Predict on the chosen backend ─────────────────────────────
        let predictions = match cfg.backend {
            BackendKind::Wgpu => self.predict::<burn::backend::Wgpu>(
                &dataset,
                burn::backend::wgpu::WgpuDevice::default(),
            )?,
            BackendKind::Ndarray => self.predict::<burn::backend::NdArray>(
                &dataset,
                burn::backend::ndarray::NdArrayDevice::Cpu,
            )?,
        };

        // ── Steps 5-6: Labels and submission ──────────────────────────────────
        let labels = predictions.labels(cfg.label_type);
        write_submission(Path::new(&cfg.submission_file), &ids, &labels)?;
        Ok(labels)
    }

    pub fn predict<B: Backend>(&self, dataset: &PairDataset, device: B::Device) -> Result<Predictions> {
        let cfg       = &self.config;
        let model_cfg = CompareNetConfig::new(cfg.backbone);

        match &self.source {
            ModelSource::Folds(root) => {
                let paths = get_kfold_model_paths(root)?;
                ensure!(
                    !paths.is_empty(),
                    "No fold checkpoints found under '{}'",
                    root.display()
                );

                let members = paths.iter().enumerate().map(|(idx, path)| {
                    Inferencer::<B>::from_checkpoint(&model_cfg, path, device.clone(), cfg.batch_size)
                        .map(|inf| inf.with_label(format!("Fold-{idx}")))
                });
                Ok(Predictions::Mean(ensemble_predict(dataset, members)?))
            }
            ModelSource::Single(path) => {
                let inferencer =
                    Inferencer::<B>::from_checkpoint(&model_cfg, path, device, cfg.batch_size)?
                        .with_label("Fold-single");
                Ok(Predictions::Single(inferencer.predict(dataset)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tables::TEST_TABLE_NAME;
    use crate::infra::checkpoint::save_model;
    use crate::ml::model::CompareNet;
    use burn::backend::NdArray;
    use image::{Rgb, RgbImage};
    use std::fs;

    type TestBackend = NdArray<f32>;

    /// test_data.csv with two rows, images under <root>/BC/01/
    fn write_test_set(root: &Path) {
        let dir = root.join("BC").join("01");
        fs::create_dir_all(&dir).unwrap();
        for (i, stem) in ["idx_BC_01_00001", "idx_BC_01_00002", "idx_BC_01_00003"].iter().enumerate() {
            RgbImage::from_pixel(12, 12, Rgb([i as u8 * 60, 90, 30]))
                .save(dir.join(format!("{stem}.png")))
                .unwrap();
        }
        fs::write(
            root.join(TEST_TABLE_NAME),
            "idx,before_file_path,after_file_path\n\
             0,idx_BC_01_00001,idx_BC_01_00002\n\
             1,idx_BC_01_00002,idx_BC_01_00003\n",
        )
        .unwrap();
    }

    fn save_folds(exp: &Path, k: usize) {
        let device = Default::default();
        for fold in 0..k {
            let model: CompareNet<TestBackend> = CompareNetConfig::new(Backbone::Tiny).init(&device);
            save_model(&model, &exp.join(format!("fold_{fold}")).join("model")).unwrap();
        }
    }

    fn config(tmp: &Path) -> InferConfig {
        InferConfig {
            exp_dir:         tmp.join("exp").to_string_lossy().into_owned(),
            backbone:        Backbone::Tiny,
            submission_file: tmp.join("out/submission.csv").to_string_lossy().into_owned(),
            test_path:       tmp.join("test").to_string_lossy().into_owned(),
            batch_size:      4,
            image_size:      16,
            backend:         BackendKind::Ndarray,
            ..InferConfig::default()
        }
    }

    #[test]
    fn test_option_parsing_is_case_insensitive() {
        assert_eq!("FOLD".parse::<InferenceType>().unwrap(), InferenceType::Fold);
        assert_eq!("Single".parse::<InferenceType>().unwrap(), InferenceType::Single);
        assert_eq!("Int".parse::<LabelType>().unwrap(), LabelType::Int);
        assert_eq!("ndArray".parse::<BackendKind>().unwrap(), BackendKind::Ndarray);
        assert!("double".parse::<LabelType>().is_err());
        assert!("kfold".parse::<InferenceType>().is_err());
    }

    #[test]
    fn test_int_labels_round_half_to_even() {
        assert_eq!(LabelType::Int.format(2.5), DeltaLabel::Int(2));
        assert_eq!(LabelType::Int.format(3.5), DeltaLabel::Int(4));
        assert_eq!(LabelType::Int.format(7.2), DeltaLabel::Int(7));
        assert_eq!(LabelType::Float.format(7.2), DeltaLabel::Float(7.2));
        assert_eq!(LabelType::Int.format_single(2.5), DeltaLabel::Int(2));
    }

    #[test]
    fn test_single_float_labels_keep_f32_precision() {
        let labels = Predictions::Single(vec![3.2345679_f32]).labels(LabelType::Float);
        assert_eq!(labels, vec![DeltaLabel::Float32(3.2345679)]);

        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("submission.csv");
        write_submission(&path, &["0".to_string()], &labels).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "idx,time_delta\n0,3.2345679\n");

        let labels = Predictions::Mean(vec![2.5, 4.0]).labels(LabelType::Int);
        assert_eq!(labels, vec![DeltaLabel::Int(2), DeltaLabel::Int(4)]);
    }

    #[test]
    fn test_validation_rejects_bad_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("exp/run1")).unwrap();

        // fold mode without a path
        assert!(InferUseCase::new(config(tmp.path())).is_err());

        // fold path that does not exist
        let cfg = InferConfig { fold_path: Some("nope".into()), ..config(tmp.path()) };
        assert!(InferUseCase::new(cfg).is_err());

        // wrong output extension
        let cfg = InferConfig {
            fold_path:       Some("run1".into()),
            submission_file: "out.txt".into(),
            ..config(tmp.path())
        };
        assert!(InferUseCase::new(cfg).is_err());

        // single mode with a missing checkpoint
        let cfg = InferConfig {
            inf_type:    InferenceType::Single,
            single_path: Some("/missing/model.mpk".into()),
            ..config(tmp.path())
        };
        assert!(InferUseCase::new(cfg).is_err());

        // a good fold configuration validates
        let cfg = InferConfig { fold_path: Some("run1".into()), ..config(tmp.path()) };
        assert!(InferUseCase::new(cfg).is_ok());
    }

    #[test]
    fn test_fold_inference_writes_submission() {
        let tmp = tempfile::tempdir().unwrap();
        write_test_set(&tmp.path().join("test"));
        save_folds(&tmp.path().join("exp/run1"), 3);

        let cfg = InferConfig {
            fold_path:  Some("run1".into()),
            label_type: LabelType::Int,
            ..config(tmp.path())
        };
        let labels = InferUseCase::new(cfg.clone()).unwrap().execute().unwrap();
        assert_eq!(labels.len(), 2);
        for label in &labels {
            match label {
                DeltaLabel::Int(v) => assert!(*v >= 1),
                other => panic!("expected integer labels, got {other:?}"),
            }
        }

        let text = fs::read_to_string(&cfg.submission_file).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "idx,time_delta");
        assert!(lines[1].starts_with("0,"));
        assert!(lines[2].starts_with("1,"));
    }

    #[test]
    fn test_fold_mean_matches_members() {
        let tmp = tempfile::tempdir().unwrap();
        write_test_set(&tmp.path().join("test"));
        let run = tmp.path().join("exp/run2");
        save_folds(&run, 2);

        let cfg = InferConfig { fold_path: Some("run2".into()), ..config(tmp.path()) };
        let use_case = InferUseCase::new(cfg.clone()).unwrap();
        let dataset  = PairDataset::test(read_test_table(Path::new(&cfg.test_path)).unwrap())
            .with_transform(ImageTransform::new(cfg.image_size));
        let device   = burn::backend::ndarray::NdArrayDevice::Cpu;
        let mean     = use_case.predict::<TestBackend>(&dataset, device).unwrap().to_f64();

        // Each fold on its own through single mode
        let mut members = Vec::new();
        for path in get_kfold_model_paths(&run).unwrap() {
            let single = InferUseCase::new(InferConfig {
                inf_type:    InferenceType::Single,
                single_path: Some(path.to_string_lossy().into_owned()),
                ..cfg.clone()
            })
            .unwrap();
            let preds = single.predict::<TestBackend>(&dataset, device).unwrap();
            assert!(matches!(preds, Predictions::Single(_)));
            members.push(preds.to_f64());
        }

        assert_eq!(members.len(), 2);
        for i in 0..mean.len() {
            let expected = (members[0][i] + members[1][i]) / 2.0;
            assert!((mean[i] - expected).abs() < 1e-5);
            assert!(mean[i] >= 1.0);
        }
    }

    #[test]
    fn test_empty_fold_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_test_set(&tmp.path().join("test"));
        fs::create_dir_all(tmp.path().join("exp/empty/fold_0")).unwrap();

        let cfg = InferConfig { fold_path: Some("empty".into()), ..config(tmp.path()) };
        assert!(InferUseCase::new(cfg).unwrap().execute().is_err());
    }
}
