// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the four subcommands: `index`, `pairs`, `infer` and
// `eval` and all their configurable flags.
//
// Option types (label type, inference type, backend, backbone)
// implement FromStr in their own layers, so clap parses them
// case-insensitively without this layer owning them.

use clap::{Args, Subcommand};

use crate::application::{
    eval_use_case::EvalConfig,
    infer_use_case::{BackendKind, InferConfig, InferenceType, LabelType},
    pairs_use_case::{IndexConfig, PairsConfig},
};
use crate::ml::model::Backbone;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan <root>/BC and <root>/LT and write an image table
    Index(IndexArgs),

    /// Sample random before/after pairs per species
    Pairs(PairsArgs),

    /// Predict day deltas for the test set and write a submission CSV
    Infer(InferArgs),

    /// Report MAE and RMSE of one checkpoint on a pair table
    Eval(EvalArgs),
}

// ─── index ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Data root containing the BC/ and LT/ species directories
    #[arg(long, default_value = "./")]
    pub root: String,

    /// Where to write the image table
    #[arg(long, default_value = "images.csv")]
    pub output: String,
}

impl From<IndexArgs> for IndexConfig {
    fn from(a: IndexArgs) -> Self {
        IndexConfig {
            root:   a.root,
            output: a.output,
        }
    }
}

// ─── pairs ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct PairsArgs {
    /// Data root containing the BC/ and LT/ species directories
    #[arg(long, default_value = "./")]
    pub root: String,

    /// Sample from an existing image table instead of scanning --root
    #[arg(long)]
    pub image_table: Option<String>,

    /// Number of pairs drawn for each species
    #[arg(long, default_value_t = 1000)]
    pub length: usize,

    /// Seed for reproducible sampling; omitted means entropy
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write every pair of each species instead of sampling --length
    #[arg(long)]
    pub exhaustive: bool,

    /// Where to write the pair table
    #[arg(long, default_value = "pairs.csv")]
    pub output: String,
}

impl From<PairsArgs> for PairsConfig {
    fn from(a: PairsArgs) -> Self {
        PairsConfig {
            root:        Some(a.root),
            image_table: a.image_table,
            length:      a.length,
            seed:        a.seed,
            exhaustive:  a.exhaustive,
            output:      a.output,
        }
    }
}

// ─── infer ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct InferArgs {
    /// Experiment directory holding fold_* checkpoint directories,
    /// given either under --exp-dir or as a path of its own
    #[arg(long)]
    pub fold_path: Option<String>,

    /// Parent directory of experiment runs
    #[arg(long, default_value = "./exp/")]
    pub exp_dir: String,

    /// Encoder preset the checkpoints were trained with
    #[arg(long = "pretrained", default_value = "small")]
    pub backbone: Backbone,

    /// Output CSV path
    #[arg(long, default_value = "./submission.csv")]
    pub submission_file: String,

    /// int (rounded) or float
    #[arg(long, default_value = "float")]
    pub label_type: LabelType,

    /// fold (average every fold) or single (one checkpoint)
    #[arg(long, default_value = "fold")]
    pub inf_type: InferenceType,

    /// Checkpoint file used when --inf-type single
    #[arg(long)]
    pub single_path: Option<String>,

    /// Test root containing test_data.csv and the species directories
    #[arg(long, default_value = "../data/test_dataset/")]
    pub test_path: String,

    /// Pairs per forward pass
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Shorter-edge resize target in pixels
    #[arg(long, default_value_t = 224)]
    pub image_size: u32,

    /// wgpu or ndarray
    #[arg(long, default_value = "wgpu")]
    pub backend: BackendKind,
}

impl From<InferArgs> for InferConfig {
    fn from(a: InferArgs) -> Self {
        InferConfig {
            fold_path:       a.fold_path,
            exp_dir:         a.exp_dir,
            backbone:        a.backbone,
            submission_file: a.submission_file,
            label_type:      a.label_type,
            inf_type:        a.inf_type,
            single_path:     a.single_path,
            test_path:       a.test_path,
            batch_size:      a.batch_size,
            image_size:      a.image_size,
            backend:         a.backend,
        }
    }
}

// ─── eval ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Labelled pair table, as written by `pairs`
    #[arg(long, default_value = "pairs.csv")]
    pub pairs: String,

    /// Checkpoint file to score
    #[arg(long)]
    pub checkpoint: String,

    #[arg(long = "pretrained", default_value = "small")]
    pub backbone: Backbone,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 224)]
    pub image_size: u32,

    #[arg(long, default_value = "wgpu")]
    pub backend: BackendKind,
}

impl From<EvalArgs> for EvalConfig {
    fn from(a: EvalArgs) -> Self {
        EvalConfig {
            pairs:      a.pairs,
            checkpoint: a.checkpoint,
            backbone:   a.backbone,
            batch_size: a.batch_size,
            image_size: a.image_size,
            backend:    a.backend,
        }
    }
}
