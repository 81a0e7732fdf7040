// ============================================================
// Layer 2 — Index and Pairs Use Cases
// ============================================================
// Two small workflows that prepare training data:
//
//   IndexUseCase:  scan <root>/BC and <root>/LT  →  images.csv
//   PairsUseCase:  scan (or read images.csv)     →  sample pairs
//                                                →  pairs.csv
//
// No pixels are touched here, only paths and day numbers.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    sampler::{all_combinations, PairSampler},
    scanner::DirectoryScanner,
    tables::{read_image_table, write_image_table, write_pair_table},
};
use crate::domain::image_record::{ImageRecord, Species};
use crate::domain::traits::ImageSource;

// ─── Index ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub root:   String,
    pub output: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root:   "./".to_string(),
            output: "images.csv".to_string(),
        }
    }
}

pub struct IndexUseCase {
    config: IndexConfig,
}

impl IndexUseCase {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Returns the number of images written.
    pub fn execute(&self) -> Result<usize> {
        let records = DirectoryScanner::new(&self.config.root).load_all()?;
        write_image_table(Path::new(&self.config.output), &records)?;
        tracing::info!("Wrote {} images to '{}'", records.len(), self.config.output);
        Ok(records.len())
    }
}

// ─── Pairs ────────────────────────────────────────────────────────────────────

/// Hyperparameters for one pair-sampling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairsConfig {
    /// Data root containing BC/ and LT/; ignored when `image_table` is set
    pub root:        Option<String>,
    /// A previously written images.csv to sample from instead of scanning
    pub image_table: Option<String>,
    /// Pairs drawn per species
    pub length:      usize,
    pub seed:        Option<u64>,
    /// Write every pair of each species instead of sampling `length`
    pub exhaustive:  bool,
    pub output:      String,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self {
            root:        Some("./".to_string()),
            image_table: None,
            length:      1000,
            seed:        None,
            exhaustive:  false,
            output:      "pairs.csv".to_string(),
        }
    }
}

pub struct PairsUseCase {
    config: PairsConfig,
}

impl PairsUseCase {
    pub fn new(config: PairsConfig) -> Self {
        Self { config }
    }

    /// Returns the number of pairs written.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;

        // ── Step 1: Image table ───────────────────────────────────────────────
        let table: Vec<ImageRecord> = match (&cfg.image_table, &cfg.root) {
            (Some(table), _) => {
                tracing::info!("Reading image table '{}'", table);
                read_image_table(Path::new(table))?
            }
            (None, Some(root)) => DirectoryScanner::new(root).load_all()?,
            (None, None) => bail!("Either a data root or an image table is required"),
        };

        // ── Step 2: Pairs per species ─────────────────────────────────────────
        let pairs = if cfg.exhaustive {
            Species::ALL
                .into_iter()
                .flat_map(|species| all_combinations(species, &table))
                .collect()
        } else {
            PairSampler::new(cfg.seed).make_combinations(cfg.length, &table)?
        };

        // ── Step 3: Persist ───────────────────────────────────────────────────
        write_pair_table(Path::new(&cfg.output), &pairs)?;
        tracing::info!("Wrote {} pairs to '{}'", pairs.len(), cfg.output);
        Ok(pairs.len())
    }
}
