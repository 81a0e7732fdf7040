// ============================================================
// Layer 4 — Pair Sampler
// ============================================================
// Turns the flat image table into (before, after, delta) pairs.
//
// For each requested pair:
//   1. Restrict the table to one species
//   2. Draw two *distinct* rows uniformly at random
//   3. The row with the larger day becomes "after",
//      the smaller becomes "before"; on a tie the first
//      drawn row is used for both
//   4. time_delta = after.day - before.day
//
// get_combination lists every unordered pair of a path list
// instead, each pair sorted lexicographically.
//
// Pairs are drawn independently, so the same two images can
// appear more than once across a run.
//
// The RNG is a seedable ChaCha8 so runs can be reproduced.

use anyhow::{ensure, Result};
use rand::{seq::index, SeedableRng};
use std::collections::HashMap;
use rand_chacha::ChaCha8Rng;

use crate::domain::image_record::{ImageRecord, Species};
use crate::domain::pair::ImagePair;

/// Every unordered 2-combination of `paths`, each pair sorted.
/// Combinations come out in input order: (0,1), (0,2), ..., (1,2), ...
pub fn get_combination(paths: &[String]) -> Vec<[String; 2]> {
    let mut out = Vec::with_capacity(paths.len() * paths.len().saturating_sub(1) / 2);
    for (i, a) in paths.iter().enumerate() {
        for b in &paths[i + 1..] {
            let pair = if b < a { [b.clone(), a.clone()] } else { [a.clone(), b.clone()] };
            out.push(pair);
        }
    }
    out
}

/// Every pair of `species` images, ordered by day like sampled pairs.
pub fn all_combinations(species: Species, table: &[ImageRecord]) -> Vec<ImagePair> {
    let by_path: HashMap<&str, &ImageRecord> = table
        .iter()
        .filter(|r| r.species == species)
        .map(|r| (r.file_name.as_str(), r))
        .collect();
    let mut paths: Vec<String> = by_path.keys().map(|p| p.to_string()).collect();
    paths.sort();

    get_combination(&paths)
        .iter()
        .map(|[a, b]| ImagePair::from_records(by_path[a.as_str()], by_path[b.as_str()], species))
        .collect()
}

pub struct PairSampler {
    rng: ChaCha8Rng,
}

impl PairSampler {
    /// Seeded when `seed` is given, otherwise seeded from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None       => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    /// Draw `length` pairs from the rows of `species`.
    ///
    /// # Errors
    /// Fails if the species has fewer than two images.
    pub fn make_combination(
        &mut self,
        length:  usize,
        species: Species,
        table:   &[ImageRecord],
    ) -> Result<Vec<ImagePair>> {
        let rows: Vec<&ImageRecord> = table.iter().filter(|r| r.species == species).collect();
        ensure!(
            rows.len() >= 2,
            "Need at least 2 {} images to form a pair, found {}",
            species,
            rows.len()
        );

        let mut pairs = Vec::with_capacity(length);
        for _ in 0..length {
            // Two distinct positions, in draw order
            let picked = index::sample(&mut self.rng, rows.len(), 2);
            let first  = rows[picked.index(0)];
            let second = rows[picked.index(1)];
            pairs.push(ImagePair::from_records(first, second, species));
        }

        tracing::debug!("Sampled {} {} pairs from {} images", pairs.len(), species, rows.len());
        Ok(pairs)
    }

    /// `per_species` pairs for every species, BC first then LT.
    pub fn make_combinations(
        &mut self,
        per_species: usize,
        table:       &[ImageRecord],
    ) -> Result<Vec<ImagePair>> {
        let mut all = Vec::with_capacity(per_species * Species::ALL.len());
        for species in Species::ALL {
            all.extend(self.make_combination(per_species, species, table)?);
        }
        Ok(all)
    }
}
