// ============================================================
// Layer 4 — Directory Scanner
// ============================================================
// Builds the image table from the on-disk layout:
//
//   <root>/
//     BC/
//       BC_01/  BC_01_D00.png  BC_01_D01.png ...
//       BC_02/  ...
//     LT/
//       LT_01/  ...
//
// One sub-directory per subject, one .png per day. Only the
// day number (from the file name) and the species (from the
// top-level directory) are recorded; pixels are loaded much
// later, lazily, by the dataset.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::day::make_day_array;
use crate::domain::image_record::{ImageRecord, Species};
use crate::domain::traits::ImageSource;

/// Walks a data root and lists every dated image per species.
/// Implements the ImageSource trait from Layer 3.
pub struct DirectoryScanner {
    root: PathBuf,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return `(bc_paths, lt_paths)`, each sorted.
    pub fn image_paths(&self) -> Result<(Vec<String>, Vec<String>)> {
        if !self.root.is_dir() {
            anyhow::bail!("Data root '{}' is not a directory", self.root.display());
        }
        let bc = self.species_paths(Species::Bc)?;
        let lt = self.species_paths(Species::Lt)?;
        Ok((bc, lt))
    }

    /// Every `<root>/<SPECIES>/*/*.png`.
    fn species_paths(&self, species: Species) -> Result<Vec<String>> {
        let species_dir = self.root.join(species.dir_name());

        // A missing species folder is not fatal; the sampler will
        // complain later if that species is actually requested.
        if !species_dir.is_dir() {
            tracing::warn!(
                "Species directory '{}' does not exist, no {} images",
                species_dir.display(),
                species
            );
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for subject in read_dir_sorted(&species_dir)? {
            if !subject.is_dir() {
                continue;
            }
            for file in read_dir_sorted(&subject)? {
                if file.is_file() && file.extension().and_then(|e| e.to_str()) == Some("png") {
                    paths.push(file.to_string_lossy().into_owned());
                }
            }
        }

        tracing::debug!("Found {} {} images", paths.len(), species);
        Ok(paths)
    }
}

impl ImageSource for DirectoryScanner {
    fn load_all(&self) -> Result<Vec<ImageRecord>> {
        let (bc_paths, lt_paths) = self.image_paths()?;
        let bc_days = make_day_array(&bc_paths)?;
        let lt_days = make_day_array(&lt_paths)?;

        // BC rows first, then LT, same order as the species enum
        let records: Vec<ImageRecord> = bc_paths
            .into_iter()
            .zip(bc_days)
            .map(|(path, day)| ImageRecord::new(path, day, Species::Bc))
            .chain(
                lt_paths
                    .into_iter()
                    .zip(lt_days)
                    .map(|(path, day)| ImageRecord::new(path, day, Species::Lt)),
            )
            .collect();

        tracing::info!(
            "Indexed {} images under '{}'",
            records.len(),
            self.root.display()
        );
        Ok(records)
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}
