// ============================================================
// Layer 6 — Checkpoints
// ============================================================
// Saves and restores CompareNet weights with Burn's
// CompactRecorder (MessagePack, half precision).
//
// Layout of a k-fold experiment:
//
//   exp/<run>/
//     fold_0/  model_fold_0.mpk
//     fold_1/  model_fold_1.mpk
//     ...
//     notes/   (ignored unless the run path contains "fold")
//
// Every checkpoint inside every "*fold*" directory becomes one
// ensemble member.
//
// The recorder always appends its own extension, so paths are
// normalised to a bare stem before being handed to it.

use anyhow::{ensure, Context, Result};
use burn::{
    backend::NdArray,
    prelude::*,
    record::{CompactRecorder, FileRecorder, Recorder},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::ml::model::CompareNet;

/// File extension the recorder writes, without the leading dot.
pub fn checkpoint_extension() -> &'static str {
    // The extension does not depend on the backend; any one will do.
    <CompactRecorder as FileRecorder<NdArray>>::file_extension()
}

/// `dir/model.mpk` → `dir/model`; paths without the extension pass through.
pub fn checkpoint_stem(path: &Path) -> PathBuf {
    let suffix = format!(".{}", checkpoint_extension());
    match path.to_str().and_then(|s| s.strip_suffix(suffix.as_str())) {
        Some(stem) => PathBuf::from(stem),
        None       => path.to_path_buf(),
    }
}

/// Write `model` next to `path` and return the file actually created.
#[cfg(test)]
pub fn save_model<B: Backend>(model: &CompareNet<B>, path: &Path) -> Result<PathBuf> {
    let stem = checkpoint_stem(path);
    if let Some(parent) = stem.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }

    CompactRecorder::new()
        .record(model.clone().into_record(), stem.clone())
        .with_context(|| format!("Failed to save checkpoint to '{}'", stem.display()))?;

    let written = stem.with_extension(checkpoint_extension());
    tracing::debug!("Saved checkpoint '{}'", written.display());
    Ok(written)
}

/// Restore weights from `path` into a freshly initialised `model`.
///
/// The architecture must match the one that was saved, or the
/// recorder refuses to load.
pub fn load_model<B: Backend>(
    model:  CompareNet<B>,
    path:   &Path,
    device: &B::Device,
) -> Result<CompareNet<B>> {
    let stem   = checkpoint_stem(path);
    let record = CompactRecorder::new()
        .load(stem.clone(), device)
        .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

    tracing::info!("Loaded checkpoint '{}'", path.display());
    Ok(model.load_record(record))
}

/// Every checkpoint file inside every directory of `fold_root` whose
/// path contains "fold", sorted so ensemble order is stable.
///
/// The whole path is matched, so a root such as `exp/kfold_run`
/// takes every subdirectory as a fold.
pub fn get_kfold_model_paths(fold_root: &Path) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", checkpoint_extension());
    let mut paths = Vec::new();

    for entry in fs::read_dir(fold_root)
        .with_context(|| format!("Cannot read fold directory '{}'", fold_root.display()))?
    {
        let fold = entry?.path();
        let is_fold = fold.to_string_lossy().contains("fold");
        if !is_fold || !fold.is_dir() {
            continue;
        }

        for file in fs::read_dir(&fold)
            .with_context(|| format!("Cannot read '{}'", fold.display()))?
        {
            let file = file?.path();
            let is_checkpoint = file
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix.as_str()));
            if is_checkpoint && file.is_file() {
                paths.push(file);
            }
        }
    }

    paths.sort();
    tracing::info!("Found {} fold checkpoints under '{}'", paths.len(), fold_root.display());
    Ok(paths)
}

/// Prefer `<exp_dir>/<arg>` when it exists, otherwise take `arg` as given.
pub fn resolve_fold_root(arg: &str, exp_dir: &Path) -> Result<PathBuf> {
    let under_exp = exp_dir.join(arg);
    let root = if under_exp.is_dir() { under_exp } else { PathBuf::from(arg) };
    ensure!(root.is_dir(), "Wrong Model Path: '{}' is not a directory", root.display());
    Ok(root)
}
