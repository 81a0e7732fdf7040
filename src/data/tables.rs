// ============================================================
// Layer 4 — CSV Tables
// ============================================================
// Every artefact this tool reads or writes is a small CSV:
//
//   images.csv        file_name,day,species
//   pairs.csv         before_file_path,after_file_path,time_delta,species
//   test_data.csv     idx,before_file_path,after_file_path   (input only)
//   submission.csv    idx,time_delta                          (output only)
//
// The csv crate + serde derives do the (de)serialisation; this
// module only owns file handling and test-path resolution.

use anyhow::{ensure, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

use crate::domain::image_record::ImageRecord;
use crate::domain::pair::{ImagePair, TestPair};

pub const TEST_TABLE_NAME: &str = "test_data.csv";

// ─── Generic helpers ──────────────────────────────────────────────────────────

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create '{}'", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::debug!("Wrote {} rows to '{}'", rows.len(), path.display());
    Ok(())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;
    let mut rows = Vec::new();
    for (line, row) in reader.deserialize().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        rows.push(row.with_context(|| format!("Bad row {} in '{}'", line + 2, path.display()))?);
    }
    Ok(rows)
}

// ─── Image and pair tables ────────────────────────────────────────────────────

pub fn write_image_table(path: &Path, records: &[ImageRecord]) -> Result<()> {
    write_rows(path, records)
}

pub fn read_image_table(path: &Path) -> Result<Vec<ImageRecord>> {
    read_rows(path)
}

pub fn write_pair_table(path: &Path, pairs: &[ImagePair]) -> Result<()> {
    write_rows(path, pairs)
}

pub fn read_pair_table(path: &Path) -> Result<Vec<ImagePair>> {
    let pairs: Vec<ImagePair> = read_rows(path)?;
    tracing::info!("Loaded {} pairs from '{}'", pairs.len(), path.display());
    Ok(pairs)
}

// ─── Test table ───────────────────────────────────────────────────────────────

/// Row as stored on disk: bare stems like `idx_LT_1003_00341`.
#[derive(Debug, Deserialize)]
struct RawTestRow {
    idx:              String,
    before_file_path: String,
    after_file_path:  String,
}

/// Read `<test_root>/test_data.csv` and resolve every stem to a .png path.
pub fn read_test_table(test_root: &Path) -> Result<Vec<TestPair>> {
    let raw: Vec<RawTestRow> = read_rows(&test_root.join(TEST_TABLE_NAME))?;

    let pairs = raw
        .into_iter()
        .map(|row| {
            Ok(TestPair {
                before_file_path: resolve_test_path(test_root, &row.before_file_path)?,
                after_file_path:  resolve_test_path(test_root, &row.after_file_path)?,
                idx:              row.idx,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Loaded {} test pairs", pairs.len());
    Ok(pairs)
}

/// `A_B_C_D` → `<root>/B/C/A_B_C_D.png`
///
/// The second and third `_`-separated fields name the species
/// directory and the subject directory respectively.
pub fn resolve_test_path(test_root: &Path, stem: &str) -> Result<String> {
    let parts: Vec<&str> = stem.split('_').collect();
    ensure!(
        parts.len() >= 3,
        "Test image name '{}' needs at least three '_'-separated fields",
        stem
    );
    let path = test_root
        .join(parts[1])
        .join(parts[2])
        .join(format!("{stem}.png"));
    Ok(path.to_string_lossy().into_owned())
}

// ─── Submission ───────────────────────────────────────────────────────────────

/// An integer label (rounded), the f64 ensemble mean, or the f32
/// output of a single checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeltaLabel {
    Int(i64),
    Float(f64),
    Float32(f32),
}

#[derive(Serialize)]
struct SubmissionRow<'a> {
    idx:        &'a str,
    time_delta: DeltaLabel,
}

pub fn write_submission(path: &Path, idx: &[String], labels: &[DeltaLabel]) -> Result<()> {
    ensure!(
        idx.len() == labels.len(),
        "Submission has {} ids but {} labels",
        idx.len(),
        labels.len()
    );
    let rows: Vec<SubmissionRow> = idx
        .iter()
        .zip(labels)
        .map(|(idx, &time_delta)| SubmissionRow { idx, time_delta })
        .collect();
    write_rows(path, &rows)?;
    tracing::info!("Submission written to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image_record::Species;
    use std::fs;

    #[test]
    fn test_resolve_test_path() {
        let root = Path::new("/data/test");
        let p    = resolve_test_path(root, "idx_LT_1003_00341").unwrap();
        assert_eq!(Path::new(&p), Path::new("/data/test/LT/1003/idx_LT_1003_00341.png"));
        assert!(resolve_test_path(root, "too_short").is_err());
    }

    #[test]
    fn test_read_test_table_resolves_paths() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(TEST_TABLE_NAME),
            "idx,before_file_path,after_file_path\n\
             0,idx_BC_07_00001,idx_BC_07_00002\n\
             1,idx_LT_3_00010,idx_LT_3_00011\n",
        )
        .unwrap();

        let rows = read_test_table(tmp.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].idx, "1");
        assert!(rows[0].before_file_path.ends_with("BC/07/idx_BC_07_00001.png")
            || rows[0].before_file_path.ends_with("BC\\07\\idx_BC_07_00001.png"));
    }

    #[test]
    fn test_pair_table_header_and_read_back() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/pairs.csv");
        let pairs = vec![ImagePair {
            before_file_path: "a_01.png".into(),
            after_file_path:  "a_04.png".into(),
            time_delta:       3,
            species:          Species::Lt,
        }];
        write_pair_table(&path, &pairs).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "before_file_path,after_file_path,time_delta,species\na_01.png,a_04.png,3,lt\n"
        );
        assert_eq!(read_pair_table(&path).unwrap(), pairs);
    }

    #[test]
    fn test_image_table_header() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("images.csv");
        write_image_table(&path, &[ImageRecord::new("BC_01_D02.png", 2, Species::Bc)]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("file_name,day,species\n"));
        assert_eq!(read_image_table(&path).unwrap()[0].day, 2);
    }

    #[test]
    fn test_submission_columns() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("submission.csv");
        let ids  = vec!["0".to_string(), "1".to_string()];
        write_submission(&path, &ids, &[DeltaLabel::Int(4), DeltaLabel::Int(12)]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "idx,time_delta\n0,4\n1,12\n");

        assert!(write_submission(&path, &ids, &[DeltaLabel::Float(1.5)]).is_err());
    }
}
