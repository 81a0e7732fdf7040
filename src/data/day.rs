// ============================================================
// Layer 4 — Day Extraction
// ============================================================
// Every image file name ends in a two-digit day number just
// before the extension, e.g.
//
//   data/BC/BC_01/BC_01_D05.png
//                          ^^ day 5
//
// The whole path is split on '.', the second-to-last segment
// is the stem, and its last two characters are the day.
// Splitting the full path (not just the file name) is fine:
// directory components only ever end up in the stem prefix.

use anyhow::{bail, Context, Result};

/// Parse the day number from an image path.
///
/// # Errors
/// Fails if the path has no '.', or if the last two characters
/// of the stem are not decimal digits.
pub fn extract_day(file_name: &str) -> Result<u32> {
    let segments: Vec<&str> = file_name.split('.').collect();
    if segments.len() < 2 {
        bail!("'{}' has no extension to locate the day number from", file_name);
    }
    let stem = segments[segments.len() - 2];

    // Last two *characters*, not bytes; paths may contain non-ASCII
    let tail: String = {
        let chars: Vec<char> = stem.chars().collect();
        let from = chars.len().saturating_sub(2);
        chars[from..].iter().collect()
    };

    if tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
        bail!("'{}' does not end in a two-digit day number", file_name);
    }

    tail.parse::<u32>()
        .with_context(|| format!("Cannot parse day from '{}'", file_name))
}

/// Map `extract_day` over a list of paths, failing on the first bad one.
pub fn make_day_array<S: AsRef<str>>(paths: &[S]) -> Result<Vec<u32>> {
    paths.iter().map(|p| extract_day(p.as_ref())).collect()
}
