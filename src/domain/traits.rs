// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for "all dated images" without
// caring where they come from. DirectoryScanner walks the
// BC/ and LT/ folders today; a manifest-backed source could
// implement the same trait later.

use anyhow::Result;
use crate::domain::image_record::ImageRecord;

// ─── ImageSource ──────────────────────────────────────────────────────────────
/// Any component that can produce the full image table.
///
/// Implementations:
///   - DirectoryScanner → walks `<root>/BC/*/*.png` and `<root>/LT/*/*.png`
pub trait ImageSource {
    /// Load every dated image from this source.
    fn load_all(&self) -> Result<Vec<ImageRecord>>;
}
