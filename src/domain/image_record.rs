// ============================================================
// Layer 3 — ImageRecord Domain Type
// ============================================================
// One row of the image table: a file on disk, the day number
// parsed from its name, and the species directory it came from.
//
// Example:
//   file_name: "data/BC/BC_01/BC_01_D05.png"
//   day:       5
//   species:   Species::Bc

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two plant species in the dataset.
/// Each species lives in its own top-level directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Bc,
    Lt,
}

impl Species {
    /// Both species, in table order (BC rows come first).
    pub const ALL: [Species; 2] = [Species::Bc, Species::Lt];

    /// Directory name under the data root, e.g. `BC`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Species::Bc => "BC",
            Species::Lt => "LT",
        }
    }

    /// Lowercase label used in CSV tables, e.g. `bc`
    pub fn label(&self) -> &'static str {
        match self {
            Species::Bc => "bc",
            Species::Lt => "lt",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dated image on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path to the image, as discovered by the scanner
    pub file_name: String,

    /// Day number parsed from the last two digits of the file stem
    pub day: u32,

    /// Which species directory the image was found under
    pub species: Species,
}

impl ImageRecord {
    pub fn new(file_name: impl Into<String>, day: u32, species: Species) -> Self {
        Self {
            file_name: file_name.into(),
            day,
            species,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_species_names() {
        assert_eq!(Species::Bc.dir_name(), "BC");
        assert_eq!(Species::Lt.dir_name(), "LT");
        assert_eq!(Species::Lt.label(), "lt");
        assert_eq!(Species::Bc.to_string(), "bc");
    }

    #[test]
    fn test_species_serialises_lowercase() {
        let json = serde_json::to_string(&Species::Lt).unwrap();
        assert_eq!(json, "\"lt\"");
        let back: Species = serde_json::from_str("\"bc\"").unwrap();
        assert_eq!(back, Species::Bc);
    }
}
