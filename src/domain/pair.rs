// ============================================================
// Layer 3 — Pair Domain Types
// ============================================================
// A training pair links two images of the same species:
//   - the "before" image has the smaller day number
//   - the "after" image has the larger day number
//   - time_delta is the number of days between them
//
// The model is asked to regress time_delta from the two pixels
// alone, so the pair is the unit of training and inference.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::image_record::{ImageRecord, Species};

/// A (before, after, day-delta) training triple.
///
/// Invariant: `time_delta == after.day - before.day`, never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    pub before_file_path: String,
    pub after_file_path:  String,
    pub time_delta:       u32,
    pub species:          Species,
}

impl ImagePair {
    /// Order two records by day and build the pair.
    /// On equal days `first` fills both sides and the delta is zero.
    pub fn from_records(first: &ImageRecord, second: &ImageRecord, species: Species) -> Self {
        let (before, after) = match second.day.cmp(&first.day) {
            Ordering::Less    => (second, first),
            Ordering::Equal   => (first, first),
            Ordering::Greater => (first, second),
        };

        Self {
            before_file_path: before.file_name.clone(),
            after_file_path:  after.file_name.clone(),
            time_delta:       after.day - before.day,
            species,
        }
    }
}

/// One row of the test table with both image paths resolved on disk.
/// No label; that is what gets predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPair {
    /// Row identifier copied verbatim into the submission
    pub idx:              String,
    pub before_file_path: String,
    pub after_file_path:  String,
}
