//! CSV transition-matrix loader.
//!
//! # CSV format
//!
//! One row per non-zero entry; absent entries are zero.  `bucket` is a
//! bucket index or `*` for every bucket of the week.
//!
//! ```csv
//! age_class,bucket,from,to,probability
//! adult,*,house,house,0.9
//! adult,*,house,work,0.1
//! adult,*,work,work,1.0
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ep_core::{AgeClassId, Labels};

use crate::{BehaviorError, BehaviorResult, TransitionMatrices, TransitionMatricesBuilder};

#[derive(Deserialize)]
struct EntryRecord {
    age_class:   String,
    bucket:      String,
    from:        String,
    to:          String,
    probability: f64,
}

/// Load and validate matrices from a CSV file.
pub fn load_matrices_csv(
    path: &Path,
    activities: &Labels,
    age_classes: &Labels,
    bucket_secs: u32,
) -> BehaviorResult<TransitionMatrices> {
    let file = std::fs::File::open(path)?;
    load_matrices_reader(file, activities, age_classes, bucket_secs)
}

/// Like [`load_matrices_csv`] but accepts any `Read` source.
pub fn load_matrices_reader<R: Read>(
    reader: R,
    activities: &Labels,
    age_classes: &Labels,
    bucket_secs: u32,
) -> BehaviorResult<TransitionMatrices> {
    let mut builder = TransitionMatricesBuilder::new(activities.len(), age_classes.len(), bucket_secs)?;
    let mut csv_reader = csv::Reader::from_reader(reader);

    for result in csv_reader.deserialize::<EntryRecord>() {
        let row = result.map_err(|e| BehaviorError::Parse(e.to_string()))?;
        let age_class = AgeClassId(age_classes.require(row.age_class.trim())?);
        let from = activities.require(row.from.trim())? as usize;
        let to = activities.require(row.to.trim())? as usize;

        let buckets = match row.bucket.trim() {
            "*" => 0..builder.bucket_count(),
            n => {
                let b = n.parse::<u32>().map_err(|_| {
                    BehaviorError::Parse(format!("invalid bucket {n:?}: expected an index or \"*\""))
                })?;
                b..b + 1
            }
        };
        for bucket in buckets {
            builder.entries_mut(age_class, bucket)?[from][to] = row.probability;
        }
    }

    builder.build()
}
