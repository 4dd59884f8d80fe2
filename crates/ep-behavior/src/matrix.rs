//! Row-stochastic activity transition matrices.
//!
//! # Layout
//!
//! One square matrix over the activity set per (age class, time bucket).
//! The week is cut into `bucket_count = SECS_PER_WEEK / bucket_secs` equal
//! buckets counted from Monday 00:00, so the bucket for a tick is
//!
//!   bucket = (seconds_through_week / bucket_secs) mod bucket_count
//!
//! Matrices are stored flat, `age_class * bucket_count + bucket`, each row
//! carrying a prebuilt `WeightedIndex` so sampling is O(log n).

use rand::distributions::{Distribution, WeightedIndex};

use ep_core::time::SECS_PER_WEEK;
use ep_core::{ActivityId, AgeClassId, SimRng};

use crate::{BehaviorError, BehaviorResult};

/// Tolerance on row sums.
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

// ── TransitionMatrix ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Row {
    probs: Vec<f64>,
    dist:  WeightedIndex<f64>,
}

/// A validated square row-stochastic matrix.
#[derive(Clone, Debug)]
pub struct TransitionMatrix {
    rows: Vec<Row>,
}

impl TransitionMatrix {
    /// Probability of moving `from` → `to`.
    pub fn probability(&self, from: ActivityId, to: ActivityId) -> f64 {
        self.rows
            .get(from.index())
            .and_then(|r| r.probs.get(to.index()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    fn sample(&self, from: ActivityId, rng: &mut SimRng) -> Option<ActivityId> {
        let row = self.rows.get(from.index())?;
        Some(ActivityId(row.dist.sample(rng.inner()) as u16))
    }
}

// ── TransitionMatrices ────────────────────────────────────────────────────────

/// The complete set of matrices for a run.
#[derive(Clone, Debug)]
pub struct TransitionMatrices {
    activities:   usize,
    age_classes:  usize,
    bucket_secs:  u32,
    bucket_count: u32,
    matrices:     Vec<TransitionMatrix>,
}

impl TransitionMatrices {
    pub fn activity_count(&self) -> usize {
        self.activities
    }

    pub fn age_class_count(&self) -> usize {
        self.age_classes
    }

    pub fn bucket_secs(&self) -> u32 {
        self.bucket_secs
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Time bucket for a position in the week.
    #[inline]
    pub fn bucket_for(&self, seconds_through_week: u32) -> u32 {
        (seconds_through_week / self.bucket_secs) % self.bucket_count
    }

    pub fn matrix(&self, age_class: AgeClassId, bucket: u32) -> Option<&TransitionMatrix> {
        if age_class.index() >= self.age_classes || bucket >= self.bucket_count {
            return None;
        }
        self.matrices.get(age_class.index() * self.bucket_count as usize + bucket as usize)
    }

    /// Draw the next activity.  `None` only for out-of-range inputs.
    pub fn sample_next(
        &self,
        age_class: AgeClassId,
        bucket: u32,
        current: ActivityId,
        rng: &mut SimRng,
    ) -> Option<ActivityId> {
        self.matrix(age_class, bucket)?.sample(current, rng)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Collects matrices and validates the full set on [`build`](Self::build).
pub struct TransitionMatricesBuilder {
    activities:   usize,
    age_classes:  usize,
    bucket_secs:  u32,
    bucket_count: u32,
    pending:      Vec<Option<Vec<Vec<f64>>>>,
}

impl TransitionMatricesBuilder {
    /// # Errors
    ///
    /// [`BehaviorError::Matrix`] if `bucket_secs` is zero or does not divide
    /// one week, or either dimension is empty.
    pub fn new(activities: usize, age_classes: usize, bucket_secs: u32) -> BehaviorResult<Self> {
        if bucket_secs == 0 || SECS_PER_WEEK % bucket_secs as i64 != 0 {
            return Err(BehaviorError::Matrix(format!(
                "bucket length {bucket_secs}s does not divide one week"
            )));
        }
        if activities == 0 || age_classes == 0 {
            return Err(BehaviorError::Matrix("no activities or no age classes".into()));
        }
        let bucket_count = (SECS_PER_WEEK / bucket_secs as i64) as u32;
        Ok(Self {
            activities,
            age_classes,
            bucket_secs,
            bucket_count,
            pending: vec![None; age_classes * bucket_count as usize],
        })
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Set the matrix for one (age class, bucket).  Replaces any earlier one.
    pub fn set(&mut self, age_class: AgeClassId, bucket: u32, rows: Vec<Vec<f64>>) -> BehaviorResult<&mut Self> {
        let slot = self.slot(age_class, bucket)?;
        self.pending[slot] = Some(rows);
        Ok(self)
    }

    /// Set the same matrix for every bucket of one age class.
    pub fn set_all_buckets(&mut self, age_class: AgeClassId, rows: Vec<Vec<f64>>) -> BehaviorResult<&mut Self> {
        for bucket in 0..self.bucket_count {
            self.set(age_class, bucket, rows.clone())?;
        }
        Ok(self)
    }

    /// Mutable access to one matrix, created as all zeros if absent.  Used
    /// by loaders that fill entries one at a time.
    pub fn entries_mut(&mut self, age_class: AgeClassId, bucket: u32) -> BehaviorResult<&mut Vec<Vec<f64>>> {
        let slot = self.slot(age_class, bucket)?;
        let n = self.activities;
        Ok(self.pending[slot].get_or_insert_with(|| vec![vec![0.0; n]; n]))
    }

    fn slot(&self, age_class: AgeClassId, bucket: u32) -> BehaviorResult<usize> {
        if age_class.index() >= self.age_classes {
            return Err(BehaviorError::Matrix(format!("unknown age class {age_class}")));
        }
        if bucket >= self.bucket_count {
            return Err(BehaviorError::Matrix(format!(
                "bucket {bucket} out of range (0..{})",
                self.bucket_count
            )));
        }
        Ok(age_class.index() * self.bucket_count as usize + bucket as usize)
    }

    /// Validate every matrix and freeze the set.
    ///
    /// # Errors
    ///
    /// A missing (age class, bucket) matrix, a non-square matrix, a negative
    /// or non-finite entry, a row not summing to 1, or an all-zero row.
    pub fn build(self) -> BehaviorResult<TransitionMatrices> {
        let n = self.activities;
        let mut matrices = Vec::with_capacity(self.pending.len());

        for (slot, rows) in self.pending.into_iter().enumerate() {
            let age_class = (slot / self.bucket_count as usize) as u16;
            let bucket = (slot % self.bucket_count as usize) as u32;
            let rows = rows.ok_or_else(|| {
                BehaviorError::Matrix(format!("no matrix for age class {age_class}, bucket {bucket}"))
            })?;
            if rows.len() != n || rows.iter().any(|r| r.len() != n) {
                return Err(BehaviorError::Matrix(format!(
                    "matrix for age class {age_class}, bucket {bucket} is not {n}x{n}"
                )));
            }

            let mut built = Vec::with_capacity(n);
            for (from, probs) in rows.into_iter().enumerate() {
                if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(BehaviorError::Matrix(format!(
                        "age class {age_class}, bucket {bucket}, row {from}: entries must be finite and >= 0"
                    )));
                }
                let sum: f64 = probs.iter().sum();
                if sum == 0.0 {
                    return Err(BehaviorError::ZeroRow { age_class, bucket, from: from as u16 });
                }
                if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                    return Err(BehaviorError::Matrix(format!(
                        "age class {age_class}, bucket {bucket}, row {from} sums to {sum}"
                    )));
                }
                let dist = WeightedIndex::new(&probs).map_err(|e| BehaviorError::Matrix(e.to_string()))?;
                built.push(Row { probs, dist });
            }
            matrices.push(TransitionMatrix { rows: built });
        }

        Ok(TransitionMatrices {
            activities:   n,
            age_classes:  self.age_classes,
            bucket_secs:  self.bucket_secs,
            bucket_count: self.bucket_count,
            matrices,
        })
    }
}
