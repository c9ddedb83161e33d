//! Count sketch frequency estimator
//!
//! The count sketch estimates item frequencies in a data stream from a
//! fixed-size table of signed counters. Sign hashes let colliding keys
//! cancel each other out instead of piling up, and the per-row observations
//! are reconciled with a median.

use crate::hash::{ByteKeyHasher, LinearCoeffs};
use crate::math;
use crate::traits::{FrequencySketch, MergeError, Sketch, UpdateError};

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

/// Count sketch for frequency estimation over signed counters
///
/// Estimates come with the guarantee that, with probability
/// `1 - 2^-depth`, the error of a point query stays within a small additive
/// band controlled by `width`. Unlike count-min, estimates are unbiased and
/// may come out negative for rare or absent items; negative results are
/// noise, not a bug, and are never clamped.
///
/// # Key paths
///
/// Integer keys (`add_int`/`estimate_int`) are hashed by a per-row
/// pairwise-independent linear family derived from the construction seed.
/// Byte keys (`add`/`estimate`) and floats (`add_float`/`estimate_float`,
/// which stringify first) are hashed by a seed-independent double-hashing
/// scheme. The two families are unrelated: inserting `42` through the
/// integer path and querying `b"42"` through the byte path lands in
/// unrelated buckets. Pick one path per logical key.
///
/// # Example
///
/// ```
/// use streamfreq::frequency::CountSketch;
///
/// let mut cs = CountSketch::with_dimensions(2048, 5);
///
/// cs.add(b"apple", 5).unwrap();
/// cs.add(b"apple", 2).unwrap();
///
/// assert_eq!(cs.estimate(b"apple"), 7);
/// ```
#[derive(Clone, Debug)]
pub struct CountSketch {
    /// Width of each row
    pub(crate) width: usize,
    /// Number of rows (hash functions)
    pub(crate) depth: usize,
    /// Signed counter table
    pub(crate) table: Vec<Vec<i64>>,
    /// Linear hash coefficients for the integer key path
    pub(crate) coeffs: LinearCoeffs,
    /// Total weight of all accepted adds
    pub(crate) total_weight: u64,
    /// Advisory relative error, sqrt(2 / width)
    epsilon: f64,
    /// Advisory confidence, 1 - 2^-depth
    confidence: f64,
}

impl CountSketch {
    /// Create a new count sketch from target error parameters
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Target additive error as a fraction of total weight
    /// * `delta` - Probability of exceeding the error bound
    ///
    /// Dimensions are `width = ceil(2 / epsilon^2)` and
    /// `depth = ceil(ln(1 / delta))`.
    ///
    /// # Panics
    ///
    /// Panics if epsilon or delta are not in (0, 1)
    pub fn new(epsilon: f64, delta: f64) -> Self {
        assert!(epsilon > 0.0 && epsilon < 1.0, "epsilon must be in (0, 1)");
        assert!(delta > 0.0 && delta < 1.0, "delta must be in (0, 1)");

        Self::with_dimensions(super::width_for_error(epsilon), super::depth_for_failure(delta))
    }

    /// Create a count sketch with specific dimensions and seed 0
    pub fn with_dimensions(width: usize, depth: usize) -> Self {
        Self::with_seed(width, depth, 0)
    }

    /// Create a count sketch with specific dimensions and seed
    ///
    /// The seed determines the integer-path hash coefficients; sketches that
    /// will be merged must share it. Byte-key hashing does not depend on it.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `depth` is zero or exceeds `i32::MAX` (the wire
    /// format stores both as 32-bit fields).
    pub fn with_seed(width: usize, depth: usize, seed: u64) -> Self {
        assert!(width > 0, "width must be positive");
        assert!(depth > 0, "depth must be positive");
        assert!(width <= i32::MAX as usize, "width must fit in 32 bits");
        assert!(depth <= i32::MAX as usize, "depth must fit in 32 bits");

        Self {
            width,
            depth,
            table: vec![vec![0i64; width]; depth],
            coeffs: LinearCoeffs::generate(depth, seed),
            total_weight: 0,
            epsilon: math::sqrt(2.0 / width as f64),
            confidence: 1.0 - math::exp2(-(depth as f64)),
        }
    }

    /// Assemble a sketch from decoded or merged state.
    pub(crate) fn from_parts(
        width: usize,
        depth: usize,
        table: Vec<Vec<i64>>,
        coeffs: LinearCoeffs,
        total_weight: u64,
    ) -> Self {
        Self {
            width,
            depth,
            table,
            coeffs,
            total_weight,
            epsilon: if width == 0 {
                0.0
            } else {
                math::sqrt(2.0 / width as f64)
            },
            confidence: if depth == 0 {
                0.0
            } else {
                1.0 - math::exp2(-(depth as f64))
            },
        }
    }

    /// The zero-shaped sentinel produced by merging nothing.
    fn zero_shaped() -> Self {
        Self::from_parts(0, 0, Vec::new(), LinearCoeffs::generate(0, 0), 0)
    }

    /// Get the width of the sketch
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the depth of the sketch
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Get the total weight of all accepted adds
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Advisory relative error target, `sqrt(2 / width)`
    pub fn relative_error(&self) -> f64 {
        self.epsilon
    }

    /// Advisory confidence, `1 - 2^-depth`
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Advisory additive error band (epsilon * total_weight)
    pub fn error_bound(&self) -> u64 {
        (self.epsilon * self.total_weight as f64) as u64
    }

    /// Read one counter cell
    ///
    /// # Panics
    ///
    /// Panics if `row >= depth` or `col >= width`.
    pub fn cell(&self, row: usize, col: usize) -> i64 {
        self.table[row][col]
    }

    fn check_count(count: i64) -> Result<(), UpdateError> {
        if count < 0 {
            return Err(UpdateError::NegativeCount(count));
        }
        Ok(())
    }

    /// Add weight to a byte key
    ///
    /// Fails on a negative `count` and leaves the sketch untouched.
    pub fn add(&mut self, item: &[u8], count: i64) -> Result<(), UpdateError> {
        Self::check_count(count)?;
        self.add_bytes_weighted(item, count);
        Ok(())
    }

    /// Add weight to an integer key
    pub fn add_int(&mut self, item: i64, count: i64) -> Result<(), UpdateError> {
        Self::check_count(count)?;
        for row in 0..self.depth {
            let col = self.coeffs.bucket(row, item, self.width);
            let cell = &mut self.table[row][col];
            *cell = cell.saturating_add(count * self.coeffs.sign(row, item));
        }
        self.total_weight += count as u64;
        Ok(())
    }

    /// Add weight to a float key (canonically stringified)
    pub fn add_float(&mut self, item: f64, count: i64) -> Result<(), UpdateError> {
        let key = format!("{}", item);
        self.add(key.as_bytes(), count)
    }

    fn add_bytes_weighted(&mut self, item: &[u8], count: i64) {
        let hasher = ByteKeyHasher::new(item);
        for row in 0..self.depth {
            let col = hasher.bucket(row, self.width);
            let cell = &mut self.table[row][col];
            *cell = cell.saturating_add(count * hasher.sign(row, self.width));
        }
        self.total_weight += count as u64;
    }

    /// Estimate the frequency of a byte key
    ///
    /// # Panics
    ///
    /// Panics on a zero-shaped sketch (the result of merging nothing); a
    /// sketch with no rows has no estimate to give.
    pub fn estimate(&self, item: &[u8]) -> i64 {
        assert!(self.depth > 0, "estimate on a zero-shaped sketch");
        let hasher = ByteKeyHasher::new(item);
        let mut observations: Vec<i64> = (0..self.depth)
            .map(|row| {
                self.table[row][hasher.bucket(row, self.width)] * hasher.sign(row, self.width)
            })
            .collect();
        median(&mut observations)
    }

    /// Estimate the frequency of an integer key
    ///
    /// # Panics
    ///
    /// Panics on a zero-shaped sketch.
    pub fn estimate_int(&self, item: i64) -> i64 {
        assert!(self.depth > 0, "estimate on a zero-shaped sketch");
        let mut observations: Vec<i64> = (0..self.depth)
            .map(|row| {
                self.table[row][self.coeffs.bucket(row, item, self.width)]
                    * self.coeffs.sign(row, item)
            })
            .collect();
        median(&mut observations)
    }

    /// Estimate the frequency of a float key (canonically stringified)
    pub fn estimate_float(&self, item: f64) -> i64 {
        let key = format!("{}", item);
        self.estimate(key.as_bytes())
    }

    fn check_compatible(&self, other: &Self) -> Result<(), MergeError> {
        if self.width != other.width || self.depth != other.depth {
            return Err(MergeError::IncompatibleConfig {
                expected: format!("{}x{}", self.width, self.depth),
                found: format!("{}x{}", other.width, other.depth),
            });
        }
        if self.coeffs != other.coeffs {
            return Err(MergeError::IncompatibleConfig {
                expected: String::from("shared hash coefficients"),
                found: String::from("different hash coefficients"),
            });
        }
        Ok(())
    }

    fn accumulate(&mut self, other: &Self) {
        for (dst_row, src_row) in self.table.iter_mut().zip(other.table.iter()) {
            for (dst, src) in dst_row.iter_mut().zip(src_row.iter()) {
                *dst = dst.saturating_add(*src);
            }
        }
        self.total_weight += other.total_weight;
    }

    /// Combine sketches cell-wise, trusting the caller on compatibility
    ///
    /// Shape and coefficients are copied from the first element; every
    /// element's counters are then summed cell by cell. Inputs that do not
    /// share the first element's shape and seed are NOT detected and
    /// produce statistically meaningless sums; use [`try_merged`] to fail
    /// fast instead. An empty slice yields a zero-shaped sentinel
    /// (`depth == width == 0`) that supports everything except `estimate`.
    ///
    /// [`try_merged`]: CountSketch::try_merged
    pub fn merged(sketches: &[CountSketch]) -> CountSketch {
        let Some(first) = sketches.first() else {
            return Self::zero_shaped();
        };
        let mut result = first.clone();
        for sketch in &sketches[1..] {
            result.accumulate(sketch);
        }
        result
    }

    /// Combine sketches cell-wise, verifying compatibility first
    ///
    /// Every element must share the first element's dimensions and hash
    /// coefficients. Fails with [`MergeError::EmptyInput`] on an empty
    /// slice and [`MergeError::IncompatibleConfig`] on any mismatch.
    pub fn try_merged(sketches: &[CountSketch]) -> Result<CountSketch, MergeError> {
        let Some(first) = sketches.first() else {
            return Err(MergeError::EmptyInput);
        };
        for sketch in &sketches[1..] {
            first.check_compatible(sketch)?;
        }
        let mut result = first.clone();
        for sketch in &sketches[1..] {
            result.accumulate(sketch);
        }
        Ok(result)
    }
}

fn median(values: &mut [i64]) -> i64 {
    values.sort_unstable();
    let middle = values.len() / 2;
    if values.len() % 2 == 1 {
        values[middle]
    } else {
        // Truncating mean of the two central elements, widened to avoid wrap
        ((values[middle - 1] as i128 + values[middle] as i128) / 2) as i64
    }
}

impl Sketch for CountSketch {
    type Item = [u8];

    fn update(&mut self, item: &[u8]) {
        self.add_bytes_weighted(item, 1);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        self.check_compatible(other)?;
        self.accumulate(other);
        Ok(())
    }

    fn clear(&mut self) {
        for row in &mut self.table {
            row.fill(0);
        }
        self.total_weight = 0;
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>()
            + self.depth * self.width * core::mem::size_of::<i64>()
            + 4 * self.depth * core::mem::size_of::<i64>()
    }

    fn count(&self) -> u64 {
        self.total_weight
    }
}

impl FrequencySketch for CountSketch {
    fn estimate_frequency(&self, item: &[u8]) -> i64 {
        self.estimate(item)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CountSketch {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("CountSketch", 8)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("depth", &self.depth)?;
        state.serialize_field("table", &self.table)?;
        state.serialize_field("total_weight", &self.total_weight)?;
        state.serialize_field("index_a", &self.coeffs.index_a)?;
        state.serialize_field("index_b", &self.coeffs.index_b)?;
        state.serialize_field("sign_a", &self.coeffs.sign_a)?;
        state.serialize_field("sign_b", &self.coeffs.sign_b)?;
        state.end()
    }
}
