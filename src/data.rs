//! Contiguous dataset helpers.
//!
//! Each sample is a fixed-length row: `input_dim` features followed by
//! `target_dim` target values. Rows are stored contiguously (row-major) and
//! split on access.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// A supervised dataset: inputs (X) and targets (Y) packed in one row each.
///
/// Stored as one contiguous buffer with row-major layout:
/// - `samples.len() == len * (input_dim + target_dim)`
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    samples: Vec<f64>,
    len: usize,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from a flat buffer of rows of `input_dim + target_dim` values.
    pub fn from_flat(samples: Vec<f64>, input_dim: usize, target_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(Error::InvalidArgument("input_dim must be > 0".to_owned()));
        }
        if target_dim == 0 {
            return Err(Error::InvalidArgument("target_dim must be > 0".to_owned()));
        }

        let row_len = input_dim + target_dim;
        if !samples.len().is_multiple_of(row_len) {
            return Err(Error::InvalidArgument(format!(
                "samples length {} is not divisible by row length {row_len}",
                samples.len()
            )));
        }

        Ok(Self {
            len: samples.len() / row_len,
            samples,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows; each row is split after `input_dim` values.
    ///
    /// This is a convenience constructor (it copies into contiguous storage).
    pub fn from_samples(rows: &[Vec<f64>], input_dim: usize) -> Result<Self> {
        let row_len = rows.first().map(|r| r.len()).unwrap_or(0);
        if row_len <= input_dim {
            return Err(Error::InvalidArgument(format!(
                "rows of len {row_len} leave no target values after {input_dim} inputs"
            )));
        }

        let mut flat = Vec::with_capacity(rows.len() * row_len);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != row_len {
                return Err(Error::InvalidArgument(format!(
                    "sample row {i} has len {}, expected {row_len}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }

        Self::from_flat(flat, input_dim, row_len - input_dim)
    }

    /// Build a dataset from separate input and target rows.
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidArgument(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        let input_dim = inputs.first().map(|r| r.len()).unwrap_or(0);
        let rows: Vec<Vec<f64>> = inputs
            .iter()
            .zip(targets)
            .map(|(x, t)| x.iter().chain(t).copied().collect())
            .collect();
        for (i, x) in inputs.iter().enumerate() {
            if x.len() != input_dim {
                return Err(Error::InvalidArgument(format!(
                    "input row {i} has len {}, expected {input_dim}",
                    x.len()
                )));
            }
        }
        Self::from_samples(&rows, input_dim)
    }

    /// Parse whitespace-delimited rows; blank lines and `#` comments are skipped.
    pub fn parse(text: &str, input_dim: usize) -> Result<Self> {
        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<f64>().map_err(|e| {
                        Error::InvalidArgument(format!(
                            "line {}: cannot parse {tok:?} as a number: {e}",
                            lineno + 1
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(Error::InvalidArgument("dataset has no rows".to_owned()));
        }
        Self::from_samples(&rows, input_dim)
    }

    /// Read a whitespace-delimited dataset file.
    ///
    /// A missing file is reported as `Error::MissingResource`.
    pub fn load<P: AsRef<Path>>(path: P, input_dim: usize) -> Result<Self> {
        let p = path.as_ref();
        let text = fs::read_to_string(p).map_err(|e| Error::from_io(p, e))?;
        Self::parse(&text, input_dim)
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    /// Returns true if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    /// Returns the per-sample input dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    /// Returns the per-sample target dimension.
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    fn row(&self, idx: usize) -> &[f64] {
        let row_len = self.input_dim + self.target_dim;
        let start = idx * row_len;
        &self.samples[start..start + row_len]
    }

    #[inline]
    /// Returns the `idx`-th input segment (shape: `(input_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f64] {
        &self.row(idx)[..self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target segment (shape: `(target_dim,)`).
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f64] {
        &self.row(idx)[self.input_dim..]
    }
}
