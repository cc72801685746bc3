use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, NetShape, Result};

/// Lower bound (inclusive) of initial weights.
pub const INIT_LOW: f64 = -0.5;
/// Upper bound (exclusive) of initial weights.
pub const INIT_HIGH: f64 = 0.5;

/// Dense row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[inline]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Fill a `rows x cols` matrix with values drawn uniformly from `[low, high)`.
    pub fn random_uniform<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Self {
        let data = (0..rows * cols).map(|_| rng.gen_range(low..high)).collect();
        Self { rows, cols, data }
    }

    /// Build from a flat row-major buffer.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| Error::InvalidArgument("matrix shape overflow".to_owned()))?;
        if data.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "matrix data length {} does not match rows * cols ({rows} * {cols})",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from per-row vectors. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidArgument(format!(
                    "matrix row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// `out[c] = sum_r self[r, c] * v[r]`, i.e. `v^T * M`.
    ///
    /// Shape contract:
    /// - `v.len() == self.rows`
    /// - `out.len() == self.cols`
    #[inline]
    pub(crate) fn vec_mul_into(&self, v: &[f64], out: &mut [f64]) {
        debug_assert_eq!(v.len(), self.rows);
        debug_assert_eq!(out.len(), self.cols);

        out.fill(0.0);
        for (r, &vr) in v.iter().enumerate() {
            let row = self.row(r);
            for (o, &w) in out.iter_mut().zip(row) {
                *o += w * vr;
            }
        }
    }

    /// Rank-one update `self[r, c] += scale * a[r] * b[c]`.
    #[inline]
    pub(crate) fn add_outer(&mut self, scale: f64, a: &[f64], b: &[f64]) {
        debug_assert_eq!(a.len(), self.rows);
        debug_assert_eq!(b.len(), self.cols);

        let cols = self.cols;
        for (r, &ar) in a.iter().enumerate() {
            let row = &mut self.data[r * cols..(r + 1) * cols];
            for (w, &bc) in row.iter_mut().zip(b) {
                *w += scale * ar * bc;
            }
        }
    }
}

/// Weights of a three-layer network.
///
/// - `w1`: `(inputs + 1, hidden)`; the last row holds the hidden-layer biases.
/// - `w2`: `(hidden + 1, outputs)`; the last row holds the output-layer biases.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkWeights {
    pub(crate) w1: Matrix,
    pub(crate) w2: Matrix,
}

impl NetworkWeights {
    pub fn new_with_seed(shape: &NetShape, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(shape, &mut rng)
    }

    /// Draw every weight uniformly from `[-0.5, 0.5)`.
    pub fn new_with_rng<R: Rng + ?Sized>(shape: &NetShape, rng: &mut R) -> Result<Self> {
        shape.validate()?;
        let (r1, c1) = shape.w1_dims();
        let (r2, c2) = shape.w2_dims();
        Ok(Self {
            w1: Matrix::random_uniform(r1, c1, INIT_LOW, INIT_HIGH, rng),
            w2: Matrix::random_uniform(r2, c2, INIT_LOW, INIT_HIGH, rng),
        })
    }

    /// Build from explicit matrices, checking them against `shape`.
    pub fn from_parts(shape: &NetShape, w1: Matrix, w2: Matrix) -> Result<Self> {
        let weights = Self { w1, w2 };
        weights.check_shape(shape)?;
        if weights
            .w1
            .as_slice()
            .iter()
            .chain(weights.w2.as_slice())
            .any(|v| !v.is_finite())
        {
            return Err(Error::InvalidArgument(
                "weights must contain only finite values".to_owned(),
            ));
        }
        Ok(weights)
    }

    #[inline]
    pub fn w1(&self) -> &Matrix {
        &self.w1
    }

    #[inline]
    pub fn w2(&self) -> &Matrix {
        &self.w2
    }

    #[inline]
    pub fn w1_mut(&mut self) -> &mut Matrix {
        &mut self.w1
    }

    #[inline]
    pub fn w2_mut(&mut self) -> &mut Matrix {
        &mut self.w2
    }

    /// Verify both matrices have the dimensions `shape` requires.
    pub fn check_shape(&self, shape: &NetShape) -> Result<()> {
        shape.validate()?;
        if self.w1.dims() != shape.w1_dims() {
            return Err(Error::InvalidArgument(format!(
                "W1 has shape {:?}, expected {:?}",
                self.w1.dims(),
                shape.w1_dims()
            )));
        }
        if self.w2.dims() != shape.w2_dims() {
            return Err(Error::InvalidArgument(format!(
                "W2 has shape {:?}, expected {:?}",
                self.w2.dims(),
                shape.w2_dims()
            )));
        }
        Ok(())
    }
}
