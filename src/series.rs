//! Numeric series handed to an external plotting tool.
//!
//! Files are plain text, one point per line, values separated by a single
//! space, so they load directly into gnuplot or `numpy.loadtxt`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Render `(epoch, error)` pairs as `epoch error` lines.
pub fn format_error_series(points: &[(usize, f64)]) -> String {
    let mut out = String::with_capacity(points.len() * 24);
    for (epoch, error) in points {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{epoch} {error}");
    }
    out
}

/// Render `(row, col)` trajectory points as `row col` lines.
pub fn format_trajectory(points: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    for (row, col) in points {
        let _ = writeln!(out, "{row} {col}");
    }
    out
}

pub fn write_error_series<P: AsRef<Path>>(path: P, points: &[(usize, f64)]) -> Result<()> {
    let p = path.as_ref();
    fs::write(p, format_error_series(points)).map_err(|e| Error::from_io(p, e))
}

pub fn write_trajectory<P: AsRef<Path>>(path: P, points: &[(usize, usize)]) -> Result<()> {
    let p = path.as_ref();
    fs::write(p, format_trajectory(points)).map_err(|e| Error::from_io(p, e))
}

/// Average several equally long series position by position.
pub fn average_series(series: &[Vec<f64>]) -> Result<Vec<f64>> {
    let Some(first) = series.first() else {
        return Err(Error::InvalidArgument(
            "cannot average an empty set of series".to_owned(),
        ));
    };
    let len = first.len();
    let mut sum = vec![0.0; len];
    for (i, s) in series.iter().enumerate() {
        if s.len() != len {
            return Err(Error::InvalidArgument(format!(
                "series {i} has len {}, expected {len}",
                s.len()
            )));
        }
        for (acc, &v) in sum.iter_mut().zip(s) {
            *acc += v;
        }
    }
    let n = series.len() as f64;
    Ok(sum.into_iter().map(|v| v / n).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_one_point_per_line() {
        assert_eq!(format_error_series(&[(0, 0.5), (1, 0.25)]), "0 0.5\n1 0.25\n");
        assert_eq!(format_trajectory(&[(10, 0), (9, 0)]), "10 0\n9 0\n");
        assert_eq!(format_trajectory(&[]), "");
    }

    #[test]
    fn averages_position_by_position() {
        let avg = average_series(&[vec![1.0, 2.0], vec![3.0, 6.0]]).unwrap();
        assert_eq!(avg, vec![2.0, 4.0]);

        assert!(average_series(&[]).is_err());
        assert!(average_series(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }
}
