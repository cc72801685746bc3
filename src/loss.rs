//! Training error.
//!
//! The network is trained against the half sum-of-squares error
//!
//! `E = 0.5 * sum_i (t_i - y_i)^2`
//!
//! whose derivative w.r.t. `y_i` is `-(t_i - y_i)`; the factor `0.5` cancels
//! the square. The output deltas in `Network::backward_into` are built on it.

use crate::{Error, Result};

/// Half sum-of-squares error between a prediction and its target.
///
/// Always `>= 0`; exactly `0` only when every output equals its target.
#[inline]
pub fn squared_error(pred: &[f64], target: &[f64]) -> Result<f64> {
    if pred.len() != target.len() {
        return Err(Error::InvalidArgument(format!(
            "pred len {} does not match target len {}",
            pred.len(),
            target.len()
        )));
    }

    let sum_sq: f64 = pred
        .iter()
        .zip(target)
        .map(|(&y, &t)| {
            let diff = t - y;
            diff * diff
        })
        .sum();
    Ok(sum_sq / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_error_basic_values() {
        assert_eq!(squared_error(&[0.5, 1.0], &[0.5, 1.0]).unwrap(), 0.0);
        assert_eq!(squared_error(&[0.0, 1.0], &[1.0, 0.0]).unwrap(), 1.0);
        assert_eq!(squared_error(&[0.25], &[0.75]).unwrap(), 0.125);
        assert_eq!(squared_error(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn squared_error_rejects_length_mismatch() {
        assert!(squared_error(&[0.0], &[0.0, 1.0]).is_err());
    }
}
