//! Logistic activation with a steepness constant.
//!
//! Every unit in the network computes a weighted sum `s` of the previous layer
//! (bias unit included) and emits `sigmoid(beta * s)`. The steepness `beta`
//! also scales the derivative used in backprop:
//!
//! `d/ds sigmoid(beta * s) = beta * y * (1 - y)`
//!
//! As in the forward pass we only keep post-activation outputs `y`, so the
//! derivative is always expressed in terms of `y`.

use crate::{Error, Result};

/// Default sigmoid steepness.
pub const DEFAULT_BETA: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sigmoid {
    beta: f64,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self { beta: DEFAULT_BETA }
    }
}

impl Sigmoid {
    pub fn new(beta: f64) -> Result<Self> {
        if !(beta.is_finite() && beta > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "sigmoid steepness must be finite and > 0, got {beta}"
            )));
        }
        Ok(Self { beta })
    }

    #[inline]
    pub fn beta(self) -> f64 {
        self.beta
    }

    /// `1 / (1 + exp(-beta * sum))`.
    #[inline]
    pub fn forward(self, sum: f64) -> f64 {
        1.0 / (1.0 + (-self.beta * sum).exp())
    }

    /// Derivative w.r.t. the weighted sum, from the cached output `y`.
    #[inline]
    pub fn grad_from_output(self, y: f64) -> f64 {
        self.beta * (1.0 - y) * y
    }
}
