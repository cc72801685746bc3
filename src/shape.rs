//! Network shape descriptor.
//!
//! The unit counts of the three layers travel with the network and are
//! passed by reference into every operation that needs them.

use crate::{Error, Result};

/// Unit counts of a three-layer network, excluding bias units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetShape {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
}

impl NetShape {
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Result<Self> {
        let shape = Self {
            inputs,
            hidden,
            outputs,
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, count) in [
            ("inputs", self.inputs),
            ("hidden", self.hidden),
            ("outputs", self.outputs),
        ] {
            if count == 0 {
                return Err(Error::InvalidArgument(format!(
                    "{name} unit count must be > 0"
                )));
            }
        }
        Ok(())
    }

    /// Shape of `W1`: input units plus bias by hidden units.
    #[inline]
    pub fn w1_dims(&self) -> (usize, usize) {
        (self.inputs + 1, self.hidden)
    }

    /// Shape of `W2`: hidden units plus bias by output units.
    #[inline]
    pub fn w2_dims(&self) -> (usize, usize) {
        (self.hidden + 1, self.outputs)
    }

    /// Length of a dataset row: inputs followed by targets.
    #[inline]
    pub fn sample_len(&self) -> usize {
        self.inputs + self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_rejected() {
        assert!(NetShape::new(0, 3, 1).is_err());
        assert!(NetShape::new(2, 0, 1).is_err());
        assert!(NetShape::new(2, 3, 0).is_err());

        let shape = NetShape::new(2, 3, 1).unwrap();
        assert_eq!(shape.w1_dims(), (3, 3));
        assert_eq!(shape.w2_dims(), (4, 1));
        assert_eq!(shape.sample_len(), 3);
    }
}
