//! Flat array persistence.
//!
//! Trained parameters are dumped as raw numeric arrays: a `shape` plus the
//! row-major `data`. There is no format version; the only check on load is
//! that the data length matches the shape and that every value is finite.
//!
//! - network weights: `{"w1": <blob>, "w2": <blob>}`
//! - Q-table: a single `rows x cols x actions` blob

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Matrix, NetShape, NetworkWeights, Result};

/// A dense numeric array with its raw shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayBlob {
    pub shape: Vec<usize>,
    /// Row-major values.
    pub data: Vec<f64>,
}

impl ArrayBlob {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let blob = Self { shape, data };
        blob.validate()?;
        Ok(blob)
    }

    pub fn validate(&self) -> Result<()> {
        let expected = self
            .shape
            .iter()
            .try_fold(1_usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::Format("array shape overflow".to_owned()))?;
        if self.data.len() != expected {
            return Err(Error::Format(format!(
                "array data length {} does not match shape {:?}",
                self.data.len(),
                self.shape
            )));
        }
        if self.data.iter().any(|v| !v.is_finite()) {
            return Err(Error::Format(
                "array must contain only finite values".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn into_matrix(self) -> Result<Matrix> {
        self.validate()?;
        match self.shape[..] {
            [rows, cols] => Matrix::from_flat(rows, cols, self.data),
            _ => Err(Error::Format(format!(
                "expected a 2-d array, got shape {:?}",
                self.shape
            ))),
        }
    }
}

impl From<&Matrix> for ArrayBlob {
    fn from(m: &Matrix) -> Self {
        Self {
            shape: vec![m.rows(), m.cols()],
            data: m.as_slice().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedWeights {
    pub w1: ArrayBlob,
    pub w2: ArrayBlob,
}

impl From<&NetworkWeights> for SerializedWeights {
    fn from(w: &NetworkWeights) -> Self {
        Self {
            w1: ArrayBlob::from(w.w1()),
            w2: ArrayBlob::from(w.w2()),
        }
    }
}

impl SerializedWeights {
    /// Rebuild weights, checking them against the expected network shape.
    pub fn into_weights(self, shape: &NetShape) -> Result<NetworkWeights> {
        let w1 = self.w1.into_matrix()?;
        let w2 = self.w2.into_matrix()?;
        NetworkWeights::from_parts(shape, w1, w2)
    }
}

/// Serialize `value` as JSON into `path`.
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let p = path.as_ref();
    let s = serde_json::to_string(value)
        .map_err(|e| Error::Format(format!("failed to serialize {}: {e}", p.display())))?;
    fs::write(p, s).map_err(|e| Error::from_io(p, e))
}

/// Parse JSON from `path`.
pub fn load_json<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T> {
    let p = path.as_ref();
    let s = fs::read_to_string(p).map_err(|e| Error::from_io(p, e))?;
    serde_json::from_str(&s)
        .map_err(|e| Error::Format(format!("failed to parse {}: {e}", p.display())))
}

impl NetworkWeights {
    /// Write both weight matrices to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(&SerializedWeights::from(self), path)
    }

    /// Read weights written by `save`, validating them against `shape`.
    pub fn load<P: AsRef<Path>>(path: P, shape: &NetShape) -> Result<Self> {
        let ser: SerializedWeights = load_json(path)?;
        ser.into_weights(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_validates_length_against_shape() {
        assert!(ArrayBlob::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(ArrayBlob::new(vec![11, 19, 4], vec![0.0; 11 * 19 * 4]).is_ok());
        assert!(ArrayBlob::new(vec![2, 3], vec![0.0; 5]).is_err());
        assert!(ArrayBlob::new(vec![1], vec![f64::INFINITY]).is_err());

        let cube = ArrayBlob::new(vec![1, 1, 1], vec![0.0]).unwrap();
        assert!(cube.into_matrix().is_err());
    }

    #[test]
    fn weights_json_shape_is_stable() {
        let shape = NetShape::new(1, 1, 1).unwrap();
        let w1 = Matrix::from_rows(&[vec![0.5], vec![-0.25]]).unwrap();
        let w2 = Matrix::from_rows(&[vec![1.0], vec![0.0]]).unwrap();
        let weights = NetworkWeights::from_parts(&shape, w1, w2).unwrap();

        let json = serde_json::to_string(&SerializedWeights::from(&weights)).unwrap();
        assert_eq!(
            json,
            r#"{"w1":{"shape":[2,1],"data":[0.5,-0.25]},"w2":{"shape":[2,1],"data":[1.0,0.0]}}"#
        );

        let back: SerializedWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_weights(&shape).unwrap(), weights);
    }

    #[test]
    fn loading_checks_network_shape() {
        let shape = NetShape::new(2, 3, 1).unwrap();
        let weights = NetworkWeights::new_with_seed(&shape, 0).unwrap();
        let ser = SerializedWeights::from(&weights);

        let other = NetShape::new(2, 4, 1).unwrap();
        assert!(ser.clone().into_weights(&other).is_err());
        assert_eq!(ser.into_weights(&shape).unwrap(), weights);
    }

    #[test]
    fn load_missing_file_is_missing_resource() {
        let shape = NetShape::new(2, 3, 1).unwrap();
        let err = NetworkWeights::load("no/such/weights.json", &shape).unwrap_err();
        assert!(matches!(err, Error::MissingResource { .. }));
    }
}
