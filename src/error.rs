use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed shapes, counts, indices or hyper-parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An input file the caller asked for does not exist.
    #[error("missing resource {}: {source}", path.display())]
    MissingResource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persisted array blob could not be decoded.
    #[error("invalid format: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify an i/o failure on `path`: `NotFound` becomes `MissingResource`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Error::MissingResource { path, source }
        } else {
            Error::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_missing_resource() {
        let err = Error::from_io(
            "data.dat",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(matches!(err, Error::MissingResource { .. }));
        assert!(format!("{err}").contains("data.dat"));

        let err = Error::from_io(
            "data.dat",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, Error::Io { .. }));
    }
}
