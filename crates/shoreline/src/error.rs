//! Error taxonomy for the analysis core.
//!
//! Every fallible call returns to its immediate caller; nothing in the core
//! retries or recovers, so the first error aborts the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unreadable or unparseable input document.
    #[error("input error: {0}")]
    Input(String),

    /// Record has the wrong shape for the requested operation, or a geometry
    /// kind the adapter cannot convert.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("geometry operation failed: {0}")]
    GeometryOperationFailed(String),

    /// Polygonization or ring/face association failed; no partial result.
    #[error("partition failed: {0}")]
    PartitionFailed(String),

    /// The face forest is malformed (a parent walk does not reach the terminal face).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    pub(crate) fn input(reason: impl Into<String>) -> Self {
        Self::Input(reason.into())
    }

    pub(crate) fn type_mismatch(reason: impl Into<String>) -> Self {
        Self::TypeMismatch(reason.into())
    }

    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::GeometryOperationFailed(reason.into())
    }

    pub(crate) fn partition(reason: impl Into<String>) -> Self {
        Self::PartitionFailed(reason.into())
    }

    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation(reason.into())
    }
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::Input(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
