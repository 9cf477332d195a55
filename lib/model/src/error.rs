use thiserror::Error;

/// An error raised while constructing or inspecting a [`SpatialGeometry`](crate::SpatialGeometry).
///
/// These are model-level defects (inconsistent metadata, out-of-range indices),
/// not kernel failures. They surface to the engine as row-level errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeometryError {
    /// The declared coordinate dimensionality does not match the attached
    /// ordinate tables.
    #[error("coordinate dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// A structural accessor was asked for a component that does not exist.
    #[error("index {index} out of range for {what} with {len} element(s)")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        len: usize,
    },
    /// The operation requires a different geometry type.
    #[error("expected {expected}, got {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },
}

impl GeometryError {
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        GeometryError::DimensionMismatch(msg.into())
    }
}
