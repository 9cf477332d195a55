use thiserror::Error;

pub type KernelResult<T> = Result<T, KernelError>;

/// A failure reported by the geometry kernel or one of its adapter shims.
///
/// Kernel errors are row-level: they abort the enclosing invocation and the
/// query that issued it, unless the caller asked for relaxed semantics on the
/// specific operation (see the geometric-median and transform adapters).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// The input geometry is degenerate or of an unexpected type for the
    /// operation.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// The operation is not defined for this combination of geometry types.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// A coordinate reference system could not be resolved.
    #[error("unknown coordinate reference system '{0}'")]
    UnknownCrs(String),
    /// The transform kernel rejected a coordinate.
    #[error("coordinate transform failed: {0}")]
    Transform(String),
    /// An iterative algorithm did not converge and the caller requested
    /// hard-failure semantics.
    #[error("failed to converge within {max_iter} iteration(s) at tolerance {tolerance}")]
    NotConverged { tolerance: f64, max_iter: i32 },
    /// A numeric argument is outside its documented domain.
    #[error("{arg} must be within [{min}, {max}], got {value}")]
    ArgumentOutOfRange {
        arg: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error(transparent)]
    Geometry(#[from] spatial_fusion_model::GeometryError),
}

impl KernelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        KernelError::InvalidGeometry(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        KernelError::Unsupported(msg.into())
    }
}
