use thiserror::Error;

/// A defect in the catalog's own authoring, detected while the catalog is
/// being built.
///
/// Registration errors are fatal: the catalog never becomes usable, so an
/// ambiguous or duplicated signature can not surface later as a runtime
/// mis-dispatch.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("function '{0}' is registered more than once")]
    DuplicateName(String),
    #[error("function '{function}' declares two signatures with parameter kinds ({kinds})")]
    DuplicateSignature { function: String, kinds: String },
    #[error("function '{function}' uses {kind} as a parameter kind")]
    InvalidParameterKind {
        function: String,
        kind: spatial_fusion_model::ValueKind,
    },
    #[error("alias '{alias}' refers to unregistered function '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// A call site the catalog cannot serve.
///
/// Resolution errors belong to query compilation: the engine reports an
/// unresolved reference and no row is ever processed. They are never raised
/// per row.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("function '{0}' not found")]
    FunctionNotFound(String),
    #[error("no overload of function '{function}' matches argument kinds ({supplied})")]
    NoMatchingOverload { function: String, supplied: String },
}

/// A row-level failure raised by an invocation.
///
/// Everything the kernel or codec boundary rejects propagates through here and
/// aborts the enclosing query; nothing is converted into a non-error value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FunctionError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Kernel(#[from] spatial_fusion_kernel::KernelError),
    #[error(transparent)]
    Codec(#[from] spatial_fusion_encoding::CodecError),
    #[error(transparent)]
    Geometry(#[from] spatial_fusion_model::GeometryError),
    /// An argument reached a binding with the wrong kind. Dispatch prevents
    /// this for catalog-built descriptors; it guards hand-assembled calls.
    #[error("{function}: argument {index} is not of kind {expected}")]
    ArgumentKind {
        function: String,
        index: usize,
        expected: spatial_fusion_model::ValueKind,
    },
}
