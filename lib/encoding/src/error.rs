use thiserror::Error;

/// An error raised at the codec boundary while moving a geometry between its
/// opaque in-memory form and an external representation.
///
/// Codec errors are row-level failures: they abort the enclosing invocation
/// and are never converted into a non-error value.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("invalid well-known text: {0}")]
    InvalidWkt(String),
    #[error("invalid well-known binary: {0}")]
    InvalidWkb(String),
    #[error("invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
    #[error("geohash encoding failed: {0}")]
    Geohash(String),
    #[error("{arg} must be within {min}..={max}, got {value}")]
    OutOfRange {
        arg: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error(transparent)]
    Geometry(#[from] spatial_fusion_model::GeometryError),
}

impl From<geojson::Error> for CodecError {
    fn from(error: geojson::Error) -> Self {
        CodecError::InvalidGeoJson(error.to_string())
    }
}

impl From<std::io::Error> for CodecError {
    fn from(error: std::io::Error) -> Self {
        CodecError::InvalidWkb(error.to_string())
    }
}
