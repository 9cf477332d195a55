mod error;
mod geometry;
mod value;

pub use error::*;
pub use geometry::*;
pub use value::*;

// Re-export the kernel's geometry model. Other crates go through these aliases
// so that swapping the kernel stays a model-crate concern.
pub use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

/// Spatial reference identifier value meaning "no reference system set".
pub const UNKNOWN_SRID: i32 = 0;
