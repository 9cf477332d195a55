use crate::SpatialGeometry;
use std::fmt::{Display, Formatter};

/// The kind tag of a [SpatialValue].
///
/// Signatures are declared in terms of these kinds and dispatch matches them
/// positionally, so the set is closed and deliberately small. The engine's own
/// type system performs any numeric coercion before values arrive here; this
/// layer never widens between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Geometry,
    GeometryArray,
    Double,
    Integer,
    String,
    Bytes,
    Boolean,
    /// The composite return of bounding-radius style functions. Never a
    /// parameter kind.
    PairGeometryDouble,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Geometry => "GEOMETRY",
            ValueKind::GeometryArray => "GEOMETRY_ARRAY",
            ValueKind::Double => "DOUBLE",
            ValueKind::Integer => "INTEGER",
            ValueKind::String => "STRING",
            ValueKind::Bytes => "BYTES",
            ValueKind::Boolean => "BOOLEAN",
            ValueKind::PairGeometryDouble => "PAIR<GEOMETRY, DOUBLE>",
        };
        f.write_str(name)
    }
}

/// A tagged value crossing the engine boundary.
///
/// This replaces the host engine's raw/bridged object type: instead of ambient
/// engine-type metadata, every value carries its own kind tag. `Null` is the
/// engine's SQL null; it matches any parameter kind during dispatch and the
/// per-family null policies decide what an invocation does with it.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialValue {
    Null,
    Geometry(SpatialGeometry),
    GeometryArray(Vec<SpatialGeometry>),
    Double(f64),
    Integer(i32),
    String(String),
    Bytes(Vec<u8>),
    Boolean(bool),
    Pair(SpatialGeometry, f64),
}

impl SpatialValue {
    /// The kind of this value; `None` for null.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            SpatialValue::Null => None,
            SpatialValue::Geometry(_) => Some(ValueKind::Geometry),
            SpatialValue::GeometryArray(_) => Some(ValueKind::GeometryArray),
            SpatialValue::Double(_) => Some(ValueKind::Double),
            SpatialValue::Integer(_) => Some(ValueKind::Integer),
            SpatialValue::String(_) => Some(ValueKind::String),
            SpatialValue::Bytes(_) => Some(ValueKind::Bytes),
            SpatialValue::Boolean(_) => Some(ValueKind::Boolean),
            SpatialValue::Pair(_, _) => Some(ValueKind::PairGeometryDouble),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SpatialValue::Null)
    }
}

impl From<SpatialGeometry> for SpatialValue {
    fn from(value: SpatialGeometry) -> Self {
        SpatialValue::Geometry(value)
    }
}

impl From<f64> for SpatialValue {
    fn from(value: f64) -> Self {
        SpatialValue::Double(value)
    }
}

impl From<i32> for SpatialValue {
    fn from(value: i32) -> Self {
        SpatialValue::Integer(value)
    }
}

impl From<String> for SpatialValue {
    fn from(value: String) -> Self {
        SpatialValue::String(value)
    }
}

impl From<Vec<u8>> for SpatialValue {
    fn from(value: Vec<u8>) -> Self {
        SpatialValue::Bytes(value)
    }
}

impl From<bool> for SpatialValue {
    fn from(value: bool) -> Self {
        SpatialValue::Boolean(value)
    }
}

impl From<Vec<SpatialGeometry>> for SpatialValue {
    fn from(value: Vec<SpatialGeometry>) -> Self {
        SpatialValue::GeometryArray(value)
    }
}
