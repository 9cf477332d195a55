use crate::{GeometryError, UNKNOWN_SRID};
use geo::{CoordsIter, HasDimensions};
use geo_types::{Geometry, GeometryCollection, LineString};
use std::fmt::{Display, Formatter};

/// Coordinate dimensionality of a geometry.
///
/// The planar kernel only ever consumes X/Y. Z and M ordinates are carried
/// alongside the geometry (see [SpatialGeometry]) so that they survive the
/// codec boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordDim {
    #[default]
    Xy,
    Xyz,
    Xym,
    Xyzm,
}

impl CoordDim {
    pub fn has_z(self) -> bool {
        matches!(self, CoordDim::Xyz | CoordDim::Xyzm)
    }

    pub fn has_m(self) -> bool {
        matches!(self, CoordDim::Xym | CoordDim::Xyzm)
    }

    /// Number of ordinates per coordinate (2, 3 or 4).
    pub fn ordinates(self) -> i32 {
        2 + i32::from(self.has_z()) + i32::from(self.has_m())
    }

    pub fn new(has_z: bool, has_m: bool) -> Self {
        match (has_z, has_m) {
            (false, false) => CoordDim::Xy,
            (true, false) => CoordDim::Xyz,
            (false, true) => CoordDim::Xym,
            (true, true) => CoordDim::Xyzm,
        }
    }

    /// The dimensionality tag used in extended well-known text (`POINT Z (..)`).
    pub fn wkt_tag(self) -> &'static str {
        match self {
            CoordDim::Xy => "",
            CoordDim::Xyz => " Z",
            CoordDim::Xym => " M",
            CoordDim::Xyzm => " ZM",
        }
    }
}

impl Display for CoordDim {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wkt_tag().trim_start())
    }
}

/// An opaque geometry value as seen by the hosting engine.
///
/// Wraps exactly one immutable kernel geometry together with its spatial
/// reference identifier and coordinate dimensionality. The engine moves these
/// values through columns without interpreting them; only the kernel shims and
/// the codec boundary look inside.
///
/// Invariants upheld by construction:
/// - the Z/M ordinate tables are present exactly when [CoordDim] says so, and
///   their length equals the coordinate count in traversal order;
/// - `Rect`, `Triangle` and `Line` kernel values are canonicalized to
///   `Polygon`/`LineString` so every consumer sees the seven standard types.
///
/// Operations never mutate in place; they produce a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGeometry {
    geom: Geometry<f64>,
    srid: i32,
    dim: CoordDim,
    z: Vec<f64>,
    m: Vec<f64>,
}

impl SpatialGeometry {
    /// Wraps a planar (XY) geometry with no spatial reference set.
    pub fn new(geom: Geometry<f64>) -> Self {
        Self::with_srid(geom, UNKNOWN_SRID)
    }

    /// Wraps a planar (XY) geometry with the given spatial reference id.
    pub fn with_srid(geom: Geometry<f64>, srid: i32) -> Self {
        Self {
            geom: canonicalize(geom),
            srid,
            dim: CoordDim::Xy,
            z: Vec::new(),
            m: Vec::new(),
        }
    }

    /// Wraps a geometry together with its Z/M ordinate tables.
    ///
    /// The tables follow the geometry's coordinate traversal order (components
    /// in declaration order, exterior ring before interior rings).
    pub fn try_new(
        geom: Geometry<f64>,
        srid: i32,
        dim: CoordDim,
        z: Vec<f64>,
        m: Vec<f64>,
    ) -> Result<Self, GeometryError> {
        let geom = canonicalize(geom);
        let coords = geom.coords_count();
        if dim.has_z() != !z.is_empty() && coords > 0 {
            return Err(GeometryError::dimension_mismatch(format!(
                "dimension {dim:?} with {} z ordinate(s) for {coords} coordinate(s)",
                z.len()
            )));
        }
        if dim.has_m() != !m.is_empty() && coords > 0 {
            return Err(GeometryError::dimension_mismatch(format!(
                "dimension {dim:?} with {} m ordinate(s) for {coords} coordinate(s)",
                m.len()
            )));
        }
        if dim.has_z() && z.len() != coords {
            return Err(GeometryError::dimension_mismatch(format!(
                "{} z ordinate(s) for {coords} coordinate(s)",
                z.len()
            )));
        }
        if dim.has_m() && m.len() != coords {
            return Err(GeometryError::dimension_mismatch(format!(
                "{} m ordinate(s) for {coords} coordinate(s)",
                m.len()
            )));
        }
        Ok(Self {
            geom,
            srid,
            dim,
            z,
            m,
        })
    }

    /// The canonical empty geometry (an empty collection).
    pub fn empty() -> Self {
        Self::new(Geometry::GeometryCollection(GeometryCollection(Vec::new())))
    }

    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geom
    }

    pub fn into_geometry(self) -> Geometry<f64> {
        self.geom
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn dim(&self) -> CoordDim {
        self.dim
    }

    pub fn z_ordinates(&self) -> &[f64] {
        &self.z
    }

    pub fn m_ordinates(&self) -> &[f64] {
        &self.m
    }

    pub fn coords_count(&self) -> usize {
        self.geom.coords_count()
    }

    pub fn is_empty(&self) -> bool {
        self.geom.is_empty()
    }

    /// Returns a new value with the same geometry and a different reference id.
    pub fn reref(&self, srid: i32) -> Self {
        let mut out = self.clone();
        out.srid = srid;
        out
    }

    /// Wraps a planar kernel result, inheriting this value's reference id.
    ///
    /// Used for every operation that restructures coordinates; Z/M tables do
    /// not carry over (see the codec notes in DESIGN.md).
    pub fn derive(&self, geom: Geometry<f64>) -> Self {
        Self::with_srid(geom, self.srid)
    }

    /// Wraps a kernel result whose coordinate traversal order is unchanged,
    /// keeping the Z/M ordinate tables.
    pub fn derive_same_order(&self, geom: Geometry<f64>) -> Result<Self, GeometryError> {
        Self::try_new(geom, self.srid, self.dim, self.z.clone(), self.m.clone())
    }

    /// Drops Z and M ordinates, keeping the planar geometry and reference id.
    pub fn force_2d(&self) -> Self {
        self.derive(self.geom.clone())
    }

    /// The OGC type name in upper case, e.g. `POINT`, with an `M` suffix for
    /// measured geometries.
    pub fn type_name_measured(&self) -> String {
        let mut name = type_name(&self.geom).to_uppercase();
        if self.dim.has_m() {
            name.push('M');
        }
        name
    }

    /// The `ST_`-prefixed camel-case type name, e.g. `ST_LineString`.
    pub fn st_type_name(&self) -> String {
        format!("ST_{}", type_name(&self.geom))
    }
}

/// The camel-case OGC type name of a kernel geometry.
pub fn type_name(geom: &Geometry<f64>) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Rewrites the kernel's convenience types onto the seven standard ones.
fn canonicalize(geom: Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Rect(r) => Geometry::Polygon(r.to_polygon()),
        Geometry::Triangle(t) => Geometry::Polygon(t.to_polygon()),
        Geometry::Line(l) => {
            Geometry::LineString(LineString::from(vec![l.start, l.end]))
        }
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.into_iter().map(canonicalize).collect(),
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{point, Rect};

    #[test]
    fn canonicalizes_rect_to_polygon() {
        let rect = Rect::new((0.0, 0.0), (2.0, 2.0));
        let value = SpatialGeometry::new(Geometry::Rect(rect));
        assert!(matches!(value.geometry(), Geometry::Polygon(_)));
        assert_eq!(value.type_name_measured(), "POLYGON");
    }

    #[test]
    fn z_table_must_match_coordinate_count() {
        let geom = Geometry::Point(point! { x: 1.0, y: 2.0 });
        let err = SpatialGeometry::try_new(geom, 0, CoordDim::Xyz, vec![1.0, 2.0], Vec::new());
        assert!(matches!(err, Err(GeometryError::DimensionMismatch(_))));
    }

    #[test]
    fn consistent_z_table_is_accepted() {
        let geom = Geometry::Point(point! { x: 1.0, y: 2.0 });
        let value =
            SpatialGeometry::try_new(geom, 4326, CoordDim::Xyz, vec![3.0], Vec::new()).unwrap();
        assert_eq!(value.srid(), 4326);
        assert_eq!(value.z_ordinates(), &[3.0]);
        assert_eq!(value.dim().ordinates(), 3);
    }

    #[test]
    fn derive_keeps_srid_and_drops_ordinates() {
        let geom = Geometry::Point(point! { x: 1.0, y: 2.0 });
        let value =
            SpatialGeometry::try_new(geom, 4326, CoordDim::Xyz, vec![3.0], Vec::new()).unwrap();
        let derived = value.derive(Geometry::Point(point! { x: 5.0, y: 6.0 }));
        assert_eq!(derived.srid(), 4326);
        assert_eq!(derived.dim(), CoordDim::Xy);
        assert!(derived.z_ordinates().is_empty());
    }
}
