//! Structural accessors over a single geometry.
//!
//! These shims read components out of the kernel's geometry model without
//! computing anything; out-of-range indices yield `None` (surfaced to the
//! engine as null), matching the catalog's accessor family contract.

use crate::{KernelError, KernelResult};
use geo::{BoundingRect, CoordsIter, HasDimensions, Intersects};
use geo_types::{
    Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint, Point,
    Polygon, Rect,
};

pub fn x(geom: &Geometry<f64>) -> Option<f64> {
    match geom {
        Geometry::Point(p) => Some(p.x()),
        _ => None,
    }
}

pub fn y(geom: &Geometry<f64>) -> Option<f64> {
    match geom {
        Geometry::Point(p) => Some(p.y()),
        _ => None,
    }
}

pub fn x_min(geom: &Geometry<f64>) -> Option<f64> {
    geom.bounding_rect().map(|r| r.min().x)
}

pub fn x_max(geom: &Geometry<f64>) -> Option<f64> {
    geom.bounding_rect().map(|r| r.max().x)
}

pub fn y_min(geom: &Geometry<f64>) -> Option<f64> {
    geom.bounding_rect().map(|r| r.min().y)
}

pub fn y_max(geom: &Geometry<f64>) -> Option<f64> {
    geom.bounding_rect().map(|r| r.max().y)
}

/// Topological dimension: 0 for puntal, 1 for lineal, 2 for areal input;
/// collections report the maximum of their members.
pub fn dimension(geom: &Geometry<f64>) -> i32 {
    use geo::dimensions::Dimensions;
    match geom.dimensions() {
        Dimensions::Empty | Dimensions::ZeroDimensional => 0,
        Dimensions::OneDimensional => 1,
        Dimensions::TwoDimensional => 2,
    }
}

pub fn num_points(geom: &Geometry<f64>) -> i32 {
    geom.coords_count() as i32
}

pub fn num_geometries(geom: &Geometry<f64>) -> i32 {
    match geom {
        Geometry::MultiPoint(mp) => mp.0.len() as i32,
        Geometry::MultiLineString(mls) => mls.0.len() as i32,
        Geometry::MultiPolygon(mp) => mp.0.len() as i32,
        Geometry::GeometryCollection(gc) => gc.0.len() as i32,
        _ => 1,
    }
}

/// 0-based component accessor; atomic geometries expose themselves at index 0.
pub fn geometry_n(geom: &Geometry<f64>, n: i32) -> Option<Geometry<f64>> {
    if n < 0 {
        return None;
    }
    let n = n as usize;
    match geom {
        Geometry::MultiPoint(mp) => mp.0.get(n).map(|p| Geometry::Point(*p)),
        Geometry::MultiLineString(mls) => {
            mls.0.get(n).map(|ls| Geometry::LineString(ls.clone()))
        }
        Geometry::MultiPolygon(mp) => mp.0.get(n).map(|p| Geometry::Polygon(p.clone())),
        Geometry::GeometryCollection(gc) => gc.0.get(n).cloned(),
        other if n == 0 => Some(other.clone()),
        _ => None,
    }
}

/// 1-based vertex accessor with negative indexing from the end. Only defined
/// for linestrings.
pub fn point_n(geom: &Geometry<f64>, n: i32) -> Option<Geometry<f64>> {
    let Geometry::LineString(ls) = geom else {
        return None;
    };
    let len = ls.0.len() as i32;
    if n == 0 || n.abs() > len {
        return None;
    }
    let idx = if n > 0 { n - 1 } else { len + n };
    ls.0.get(idx as usize)
        .map(|c| Geometry::Point(Point(*c)))
}

pub fn exterior_ring(geom: &Geometry<f64>) -> Option<Geometry<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(Geometry::LineString(p.exterior().clone())),
        _ => None,
    }
}

/// 0-based interior ring accessor; non-polygons and out-of-range indices
/// yield `None`.
pub fn interior_ring_n(geom: &Geometry<f64>, n: i32) -> Option<Geometry<f64>> {
    if n < 0 {
        return None;
    }
    match geom {
        Geometry::Polygon(p) => p
            .interiors()
            .get(n as usize)
            .map(|ls| Geometry::LineString(ls.clone())),
        _ => None,
    }
}

pub fn num_interior_rings(geom: &Geometry<f64>) -> Option<i32> {
    match geom {
        Geometry::Polygon(p) => Some(p.interiors().len() as i32),
        _ => None,
    }
}

/// Total ring count of a polygonal geometry. Errors for non-polygonal input.
pub fn num_rings(geom: &Geometry<f64>) -> KernelResult<i32> {
    match geom {
        Geometry::Polygon(p) => Ok(1 + p.interiors().len() as i32),
        Geometry::MultiPolygon(mp) => Ok(mp
            .0
            .iter()
            .map(|p| 1 + p.interiors().len() as i32)
            .sum()),
        other => Err(KernelError::invalid(format!(
            "ring count requires a polygonal geometry, got {}",
            spatial_fusion_model::type_name(other)
        ))),
    }
}

pub fn start_point(geom: &Geometry<f64>) -> Option<Geometry<f64>> {
    match geom {
        Geometry::LineString(ls) => ls.0.first().map(|c| Geometry::Point(Point(*c))),
        _ => None,
    }
}

pub fn end_point(geom: &Geometry<f64>) -> Option<Geometry<f64>> {
    match geom {
        Geometry::LineString(ls) => ls.0.last().map(|c| Geometry::Point(Point(*c))),
        _ => None,
    }
}

pub fn is_closed(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::LineString(ls) => ls.is_closed(),
        Geometry::MultiLineString(mls) => {
            !mls.0.is_empty() && mls.0.iter().all(LineString::is_closed)
        }
        Geometry::GeometryCollection(gc) => {
            !gc.0.is_empty() && gc.0.iter().all(is_closed)
        }
        Geometry::Point(_) | Geometry::MultiPoint(_) => true,
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => true,
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => true,
    }
}

pub fn is_ring(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::LineString(ls) => ls.0.len() >= 4 && ls.is_closed() && is_simple(geom),
        _ => false,
    }
}

/// Simplicity in the OGC sense: a geometry with no anomalous self-contact.
/// Puntal and polygonal inputs are simple by construction here; lineal inputs
/// are scanned for interior self-intersections.
pub fn is_simple(geom: &Geometry<f64>) -> bool {
    match geom {
        Geometry::Point(_) | Geometry::Polygon(_) | Geometry::MultiPolygon(_) => true,
        Geometry::MultiPoint(mp) => {
            let mut seen: Vec<Coord<f64>> = Vec::with_capacity(mp.0.len());
            for p in &mp.0 {
                if seen.contains(&p.0) {
                    return false;
                }
                seen.push(p.0);
            }
            true
        }
        Geometry::LineString(ls) => line_is_simple(std::slice::from_ref(ls)),
        Geometry::MultiLineString(mls) => line_is_simple(&mls.0),
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_simple),
        Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => true,
    }
}

fn line_is_simple(lines: &[LineString<f64>]) -> bool {
    let segments: Vec<Line<f64>> = lines.iter().flat_map(|ls| ls.lines()).collect();
    for (i, a) in segments.iter().enumerate() {
        for b in segments.iter().skip(i + 1) {
            match geo::line_intersection::line_intersection(*a, *b) {
                None => {}
                Some(geo::LineIntersection::Collinear { .. }) => return false,
                Some(geo::LineIntersection::SinglePoint {
                    intersection,
                    is_proper,
                }) => {
                    if is_proper {
                        // Interior crossings are allowed only when they are the
                        // shared endpoint of a closed ring.
                        return false;
                    }
                    let endpoints =
                        [a.start, a.end, b.start, b.end].iter().any(|c| *c == intersection);
                    if !endpoints {
                        return false;
                    }
                }
            }
        }
    }
    true
}

/// Light validity scan: rings are closed with at least four coordinates,
/// contain no non-finite ordinates, and do not self-intersect. Holes must lie
/// within their shell.
pub fn is_valid(geom: &Geometry<f64>) -> bool {
    let finite = geom.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        return false;
    }
    match geom {
        Geometry::Polygon(p) => polygon_is_valid(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().all(polygon_is_valid),
        Geometry::LineString(ls) => ls.0.len() != 1,
        Geometry::GeometryCollection(gc) => gc.0.iter().all(is_valid),
        _ => true,
    }
}

fn polygon_is_valid(p: &Polygon<f64>) -> bool {
    let mut rings = vec![p.exterior()];
    rings.extend(p.interiors());
    for ring in &rings {
        if ring.0.is_empty() {
            continue;
        }
        if ring.0.len() < 4 || !ring.is_closed() {
            return false;
        }
        if !line_is_simple(std::slice::from_ref(*ring)) {
            return false;
        }
    }
    let shell = Polygon::new(p.exterior().clone(), Vec::new());
    p.interiors()
        .iter()
        .all(|hole| hole.0.iter().all(|c| shell.intersects(&Point(*c))))
}

/// The geometry's envelope as a point, line or polygon, depending on extent.
pub fn envelope(geom: &Geometry<f64>) -> Geometry<f64> {
    let Some(rect) = geom.bounding_rect() else {
        return Geometry::GeometryCollection(GeometryCollection(Vec::new()));
    };
    rect_to_geometry(rect)
}

fn rect_to_geometry(rect: Rect<f64>) -> Geometry<f64> {
    let (min, max) = (rect.min(), rect.max());
    if min == max {
        Geometry::Point(Point(min))
    } else if min.x == max.x || min.y == max.y {
        Geometry::LineString(LineString(vec![min, max]))
    } else {
        Geometry::Polygon(rect.to_polygon())
    }
}

/// Diagonal of the envelope, from the minimum to the maximum corner.
pub fn bounding_diagonal(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom.bounding_rect() {
        Some(rect) => Geometry::LineString(LineString(vec![rect.min(), rect.max()])),
        None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
    }
}

/// Boundary per the OGC mod-2 rule.
pub fn boundary(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => {
            Geometry::GeometryCollection(GeometryCollection(Vec::new()))
        }
        Geometry::LineString(ls) => line_boundary(std::slice::from_ref(ls)),
        Geometry::MultiLineString(mls) => line_boundary(&mls.0),
        Geometry::Polygon(p) => Geometry::MultiLineString(MultiLineString(rings_of(p))),
        Geometry::MultiPolygon(mp) => Geometry::MultiLineString(MultiLineString(
            mp.0.iter().flat_map(rings_of).collect(),
        )),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter().map(boundary).collect(),
        )),
        Geometry::Line(l) => Geometry::MultiPoint(MultiPoint(vec![
            Point(l.start),
            Point(l.end),
        ])),
        Geometry::Rect(r) => boundary(&Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => boundary(&Geometry::Polygon(t.to_polygon())),
    }
}

fn rings_of(p: &Polygon<f64>) -> Vec<LineString<f64>> {
    let mut rings = vec![p.exterior().clone()];
    rings.extend(p.interiors().iter().cloned());
    rings
}

fn line_boundary(lines: &[LineString<f64>]) -> Geometry<f64> {
    // Mod-2 rule: endpoints appearing an odd number of times.
    let mut counts: Vec<(Coord<f64>, usize)> = Vec::new();
    for ls in lines {
        if ls.is_closed() || ls.0.is_empty() {
            continue;
        }
        for c in [ls.0[0], ls.0[ls.0.len() - 1]] {
            match counts.iter_mut().find(|(seen, _)| *seen == c) {
                Some((_, n)) => *n += 1,
                None => counts.push((c, 1)),
            }
        }
    }
    let odd: Vec<Point<f64>> = counts
        .into_iter()
        .filter(|(_, n)| n % 2 == 1)
        .map(|(c, _)| Point(c))
        .collect();
    if odd.is_empty() {
        Geometry::GeometryCollection(GeometryCollection(Vec::new()))
    } else {
        Geometry::MultiPoint(MultiPoint(odd))
    }
}

/// Flattens the geometry into its atomic components, preserving traversal
/// order. The ordering is a contract: downstream joins rely on positional
/// correspondence with the source row.
pub fn dump(geom: &Geometry<f64>) -> Vec<Geometry<f64>> {
    match geom {
        Geometry::MultiPoint(mp) => mp.0.iter().map(|p| Geometry::Point(*p)).collect(),
        Geometry::MultiLineString(mls) => {
            mls.0.iter().map(|ls| Geometry::LineString(ls.clone())).collect()
        }
        Geometry::MultiPolygon(mp) => {
            mp.0.iter().map(|p| Geometry::Polygon(p.clone())).collect()
        }
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(dump).collect(),
        other => vec![other.clone()],
    }
}

/// Every vertex as a point, in traversal order.
pub fn dump_points(geom: &Geometry<f64>) -> Vec<Geometry<f64>> {
    geom.coords_iter().map(|c| Geometry::Point(Point(c))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon};

    #[test]
    fn point_accessors() {
        let p = Geometry::Point(point! { x: 3.0, y: 4.0 });
        assert_eq!(x(&p), Some(3.0));
        assert_eq!(y(&p), Some(4.0));
        assert_eq!(x(&Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.)])), None);
    }

    #[test]
    fn point_n_is_one_based_with_negative_indexing() {
        let ls = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.), (x: 2., y: 2.)]);
        assert_eq!(point_n(&ls, 1), Some(Geometry::Point(point! { x: 0.0, y: 0.0 })));
        assert_eq!(point_n(&ls, -1), Some(Geometry::Point(point! { x: 2.0, y: 2.0 })));
        assert_eq!(point_n(&ls, 0), None);
        assert_eq!(point_n(&ls, 4), None);
    }

    #[test]
    fn dump_preserves_component_order() {
        let mp = Geometry::MultiPoint(MultiPoint(vec![
            point! { x: 1.0, y: 1.0 },
            point! { x: 2.0, y: 2.0 },
            point! { x: 3.0, y: 3.0 },
        ]));
        let parts = dump(&mp);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Geometry::Point(point! { x: 1.0, y: 1.0 }));
        assert_eq!(parts[2], Geometry::Point(point! { x: 3.0, y: 3.0 }));
    }

    #[test]
    fn dump_of_atomic_geometry_is_identity() {
        let p = Geometry::Point(point! { x: 1.0, y: 2.0 });
        assert_eq!(dump(&p), vec![p.clone()]);
    }

    #[test]
    fn self_intersecting_line_is_not_simple() {
        let bowtie = Geometry::LineString(line_string![
            (x: 0., y: 0.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 2.)
        ]);
        assert!(!is_simple(&bowtie));
        let plain = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.)]);
        assert!(is_simple(&plain));
    }

    #[test]
    fn ring_predicates() {
        let ring = Geometry::LineString(line_string![
            (x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.), (x: 0., y: 0.)
        ]);
        assert!(is_closed(&ring));
        assert!(is_ring(&ring));
        let open = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.)]);
        assert!(!is_closed(&open));
        assert!(!is_ring(&open));
    }

    #[test]
    fn envelope_degenerates_to_point_and_line() {
        let p = Geometry::Point(point! { x: 1.0, y: 1.0 });
        assert!(matches!(envelope(&p), Geometry::Point(_)));
        let flat = Geometry::LineString(line_string![(x: 0., y: 1.), (x: 5., y: 1.)]);
        assert!(matches!(envelope(&flat), Geometry::LineString(_)));
        let poly: Geometry<f64> = Geometry::Polygon(polygon![
            (x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.), (x: 0., y: 4.), (x: 0., y: 0.)
        ]);
        assert!(matches!(envelope(&poly), Geometry::Polygon(_)));
    }

    #[test]
    fn polygon_boundary_lists_all_rings() {
        let poly: Geometry<f64> = Geometry::Polygon(polygon!(
            exterior: [(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 0., y: 0.)],
            interiors: [[(x: 1., y: 1.), (x: 2., y: 1.), (x: 2., y: 2.), (x: 1., y: 1.)]],
        ));
        let Geometry::MultiLineString(rings) = boundary(&poly) else {
            panic!("expected ring boundary");
        };
        assert_eq!(rings.0.len(), 2);
    }
}
