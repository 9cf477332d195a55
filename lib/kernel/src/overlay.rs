//! Overlay shims: boolean operations, buffering, splitting, subdivision.

use crate::hull::circle;
use crate::{KernelError, KernelResult};
use geo::{BooleanOps, BoundingRect, Contains, CoordsIter, EuclideanDistance, Intersects};
use geo_types::{
    Coord, Geometry, GeometryCollection, Line, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon, Rect,
};

/// Segments per quadrant for circle approximations in buffer shims.
const BUFFER_QUADRANT_SEGMENTS: i32 = 8;

/// Tolerance for deciding that a point lies on a segment.
const ON_SEGMENT_EPS: f64 = 1e-9;

fn to_polygonal(geom: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Some(mp.clone()),
        Geometry::Rect(r) => Some(MultiPolygon(vec![r.to_polygon()])),
        Geometry::Triangle(t) => Some(MultiPolygon(vec![t.to_polygon()])),
        _ => None,
    }
}

fn to_lineal(geom: &Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geom {
        Geometry::LineString(ls) => Some(MultiLineString(vec![ls.clone()])),
        Geometry::MultiLineString(mls) => Some(mls.clone()),
        Geometry::Line(l) => Some(MultiLineString(vec![LineString(vec![l.start, l.end])])),
        _ => None,
    }
}

fn to_puntal(geom: &Geometry<f64>) -> Option<MultiPoint<f64>> {
    match geom {
        Geometry::Point(p) => Some(MultiPoint(vec![*p])),
        Geometry::MultiPoint(mp) => Some(mp.clone()),
        _ => None,
    }
}

fn polygonal_result(mp: MultiPolygon<f64>) -> Geometry<f64> {
    let mut polygons = mp.0;
    match polygons.len() {
        0 => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        1 => Geometry::Polygon(polygons.remove(0)),
        _ => Geometry::MultiPolygon(MultiPolygon(polygons)),
    }
}

fn lineal_result(mls: MultiLineString<f64>) -> Geometry<f64> {
    let mut lines: Vec<LineString<f64>> = mls.0.into_iter().filter(|ls| !ls.0.is_empty()).collect();
    match lines.len() {
        0 => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        1 => Geometry::LineString(lines.remove(0)),
        _ => Geometry::MultiLineString(MultiLineString(lines)),
    }
}

fn unsupported_pair(op: &str, a: &Geometry<f64>, b: &Geometry<f64>) -> KernelError {
    KernelError::unsupported(format!(
        "{op} between {} and {}",
        spatial_fusion_model::type_name(a),
        spatial_fusion_model::type_name(b)
    ))
}

pub fn intersection(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    if let Some(points) = to_puntal(a) {
        let kept: Vec<Point<f64>> =
            points.0.into_iter().filter(|p| b.intersects(p)).collect();
        return Ok(puntal_result(kept));
    }
    if to_puntal(b).is_some() {
        return intersection(b, a);
    }
    match (to_polygonal(a), to_polygonal(b)) {
        (Some(pa), Some(pb)) => return Ok(polygonal_result(pa.intersection(&pb))),
        (Some(pa), None) => {
            if let Some(lb) = to_lineal(b) {
                return Ok(lineal_result(pa.clip(&lb, false)));
            }
        }
        (None, Some(pb)) => {
            if let Some(la) = to_lineal(a) {
                return Ok(lineal_result(pb.clip(&la, false)));
            }
        }
        (None, None) => {
            if let (Some(la), Some(lb)) = (to_lineal(a), to_lineal(b)) {
                return Ok(line_line_intersection(&la, &lb));
            }
        }
    }
    Err(unsupported_pair("intersection", a, b))
}

fn puntal_result(mut points: Vec<Point<f64>>) -> Geometry<f64> {
    match points.len() {
        0 => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        1 => Geometry::Point(points.remove(0)),
        _ => Geometry::MultiPoint(MultiPoint(points)),
    }
}

fn line_line_intersection(a: &MultiLineString<f64>, b: &MultiLineString<f64>) -> Geometry<f64> {
    let mut overlaps: Vec<LineString<f64>> = Vec::new();
    let mut points: Vec<Coord<f64>> = Vec::new();
    for sa in a.0.iter().flat_map(|ls| ls.lines()) {
        for sb in b.0.iter().flat_map(|ls| ls.lines()) {
            match geo::line_intersection::line_intersection(sa, sb) {
                Some(geo::LineIntersection::SinglePoint { intersection, .. }) => {
                    if !points.contains(&intersection) {
                        points.push(intersection);
                    }
                }
                Some(geo::LineIntersection::Collinear { intersection }) => {
                    overlaps.push(LineString(vec![intersection.start, intersection.end]));
                }
                None => {}
            }
        }
    }
    if !overlaps.is_empty() {
        lineal_result(MultiLineString(overlaps))
    } else {
        puntal_result(points.into_iter().map(Point).collect())
    }
}

pub fn difference(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    if let Some(points) = to_puntal(a) {
        let kept: Vec<Point<f64>> =
            points.0.into_iter().filter(|p| !b.intersects(p)).collect();
        return Ok(puntal_result(kept));
    }
    if to_puntal(b).is_some() || to_lineal(b).is_some() && to_polygonal(a).is_some() {
        // Subtracting a lower-dimensional geometry leaves the input unchanged.
        return Ok(a.clone());
    }
    match (to_polygonal(a), to_polygonal(b)) {
        (Some(pa), Some(pb)) => return Ok(polygonal_result(pa.difference(&pb))),
        (None, Some(pb)) => {
            if let Some(la) = to_lineal(a) {
                return Ok(lineal_result(pb.clip(&la, true)));
            }
        }
        _ => {}
    }
    if to_lineal(a).is_some() && to_lineal(b).is_some() {
        return Ok(a.clone());
    }
    Err(unsupported_pair("difference", a, b))
}

pub fn sym_difference(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    match (to_polygonal(a), to_polygonal(b)) {
        (Some(pa), Some(pb)) => Ok(polygonal_result(pa.xor(&pb))),
        _ => match (to_puntal(a), to_puntal(b)) {
            (Some(pa), Some(pb)) => {
                let mut kept: Vec<Point<f64>> = pa
                    .0
                    .iter()
                    .filter(|p| !pb.0.contains(p))
                    .copied()
                    .collect();
                kept.extend(pb.0.iter().filter(|p| !pa.0.contains(p)).copied());
                Ok(puntal_result(kept))
            }
            _ => Err(unsupported_pair("symmetric difference", a, b)),
        },
    }
}

/// Splits lineal input by a point, line or polygon-boundary blade.
///
/// The result is always a multi-geometry containing the pieces in path
/// order; a blade that never touches the input yields the input itself.
pub fn split(input: &Geometry<f64>, blade: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    let Some(lines) = to_lineal(input) else {
        return Err(KernelError::unsupported(format!(
            "split of {} input",
            spatial_fusion_model::type_name(input)
        )));
    };
    let cut_points = blade_points(&lines, blade)?;
    let mut parts: Vec<LineString<f64>> = Vec::new();
    for ls in &lines.0 {
        parts.extend(split_linestring(ls, &cut_points));
    }
    Ok(Geometry::MultiLineString(MultiLineString(parts)))
}

fn blade_points(
    lines: &MultiLineString<f64>,
    blade: &Geometry<f64>,
) -> KernelResult<Vec<Coord<f64>>> {
    if let Some(points) = to_puntal(blade) {
        return Ok(points.0.iter().map(|p| p.0).collect());
    }
    let blade_lines = match (to_lineal(blade), to_polygonal(blade)) {
        (Some(lb), _) => lb,
        (None, Some(pb)) => MultiLineString(
            pb.0.iter()
                .flat_map(|p| {
                    let mut rings = vec![p.exterior().clone()];
                    rings.extend(p.interiors().iter().cloned());
                    rings
                })
                .collect(),
        ),
        (None, None) => {
            return Err(KernelError::unsupported(format!(
                "split by {} blade",
                spatial_fusion_model::type_name(blade)
            )))
        }
    };
    let mut points = Vec::new();
    for sa in lines.0.iter().flat_map(|ls| ls.lines()) {
        for sb in blade_lines.0.iter().flat_map(|ls| ls.lines()) {
            if let Some(geo::LineIntersection::SinglePoint { intersection, .. }) =
                geo::line_intersection::line_intersection(sa, sb)
            {
                if !points.contains(&intersection) {
                    points.push(intersection);
                }
            }
        }
    }
    Ok(points)
}

fn split_linestring(ls: &LineString<f64>, cuts: &[Coord<f64>]) -> Vec<LineString<f64>> {
    let mut parts = Vec::new();
    let mut current: Vec<Coord<f64>> = Vec::new();
    for seg in ls.lines() {
        if current.last() != Some(&seg.start) {
            current.push(seg.start);
        }
        let mut on_segment: Vec<(f64, Coord<f64>)> = cuts
            .iter()
            .filter(|c| **c != seg.start && **c != seg.end)
            .filter(|c| seg.euclidean_distance(&Point(**c)) < ON_SEGMENT_EPS)
            .map(|c| (dist_along(&seg, *c), *c))
            .collect();
        on_segment.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        for (_, c) in on_segment {
            current.push(c);
            parts.push(LineString(current.clone()));
            current = vec![c];
        }
        // Interior vertices that are cut points also split the path.
        if cuts.contains(&seg.end) && seg.end != *ls.0.last().unwrap_or(&seg.end) {
            current.push(seg.end);
            parts.push(LineString(current.clone()));
            current = vec![seg.end];
        }
    }
    if let Some(last) = ls.0.last() {
        if current.last() != Some(last) {
            current.push(*last);
        }
    }
    if current.len() >= 2 {
        parts.push(LineString(current));
    }
    parts
}

fn dist_along(seg: &Line<f64>, c: Coord<f64>) -> f64 {
    (c.x - seg.start.x).powi(2) + (c.y - seg.start.y).powi(2)
}

/// Recursively halves the geometry until every piece has at most
/// `max_vertices` coordinates. Pieces are emitted west/south first, so the
/// output order is deterministic for a given input.
pub fn subdivide(geom: &Geometry<f64>, max_vertices: i32) -> KernelResult<Vec<Geometry<f64>>> {
    if max_vertices < 5 {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "maxVertices",
            min: 5.0,
            max: f64::from(i32::MAX),
            value: f64::from(max_vertices),
        });
    }
    let mut out = Vec::new();
    subdivide_into(geom, max_vertices as usize, 0, &mut out);
    Ok(out)
}

fn subdivide_into(
    geom: &Geometry<f64>,
    max_vertices: usize,
    depth: u32,
    out: &mut Vec<Geometry<f64>>,
) {
    if let Geometry::GeometryCollection(gc) = geom {
        for member in &gc.0 {
            subdivide_into(member, max_vertices, depth, out);
        }
        return;
    }
    if geom.coords_count() <= max_vertices || depth >= 64 {
        if geom.coords_count() > 0 {
            out.push(geom.clone());
        }
        return;
    }
    let Some(rect) = geom.bounding_rect() else {
        return;
    };
    let (left, right) = halves(rect);
    for half in [left, right] {
        let clipped = clip_to_rect(geom, &half);
        match clipped {
            Some(g) if g.coords_count() > 0 => {
                subdivide_into(&g, max_vertices, depth + 1, out)
            }
            _ => {}
        }
    }
}

fn halves(rect: Rect<f64>) -> (Rect<f64>, Rect<f64>) {
    let (min, max) = (rect.min(), rect.max());
    if rect.width() >= rect.height() {
        let mid = (min.x + max.x) / 2.0;
        (
            Rect::new(min, Coord { x: mid, y: max.y }),
            Rect::new(Coord { x: mid, y: min.y }, max),
        )
    } else {
        let mid = (min.y + max.y) / 2.0;
        (
            Rect::new(min, Coord { x: max.x, y: mid }),
            Rect::new(Coord { x: min.x, y: mid }, max),
        )
    }
}

fn clip_to_rect(geom: &Geometry<f64>, rect: &Rect<f64>) -> Option<Geometry<f64>> {
    let window = MultiPolygon(vec![rect.to_polygon()]);
    if let Some(pg) = to_polygonal(geom) {
        return Some(polygonal_result(window.intersection(&pg)));
    }
    if let Some(lg) = to_lineal(geom) {
        return Some(lineal_result(window.clip(&lg, false)));
    }
    if let Some(points) = to_puntal(geom) {
        let kept: Vec<Point<f64>> = points
            .0
            .into_iter()
            .filter(|p| rect.contains(p) || rect.to_polygon().intersects(p))
            .collect();
        return Some(puntal_result(kept));
    }
    None
}

/// Repairs polygonal geometry by re-noding it through a self-overlay.
///
/// `keep_collapsed` controls what happens when the repaired area is empty:
/// the collapsed input is either represented by its boundary lines or
/// dropped.
pub fn make_valid(geom: &Geometry<f64>, keep_collapsed: bool) -> KernelResult<Geometry<f64>> {
    let Some(pg) = to_polygonal(geom) else {
        // Puntal and lineal geometry has nothing to re-node here.
        return Ok(geom.clone());
    };
    let repaired = pg.union(&MultiPolygon(Vec::new()));
    if repaired.0.is_empty() && keep_collapsed {
        return Ok(crate::accessor::boundary(geom));
    }
    Ok(polygonal_result(repaired))
}

/// Buffer shim.
///
/// Polygonal input is buffered by the kernel's skeleton-based operator
/// (negative radii erode). Puntal and lineal input is expanded by unioning
/// circle and capsule primitives; a zero or negative radius collapses it to
/// an empty polygon, consistent with the kernel's zero-radius contract of
/// keeping only areal content.
pub fn buffer(geom: &Geometry<f64>, radius: f64) -> KernelResult<Geometry<f64>> {
    if !radius.is_finite() {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "radius",
            min: f64::MIN,
            max: f64::MAX,
            value: radius,
        });
    }
    if let Some(pg) = to_polygonal(geom) {
        if radius == 0.0 {
            return Ok(polygonal_result(pg.union(&MultiPolygon(Vec::new()))));
        }
        let mut out = MultiPolygon(Vec::new());
        for p in &pg.0 {
            out = out.union(&geo_buffer::buffer_polygon(p, radius));
        }
        return Ok(polygonal_result(out));
    }
    if radius <= 0.0 {
        return Ok(Geometry::Polygon(Polygon::new(
            LineString(Vec::new()),
            Vec::new(),
        )));
    }
    if let Some(points) = to_puntal(geom) {
        let mut out = MultiPolygon(Vec::new());
        for p in &points.0 {
            out = out.union(&MultiPolygon(vec![circle(
                p.0,
                radius,
                BUFFER_QUADRANT_SEGMENTS,
            )]));
        }
        return Ok(polygonal_result(out));
    }
    if let Some(lines) = to_lineal(geom) {
        let mut out = MultiPolygon(Vec::new());
        for seg in lines.0.iter().flat_map(|ls| ls.lines()) {
            out = out.union(&MultiPolygon(vec![capsule(&seg, radius)]));
        }
        return Ok(polygonal_result(out));
    }
    if let Geometry::GeometryCollection(gc) = geom {
        let mut out = MultiPolygon(Vec::new());
        for member in &gc.0 {
            if let Some(pg) = to_polygonal(&buffer(member, radius)?) {
                out = out.union(&pg);
            }
        }
        return Ok(polygonal_result(out));
    }
    Err(KernelError::unsupported(format!(
        "buffer of {}",
        spatial_fusion_model::type_name(geom)
    )))
}

/// Rectangle plus end caps around one segment.
fn capsule(seg: &Line<f64>, radius: f64) -> Polygon<f64> {
    let (dx, dy) = (seg.end.x - seg.start.x, seg.end.y - seg.start.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len < f64::EPSILON {
        return circle(seg.start, radius, BUFFER_QUADRANT_SEGMENTS);
    }
    let (nx, ny) = (-dy / len * radius, dx / len * radius);
    let steps = (BUFFER_QUADRANT_SEGMENTS * 2) as usize;
    let base = dy.atan2(dx) + std::f64::consts::FRAC_PI_2;
    let mut coords = Vec::with_capacity(steps * 2 + 3);
    coords.push(Coord {
        x: seg.start.x + nx,
        y: seg.start.y + ny,
    });
    // Cap around the start, sweeping the outside half-circle.
    for i in 1..steps {
        let theta = base + std::f64::consts::PI * i as f64 / steps as f64;
        coords.push(Coord {
            x: seg.start.x + radius * theta.cos(),
            y: seg.start.y + radius * theta.sin(),
        });
    }
    coords.push(Coord {
        x: seg.start.x - nx,
        y: seg.start.y - ny,
    });
    coords.push(Coord {
        x: seg.end.x - nx,
        y: seg.end.y - ny,
    });
    // Cap around the end.
    for i in 1..steps {
        let theta = base + std::f64::consts::PI + std::f64::consts::PI * i as f64 / steps as f64;
        coords.push(Coord {
            x: seg.end.x + radius * theta.cos(),
            y: seg.end.y + radius * theta.sin(),
        });
    }
    coords.push(Coord {
        x: seg.end.x + nx,
        y: seg.end.y + ny,
    });
    coords.push(coords[0]);
    Polygon::new(LineString(coords), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;
    use geo_types::{line_string, point, polygon};

    fn unit_square(offset: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: offset, y: 0.), (x: offset + 2., y: 0.),
            (x: offset + 2., y: 2.), (x: offset, y: 2.), (x: offset, y: 0.)
        ])
    }

    #[test]
    fn overlapping_squares_intersect_in_a_square() {
        let result = intersection(&unit_square(0.0), &unit_square(1.0)).unwrap();
        assert!((result.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn difference_removes_the_overlap() {
        let result = difference(&unit_square(0.0), &unit_square(1.0)).unwrap();
        assert!((result.unsigned_area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn sym_difference_keeps_both_flanks() {
        let result = sym_difference(&unit_square(0.0), &unit_square(1.0)).unwrap();
        assert!((result.unsigned_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn line_clipped_by_polygon() {
        let line = Geometry::LineString(line_string![(x: -1., y: 1.), (x: 3., y: 1.)]);
        let result = intersection(&line, &unit_square(0.0)).unwrap();
        let Geometry::LineString(ls) = result else {
            panic!("expected a linestring");
        };
        use geo::EuclideanLength;
        assert!((ls.euclidean_length() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn point_intersection_checks_containment() {
        let inside = Geometry::Point(point! { x: 1.0, y: 1.0 });
        let outside = Geometry::Point(point! { x: 5.0, y: 5.0 });
        assert!(matches!(
            intersection(&inside, &unit_square(0.0)).unwrap(),
            Geometry::Point(_)
        ));
        assert!(matches!(
            intersection(&outside, &unit_square(0.0)).unwrap(),
            Geometry::GeometryCollection(_)
        ));
    }

    #[test]
    fn split_line_by_point() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 10., y: 0.)]);
        let blade = Geometry::Point(point! { x: 4.0, y: 0.0 });
        let Geometry::MultiLineString(parts) = split(&line, &blade).unwrap() else {
            panic!("expected a multilinestring");
        };
        assert_eq!(parts.0.len(), 2);
        assert_eq!(parts.0[0].0.last(), Some(&Coord { x: 4.0, y: 0.0 }));
        assert_eq!(parts.0[1].0.first(), Some(&Coord { x: 4.0, y: 0.0 }));
    }

    #[test]
    fn split_line_by_crossing_line() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 10., y: 0.)]);
        let blade = Geometry::LineString(line_string![(x: 5., y: -1.), (x: 5., y: 1.)]);
        let Geometry::MultiLineString(parts) = split(&line, &blade).unwrap() else {
            panic!("expected a multilinestring");
        };
        assert_eq!(parts.0.len(), 2);
    }

    #[test]
    fn split_without_contact_returns_the_input() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 10., y: 0.)]);
        let blade = Geometry::Point(point! { x: 4.0, y: 2.0 });
        let Geometry::MultiLineString(parts) = split(&line, &blade).unwrap() else {
            panic!("expected a multilinestring");
        };
        assert_eq!(parts.0.len(), 1);
    }

    #[test]
    fn subdivide_keeps_small_geometries_whole() {
        let square = unit_square(0.0);
        let parts = subdivide(&square, 20).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], square);
    }

    #[test]
    fn subdivide_splits_dense_lines() {
        let coords: Vec<Coord<f64>> = (0..40)
            .map(|i| Coord {
                x: f64::from(i),
                y: 0.0,
            })
            .collect();
        let line = Geometry::LineString(LineString(coords));
        let parts = subdivide(&line, 10).unwrap();
        assert!(parts.len() > 1);
        let total: usize = parts.iter().map(geo::CoordsIter::coords_count).sum();
        assert!(total >= 40);
    }

    #[test]
    fn subdivide_validates_vertex_budget() {
        assert!(subdivide(&unit_square(0.0), 4).is_err());
    }

    #[test]
    fn zero_radius_buffer_preserves_polygon_area() {
        let square = unit_square(0.0);
        let result = buffer(&square, 0.0).unwrap();
        assert!((result.unsigned_area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_radius_buffer_of_a_line_is_empty() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.)]);
        let result = buffer(&line, 0.0).unwrap();
        assert!((result.unsigned_area()).abs() < 1e-12);
    }

    #[test]
    fn point_buffer_approximates_a_disc() {
        let p = Geometry::Point(point! { x: 0.0, y: 0.0 });
        let result = buffer(&p, 1.0).unwrap();
        let area = result.unsigned_area();
        assert!(area > 3.0 && area < std::f64::consts::PI, "{area}");
    }

    #[test]
    fn line_buffer_covers_the_path() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 10., y: 0.)]);
        let result = buffer(&line, 1.0).unwrap();
        let area = result.unsigned_area();
        // Rectangle of 20 plus two half-discs.
        assert!(area > 20.0 && area < 20.0 + std::f64::consts::PI + 0.5, "{area}");
    }
}
