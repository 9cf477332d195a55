//! Hulls, enclosing circles and central points.

use crate::{KernelError, KernelResult};
use geo::{ConcaveHull, ConvexHull, CoordsIter, InteriorPoint};
use geo_types::{Coord, Geometry, GeometryCollection, LineString, MultiPoint, Point, Polygon};

pub fn centroid(geom: &Geometry<f64>) -> Geometry<f64> {
    use geo::Centroid;
    match geom.centroid() {
        Some(p) => Geometry::Point(p),
        None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
    }
}

pub fn point_on_surface(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom.interior_point() {
        Some(p) => Geometry::Point(p),
        None => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
    }
}

/// Convex hull over all vertices; degenerate inputs collapse to a point or
/// linestring like the kernel's own hull contract.
pub fn convex_hull(geom: &Geometry<f64>) -> Geometry<f64> {
    let mut coords: Vec<Coord<f64>> = geom.coords_iter().collect();
    coords.dedup();
    match coords.len() {
        0 => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        1 => Geometry::Point(Point(coords[0])),
        2 => Geometry::LineString(LineString(coords)),
        _ => {
            let hull = MultiPoint(coords.into_iter().map(Point).collect()).convex_hull();
            Geometry::Polygon(hull)
        }
    }
}

/// Concave hull over all vertices. The concavity knob is forwarded to the
/// kernel; hole generation is not supported and the flag only widens the
/// accepted signatures.
pub fn concave_hull(
    geom: &Geometry<f64>,
    pct_convex: f64,
    _allow_holes: bool,
) -> KernelResult<Geometry<f64>> {
    if !(0.0..=1.0).contains(&pct_convex) {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "pctConvex",
            min: 0.0,
            max: 1.0,
            value: pct_convex,
        });
    }
    let coords: Vec<Point<f64>> = geom.coords_iter().map(Point).collect();
    if coords.len() < 3 {
        return Ok(convex_hull(geom));
    }
    Ok(Geometry::Polygon(
        MultiPoint(coords).concave_hull(pct_convex.max(f64::EPSILON)),
    ))
}

/// Exact minimum enclosing circle over the geometry's vertices
/// (Welzl's move-to-front algorithm on the deduplicated vertex set).
pub fn minimum_bounding_circle(geom: &Geometry<f64>) -> KernelResult<(Point<f64>, f64)> {
    let mut coords: Vec<Coord<f64>> = geom.coords_iter().collect();
    coords.sort_by(|a, b| (a.x, a.y).partial_cmp(&(b.x, b.y)).unwrap_or(std::cmp::Ordering::Equal));
    coords.dedup();
    if coords.is_empty() {
        return Err(KernelError::invalid("bounding circle of an empty geometry"));
    }
    let (center, r2) = welzl(&coords, 0, &mut Vec::new());
    Ok((Point(center), r2.sqrt()))
}

fn welzl(coords: &[Coord<f64>], n: usize, boundary: &mut Vec<Coord<f64>>) -> (Coord<f64>, f64) {
    if n == coords.len() || boundary.len() == 3 {
        return trivial_circle(boundary);
    }
    let c = coords[n];
    let (center, r2) = welzl(coords, n + 1, boundary);
    if dist2(center, c) <= r2 * (1.0 + 1e-12) {
        return (center, r2);
    }
    boundary.push(c);
    let result = welzl(coords, n + 1, boundary);
    boundary.pop();
    result
}

fn trivial_circle(boundary: &[Coord<f64>]) -> (Coord<f64>, f64) {
    match boundary {
        [] => (Coord { x: 0.0, y: 0.0 }, 0.0),
        [a] => (*a, 0.0),
        [a, b] => {
            let center = Coord {
                x: (a.x + b.x) / 2.0,
                y: (a.y + b.y) / 2.0,
            };
            (center, dist2(center, *a))
        }
        [a, b, c] => circumcircle(*a, *b, *c),
        _ => (Coord { x: 0.0, y: 0.0 }, 0.0),
    }
}

fn circumcircle(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> (Coord<f64>, f64) {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < f64::EPSILON {
        // Collinear; fall back to the diameter of the farthest pair.
        let pairs = [(a, b), (a, c), (b, c)];
        let (p, q) = pairs
            .into_iter()
            .max_by(|l, r| {
                dist2(l.0, l.1)
                    .partial_cmp(&dist2(r.0, r.1))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or((a, b));
        return trivial_circle(&[p, q]);
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let center = Coord {
        x: (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        y: (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    };
    (center, dist2(center, a))
}

fn dist2(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

/// The minimum bounding circle rendered as a polygon with
/// `quadrant_segments` segments per quadrant. A zero-radius circle collapses
/// to the center point.
pub fn minimum_bounding_circle_polygon(
    geom: &Geometry<f64>,
    quadrant_segments: i32,
) -> KernelResult<Geometry<f64>> {
    if quadrant_segments < 1 {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "quadrantSegments",
            min: 1.0,
            max: f64::from(i32::MAX),
            value: f64::from(quadrant_segments),
        });
    }
    let (center, radius) = minimum_bounding_circle(geom)?;
    if radius == 0.0 {
        return Ok(Geometry::Point(center));
    }
    Ok(Geometry::Polygon(circle(center.0, radius, quadrant_segments)))
}

/// Circle approximation used by buffer and bounding-circle shims.
pub(crate) fn circle(center: Coord<f64>, radius: f64, quadrant_segments: i32) -> Polygon<f64> {
    let steps = (quadrant_segments * 4).max(4) as usize;
    let mut coords = Vec::with_capacity(steps + 1);
    for i in 0..steps {
        let theta = std::f64::consts::TAU * i as f64 / steps as f64;
        coords.push(Coord {
            x: center.x + radius * theta.cos(),
            y: center.y + radius * theta.sin(),
        });
    }
    coords.push(coords[0]);
    Polygon::new(LineString(coords), Vec::new())
}

/// Weiszfeld iteration for the geometric median of a (multi)point.
///
/// Returns the best estimate after at most `max_iter` rounds. When the
/// iteration has not converged within `tolerance` and `fail_if_not_converged`
/// is set, the call fails instead of returning the estimate.
pub fn geometric_median(
    geom: &Geometry<f64>,
    tolerance: f64,
    max_iter: i32,
    fail_if_not_converged: bool,
) -> KernelResult<Geometry<f64>> {
    let points: Vec<Coord<f64>> = match geom {
        Geometry::Point(p) => vec![p.0],
        Geometry::MultiPoint(mp) => mp.0.iter().map(|p| p.0).collect(),
        other => {
            return Err(KernelError::unsupported(format!(
                "geometric median requires a (multi)point, got {}",
                spatial_fusion_model::type_name(other)
            )))
        }
    };
    if points.is_empty() {
        return Err(KernelError::invalid("geometric median of an empty geometry"));
    }
    if max_iter < 1 {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "maxIter",
            min: 1.0,
            max: f64::from(i32::MAX),
            value: f64::from(max_iter),
        });
    }

    let mut current = Coord {
        x: points.iter().map(|c| c.x).sum::<f64>() / points.len() as f64,
        y: points.iter().map(|c| c.y).sum::<f64>() / points.len() as f64,
    };
    let mut converged = false;
    for _ in 0..max_iter {
        let mut num = Coord { x: 0.0, y: 0.0 };
        let mut denom = 0.0;
        for p in &points {
            let d = dist2(current, *p).sqrt();
            if d < f64::EPSILON {
                continue;
            }
            num.x += p.x / d;
            num.y += p.y / d;
            denom += 1.0 / d;
        }
        if denom == 0.0 {
            // The estimate sits exactly on every remaining input point.
            converged = true;
            break;
        }
        let next = Coord {
            x: num.x / denom,
            y: num.y / denom,
        };
        let delta = dist2(current, next).sqrt();
        current = next;
        if delta <= tolerance {
            converged = true;
            break;
        }
    }
    if !converged && fail_if_not_converged {
        return Err(KernelError::NotConverged {
            tolerance,
            max_iter,
        });
    }
    Ok(Geometry::Point(Point(current)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::EuclideanDistance;
    use geo_types::point;

    fn multipoint(coords: &[(f64, f64)]) -> Geometry<f64> {
        Geometry::MultiPoint(MultiPoint(
            coords.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        ))
    }

    #[test]
    fn bounding_circle_of_single_point_has_zero_radius() {
        let p = Geometry::Point(point! { x: 3.0, y: 4.0 });
        let (center, radius) = minimum_bounding_circle(&p).unwrap();
        assert_eq!(center, Point::new(3.0, 4.0));
        assert_relative_eq!(radius, 0.0);
        assert!(matches!(
            minimum_bounding_circle_polygon(&p, 48).unwrap(),
            Geometry::Point(_)
        ));
    }

    #[test]
    fn bounding_circle_of_two_points_uses_their_midpoint() {
        let g = multipoint(&[(0.0, 0.0), (4.0, 0.0)]);
        let (center, radius) = minimum_bounding_circle(&g).unwrap();
        assert_eq!(center, Point::new(2.0, 0.0));
        assert_relative_eq!(radius, 2.0);
    }

    #[test]
    fn bounding_circle_encloses_every_vertex() {
        let g = multipoint(&[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (1.0, 1.0)]);
        let (center, radius) = minimum_bounding_circle(&g).unwrap();
        for &(x, y) in &[(0.0, 0.0), (4.0, 0.0), (2.0, 3.0), (1.0, 1.0)] {
            let d = center.euclidean_distance(&Point::new(x, y));
            assert!(d <= radius + 1e-9, "vertex ({x}, {y}) outside circle");
        }
    }

    #[test]
    fn median_of_square_is_its_center() {
        let g = multipoint(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let Geometry::Point(m) = geometric_median(&g, 1e-6, 1000, false).unwrap() else {
            panic!("expected a point");
        };
        assert_relative_eq!(m.x(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(m.y(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn median_fails_fast_when_asked_to() {
        let g = multipoint(&[(0.0, 0.0), (10.0, 0.0), (3.0, 7.0), (1.0, 9.0)]);
        let result = geometric_median(&g, 1e-15, 1, true);
        assert!(matches!(result, Err(KernelError::NotConverged { .. })));
        // Relaxed semantics substitute the best effort estimate instead.
        assert!(geometric_median(&g, 1e-15, 1, false).is_ok());
    }

    #[test]
    fn convex_hull_degenerates_for_collinear_input() {
        let two = multipoint(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(convex_hull(&two), Geometry::LineString(_)));
    }
}
