//! Planar measurement shims.

use crate::{KernelError, KernelResult};
use geo::{
    Area, CoordsIter, EuclideanDistance, EuclideanLength, FrechetDistance, HasDimensions,
    Intersects,
};
use geo_types::{Coord, Geometry, Line, Point};

pub fn area(geom: &Geometry<f64>) -> f64 {
    geom.unsigned_area()
}

/// Perimeter for areal input, path length for lineal input, zero for points.
pub fn length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::Line(l) => l.euclidean_length(),
        Geometry::LineString(ls) => ls.euclidean_length(),
        Geometry::MultiLineString(mls) => mls.euclidean_length(),
        Geometry::Polygon(p) => {
            p.exterior().euclidean_length()
                + p.interiors().iter().map(EuclideanLength::euclidean_length).sum::<f64>()
        }
        Geometry::MultiPolygon(mp) => {
            mp.0.iter().map(|p| length(&Geometry::Polygon(p.clone()))).sum()
        }
        Geometry::GeometryCollection(gc) => gc.0.iter().map(length).sum(),
        Geometry::Rect(r) => length(&Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => length(&Geometry::Polygon(t.to_polygon())),
    }
}

/// All straight segments of a geometry.
pub(crate) fn segments(geom: &Geometry<f64>) -> Vec<Line<f64>> {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Vec::new(),
        Geometry::Line(l) => vec![*l],
        Geometry::LineString(ls) => ls.lines().collect(),
        Geometry::MultiLineString(mls) => mls.0.iter().flat_map(|ls| ls.lines()).collect(),
        Geometry::Polygon(p) => {
            let mut out: Vec<Line<f64>> = p.exterior().lines().collect();
            for ring in p.interiors() {
                out.extend(ring.lines());
            }
            out
        }
        Geometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .flat_map(|p| segments(&Geometry::Polygon(p.clone())))
            .collect(),
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(segments).collect(),
        Geometry::Rect(r) => segments(&Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => segments(&Geometry::Polygon(t.to_polygon())),
    }
}

/// Minimum planar distance between two geometries.
///
/// Zero when the geometries intersect; otherwise the nearest pair always
/// involves a vertex of one side, so scanning vertex-versus-segment pairs is
/// exact.
pub fn distance(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(KernelError::invalid("distance of an empty geometry"));
    }
    if a.intersects(b) {
        return Ok(0.0);
    }
    Ok(one_sided(a, b).min(one_sided(b, a)))
}

fn one_sided(from: &Geometry<f64>, to: &Geometry<f64>) -> f64 {
    let to_segments = segments(to);
    let mut best = f64::INFINITY;
    for c in from.coords_iter() {
        let p = Point(c);
        if to_segments.is_empty() {
            for t in to.coords_iter() {
                best = best.min(p.euclidean_distance(&Point(t)));
            }
        } else {
            for seg in &to_segments {
                best = best.min(seg.euclidean_distance(&p));
            }
        }
    }
    best
}

/// Minimum 3D distance; vertex-based, with missing Z ordinates read as zero.
pub fn distance_3d(
    a: &Geometry<f64>,
    az: &[f64],
    b: &Geometry<f64>,
    bz: &[f64],
) -> KernelResult<f64> {
    let av = with_z(a, az);
    let bv = with_z(b, bz);
    if av.is_empty() || bv.is_empty() {
        return Err(KernelError::invalid("3d distance of an empty geometry"));
    }
    let mut best = f64::INFINITY;
    for (ac, azv) in &av {
        for (bc, bzv) in &bv {
            let d = ((ac.x - bc.x).powi(2) + (ac.y - bc.y).powi(2) + (azv - bzv).powi(2)).sqrt();
            best = best.min(d);
        }
    }
    Ok(best)
}

fn with_z(geom: &Geometry<f64>, z: &[f64]) -> Vec<(Coord<f64>, f64)> {
    geom.coords_iter()
        .enumerate()
        .map(|(i, c)| (c, z.get(i).copied().unwrap_or(0.0)))
        .collect()
}

/// Azimuth from the first point to the second, clockwise from north, in
/// radians within `[0, 2π)`.
pub fn azimuth(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<f64> {
    let (Geometry::Point(a), Geometry::Point(b)) = (a, b) else {
        return Err(KernelError::invalid("azimuth requires two points"));
    };
    let angle = (b.x() - a.x()).atan2(b.y() - a.y());
    Ok(angle.rem_euclid(std::f64::consts::TAU))
}

/// Non-reflex angle between the vectors `p1→p2` and `p3→p4`, in radians.
pub fn angle_four_points(
    p1: &Geometry<f64>,
    p2: &Geometry<f64>,
    p3: &Geometry<f64>,
    p4: &Geometry<f64>,
) -> KernelResult<f64> {
    let (a, b, c, d) = (
        as_point(p1)?,
        as_point(p2)?,
        as_point(p3)?,
        as_point(p4)?,
    );
    Ok(vector_angle(
        (b.x() - a.x(), b.y() - a.y()),
        (d.x() - c.x(), d.y() - c.y()),
    ))
}

/// Angle at `p2` between the rays towards `p1` and `p3`.
pub fn angle_three_points(
    p1: &Geometry<f64>,
    p2: &Geometry<f64>,
    p3: &Geometry<f64>,
) -> KernelResult<f64> {
    let (a, b, c) = (as_point(p1)?, as_point(p2)?, as_point(p3)?);
    Ok(vector_angle(
        (a.x() - b.x(), a.y() - b.y()),
        (c.x() - b.x(), c.y() - b.y()),
    ))
}

/// Angle between the direction vectors of two lines.
pub fn angle_two_lines(l1: &Geometry<f64>, l2: &Geometry<f64>) -> KernelResult<f64> {
    let d1 = direction(l1)?;
    let d2 = direction(l2)?;
    Ok(vector_angle(d1, d2))
}

fn direction(geom: &Geometry<f64>) -> KernelResult<(f64, f64)> {
    let Geometry::LineString(ls) = geom else {
        return Err(KernelError::invalid("angle requires linestrings"));
    };
    let (Some(first), Some(last)) = (ls.0.first(), ls.0.last()) else {
        return Err(KernelError::invalid("angle of an empty linestring"));
    };
    Ok((last.x - first.x, last.y - first.y))
}

fn vector_angle(u: (f64, f64), v: (f64, f64)) -> f64 {
    let dot = u.0 * v.0 + u.1 * v.1;
    let cross = u.0 * v.1 - u.1 * v.0;
    cross.atan2(dot).abs()
}

fn as_point(geom: &Geometry<f64>) -> KernelResult<&Point<f64>> {
    match geom {
        Geometry::Point(p) => Ok(p),
        other => Err(KernelError::invalid(format!(
            "expected a point, got {}",
            spatial_fusion_model::type_name(other)
        ))),
    }
}

pub fn degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Discrete Fréchet distance between two linestrings.
pub fn frechet_distance(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<f64> {
    let (Geometry::LineString(a), Geometry::LineString(b)) = (a, b) else {
        return Err(KernelError::invalid(
            "Fréchet distance requires two linestrings",
        ));
    };
    Ok(a.frechet_distance(b))
}

/// Discrete Hausdorff distance over the geometries' vertices.
pub fn hausdorff_distance(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<f64> {
    Ok(directed_hausdorff(a, b).max(directed_hausdorff(b, a)))
}

/// Hausdorff distance after densifying each segment into `1/density_frac`
/// parts, tightening the discrete approximation.
pub fn hausdorff_distance_densified(
    a: &Geometry<f64>,
    b: &Geometry<f64>,
    density_frac: f64,
) -> KernelResult<f64> {
    if !(density_frac > 0.0 && density_frac <= 1.0) {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "densityFrac",
            min: 0.0,
            max: 1.0,
            value: density_frac,
        });
    }
    let da = densify_coords(a, density_frac);
    let db = densify_coords(b, density_frac);
    Ok(point_set_hausdorff(&da, &db).max(point_set_hausdorff(&db, &da)))
}

fn directed_hausdorff(a: &Geometry<f64>, b: &Geometry<f64>) -> f64 {
    let bs: Vec<Coord<f64>> = b.coords_iter().collect();
    let mut worst = 0.0_f64;
    for c in a.coords_iter() {
        let mut best = f64::INFINITY;
        for t in &bs {
            best = best.min(Point(c).euclidean_distance(&Point(*t)));
        }
        worst = worst.max(best);
    }
    worst
}

fn densify_coords(geom: &Geometry<f64>, frac: f64) -> Vec<Coord<f64>> {
    let parts = (1.0 / frac).ceil() as usize;
    let mut out: Vec<Coord<f64>> = geom.coords_iter().collect();
    for seg in segments(geom) {
        for i in 1..parts {
            let t = i as f64 / parts as f64;
            out.push(Coord {
                x: seg.start.x + (seg.end.x - seg.start.x) * t,
                y: seg.start.y + (seg.end.y - seg.start.y) * t,
            });
        }
    }
    out
}

fn point_set_hausdorff(a: &[Coord<f64>], b: &[Coord<f64>]) -> f64 {
    let mut worst = 0.0_f64;
    for c in a {
        let mut best = f64::INFINITY;
        for t in b {
            best = best.min(Point(*c).euclidean_distance(&Point(*t)));
        }
        worst = worst.max(best);
    }
    worst
}

/// Nearest point on `a` to `b`.
pub fn closest_point(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    use geo::{Closest, ClosestPoint};
    if a.is_empty() || b.is_empty() {
        return Err(KernelError::invalid("closest point of an empty geometry"));
    }
    let mut best: Option<(f64, Point<f64>)> = None;
    let mut consider = |candidate: Point<f64>, witness_distance: f64| {
        if best.map_or(true, |(d, _)| witness_distance < d) {
            best = Some((witness_distance, candidate));
        }
    };
    // Vertices of `a` measured against the whole of `b`.
    for c in a.coords_iter() {
        let p = Point(c);
        let d = distance(&Geometry::Point(p), b)?;
        consider(p, d);
    }
    // Projections of `b`'s vertices onto segments of `a`.
    for seg in segments(a) {
        for c in b.coords_iter() {
            let witness = Point(c);
            let projected = match seg.closest_point(&witness) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => p,
                Closest::Indeterminate => continue,
            };
            consider(projected, projected.euclidean_distance(&witness));
        }
    }
    best.map(|(_, p)| Geometry::Point(p))
        .ok_or_else(|| KernelError::invalid("no closest point"))
}
