//! Construction shims: collecting, polygon building and line carpentry.

use crate::{KernelError, KernelResult};
use geo::{Area, Contains, EuclideanLength};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

/// Gathers geometries into the tightest multi-type that fits: a homogeneous
/// input becomes the matching multi-geometry, anything mixed becomes a
/// collection. Input order is preserved.
pub fn collect(parts: Vec<Geometry<f64>>) -> Geometry<f64> {
    if parts.is_empty() {
        return Geometry::GeometryCollection(GeometryCollection(Vec::new()));
    }
    if parts.iter().all(|g| matches!(g, Geometry::Point(_))) {
        let points = parts
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Point(p) => Some(p),
                _ => None,
            })
            .collect();
        return Geometry::MultiPoint(MultiPoint(points));
    }
    if parts.iter().all(|g| matches!(g, Geometry::LineString(_))) {
        let lines = parts
            .into_iter()
            .filter_map(|g| match g {
                Geometry::LineString(ls) => Some(ls),
                _ => None,
            })
            .collect();
        return Geometry::MultiLineString(MultiLineString(lines));
    }
    if parts.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
        let polygons = parts
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Polygon(p) => Some(p),
                _ => None,
            })
            .collect();
        return Geometry::MultiPolygon(MultiPolygon(polygons));
    }
    Geometry::GeometryCollection(GeometryCollection(parts))
}

fn as_ring(geom: &Geometry<f64>, role: &str) -> KernelResult<LineString<f64>> {
    let Geometry::LineString(ls) = geom else {
        return Err(KernelError::invalid(format!(
            "{role} must be a linestring, got {}",
            spatial_fusion_model::type_name(geom)
        )));
    };
    if ls.0.len() < 4 || !ls.is_closed() {
        return Err(KernelError::invalid(format!(
            "{role} must be a closed ring with at least four coordinates"
        )));
    }
    Ok(ls.clone())
}

/// Builds a polygon from a closed shell ring and optional interior rings.
pub fn make_polygon(
    shell: &Geometry<f64>,
    holes: &[Geometry<f64>],
) -> KernelResult<Geometry<f64>> {
    let exterior = as_ring(shell, "shell")?;
    let interiors = holes
        .iter()
        .map(|h| as_ring(h, "hole"))
        .collect::<KernelResult<Vec<_>>>()?;
    Ok(Geometry::Polygon(Polygon::new(exterior, interiors)))
}

/// Promotes an atomic geometry to its multi-variant; multi-geometries and
/// collections pass through unchanged.
pub fn multi(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Point(p) => Geometry::MultiPoint(MultiPoint(vec![*p])),
        Geometry::LineString(ls) => Geometry::MultiLineString(MultiLineString(vec![ls.clone()])),
        Geometry::Polygon(p) => Geometry::MultiPolygon(MultiPolygon(vec![p.clone()])),
        other => other.clone(),
    }
}

/// Extracts the members of the requested topological dimension (1 puntal,
/// 2 lineal, 3 areal) as a multi-geometry. With no dimension given, the
/// highest dimension present in the input wins.
pub fn collection_extract(
    geom: &Geometry<f64>,
    dimension: Option<i32>,
) -> KernelResult<Geometry<f64>> {
    let target = match dimension {
        Some(d) if (1..=3).contains(&d) => d,
        Some(d) => {
            return Err(KernelError::ArgumentOutOfRange {
                arg: "geomType",
                min: 1.0,
                max: 3.0,
                value: f64::from(d),
            })
        }
        None => highest_dimension(geom),
    };
    let mut members = Vec::new();
    extract_into(geom, target, &mut members);
    Ok(collect(members))
}

fn highest_dimension(geom: &Geometry<f64>) -> i32 {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 1,
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => 2,
        Geometry::GeometryCollection(gc) => {
            gc.0.iter().map(highest_dimension).max().unwrap_or(1)
        }
        _ => 3,
    }
}

fn extract_into(geom: &Geometry<f64>, target: i32, out: &mut Vec<Geometry<f64>>) {
    match geom {
        Geometry::Point(_) if target == 1 => out.push(geom.clone()),
        Geometry::MultiPoint(mp) if target == 1 => {
            out.extend(mp.0.iter().map(|p| Geometry::Point(*p)));
        }
        Geometry::LineString(_) if target == 2 => out.push(geom.clone()),
        Geometry::MultiLineString(mls) if target == 2 => {
            out.extend(mls.0.iter().map(|ls| Geometry::LineString(ls.clone())));
        }
        Geometry::Polygon(_) if target == 3 => out.push(geom.clone()),
        Geometry::MultiPolygon(mp) if target == 3 => {
            out.extend(mp.0.iter().map(|p| Geometry::Polygon(p.clone())));
        }
        Geometry::GeometryCollection(gc) => {
            for member in &gc.0 {
                extract_into(member, target, out);
            }
        }
        _ => {}
    }
}

/// Connects the points of a multipoint into a linestring, in input order.
pub fn line_from_multi_point(geom: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    let Geometry::MultiPoint(mp) = geom else {
        return Err(KernelError::invalid(format!(
            "expected a multipoint, got {}",
            spatial_fusion_model::type_name(geom)
        )));
    };
    if mp.0.len() < 2 {
        return Err(KernelError::invalid(
            "a linestring needs at least two points",
        ));
    }
    Ok(Geometry::LineString(LineString(
        mp.0.iter().map(|p| p.0).collect(),
    )))
}

/// Stitches the paths of lineal input back together wherever endpoints meet,
/// reversing paths as needed. Non-lineal input merges to the empty
/// collection.
pub fn line_merge(geom: &Geometry<f64>) -> Geometry<f64> {
    let lines: Vec<LineString<f64>> = match geom {
        Geometry::LineString(ls) => vec![ls.clone()],
        Geometry::MultiLineString(mls) => mls.0.clone(),
        _ => return Geometry::GeometryCollection(GeometryCollection(Vec::new())),
    };
    let mut merged: Vec<LineString<f64>> = Vec::new();
    for ls in lines {
        if ls.0.len() < 2 {
            continue;
        }
        merged.push(ls);
        loop {
            let Some(current) = merged.pop() else {
                break;
            };
            match try_join(&current, &mut merged) {
                Some(joined) => merged.push(joined),
                None => {
                    merged.push(current);
                    break;
                }
            }
        }
    }
    match merged.len() {
        0 => Geometry::GeometryCollection(GeometryCollection(Vec::new())),
        1 => Geometry::LineString(merged.remove(0)),
        _ => Geometry::MultiLineString(MultiLineString(merged)),
    }
}

/// Joins `current` with the first mergeable path in `pool`, removing it from
/// the pool on success.
fn try_join(
    current: &LineString<f64>,
    pool: &mut Vec<LineString<f64>>,
) -> Option<LineString<f64>> {
    let (start, end) = (*current.0.first()?, *current.0.last()?);
    for i in 0..pool.len() {
        let candidate = &pool[i];
        let (cs, ce) = (*candidate.0.first()?, *candidate.0.last()?);
        let joined = if end == cs {
            Some(chain(&current.0, &candidate.0))
        } else if end == ce {
            let reversed: Vec<Coord<f64>> = candidate.0.iter().rev().copied().collect();
            Some(chain(&current.0, &reversed))
        } else if start == ce {
            Some(chain(&candidate.0, &current.0))
        } else if start == cs {
            let reversed: Vec<Coord<f64>> = candidate.0.iter().rev().copied().collect();
            Some(chain(&reversed, &current.0))
        } else {
            None
        };
        if let Some(coords) = joined {
            pool.remove(i);
            return Some(LineString(coords));
        }
    }
    None
}

fn chain(head: &[Coord<f64>], tail: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut coords = head.to_vec();
    coords.extend_from_slice(&tail[1..]);
    coords
}

/// The sub-path of a linestring between two length fractions.
///
/// Equal fractions collapse to the interpolated point at that fraction.
pub fn line_substring(
    geom: &Geometry<f64>,
    start_fraction: f64,
    end_fraction: f64,
) -> KernelResult<Geometry<f64>> {
    let ls = lineal_input(geom)?;
    for (arg, value) in [("startFraction", start_fraction), ("endFraction", end_fraction)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(KernelError::ArgumentOutOfRange {
                arg,
                min: 0.0,
                max: 1.0,
                value,
            });
        }
    }
    if start_fraction > end_fraction {
        return Err(KernelError::invalid(
            "start fraction must not exceed end fraction",
        ));
    }
    if start_fraction == end_fraction {
        return interpolate(ls, start_fraction).map(Geometry::Point);
    }
    let total = ls.euclidean_length();
    if total == 0.0 {
        return Err(KernelError::invalid("substring of a zero-length linestring"));
    }
    let (from, to) = (start_fraction * total, end_fraction * total);
    let mut coords: Vec<Coord<f64>> = Vec::new();
    let mut walked = 0.0;
    for seg in ls.lines() {
        let len = seg.euclidean_length();
        let (seg_start, seg_end) = (walked, walked + len);
        walked = seg_end;
        if len == 0.0 || seg_end < from {
            continue;
        }
        if seg_start > to {
            break;
        }
        let entry = ((from - seg_start) / len).clamp(0.0, 1.0);
        let exit = ((to - seg_start) / len).clamp(0.0, 1.0);
        let at = |t: f64| Coord {
            x: seg.start.x + (seg.end.x - seg.start.x) * t,
            y: seg.start.y + (seg.end.y - seg.start.y) * t,
        };
        if coords.is_empty() {
            coords.push(at(entry));
        }
        let exit_coord = at(exit);
        if coords.last() != Some(&exit_coord) {
            coords.push(exit_coord);
        }
    }
    Ok(Geometry::LineString(LineString(coords)))
}

/// The point at the given length fraction along a linestring.
pub fn line_interpolate_point(
    geom: &Geometry<f64>,
    fraction: f64,
) -> KernelResult<Geometry<f64>> {
    let ls = lineal_input(geom)?;
    if !(0.0..=1.0).contains(&fraction) {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "fraction",
            min: 0.0,
            max: 1.0,
            value: fraction,
        });
    }
    interpolate(ls, fraction).map(Geometry::Point)
}

fn lineal_input(geom: &Geometry<f64>) -> KernelResult<&LineString<f64>> {
    match geom {
        Geometry::LineString(ls) if ls.0.len() >= 2 => Ok(ls),
        Geometry::LineString(_) => Err(KernelError::invalid("degenerate linestring")),
        other => Err(KernelError::invalid(format!(
            "expected a linestring, got {}",
            spatial_fusion_model::type_name(other)
        ))),
    }
}

fn interpolate(ls: &LineString<f64>, fraction: f64) -> KernelResult<Point<f64>> {
    use geo::LineInterpolatePoint;
    ls.line_interpolate_point(fraction)
        .ok_or_else(|| KernelError::invalid("cannot interpolate along a degenerate linestring"))
}

/// Forms areal geometry from the closed rings of lineal input. Rings nested
/// inside another ring become holes; deeper nesting alternates shell/hole in
/// the usual even/odd fashion.
pub fn build_area(geom: &Geometry<f64>) -> KernelResult<Geometry<f64>> {
    let mut rings: Vec<LineString<f64>> = Vec::new();
    collect_rings(geom, &mut rings)?;
    rings.retain(|r| r.0.len() >= 4 && r.is_closed());
    if rings.is_empty() {
        return Ok(Geometry::GeometryCollection(GeometryCollection(Vec::new())));
    }
    // Largest first, so every ring's parent is already placed when we reach it.
    let mut keyed: Vec<(f64, LineString<f64>)> = rings
        .into_iter()
        .map(|r| (Polygon::new(r.clone(), Vec::new()).unsigned_area(), r))
        .collect();
    keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    let rings = keyed.into_iter().map(|(_, r)| r);
    let mut shells: Vec<Polygon<f64>> = Vec::new();
    let mut depths: Vec<usize> = Vec::new();
    for ring in rings {
        let probe = Point(ring.0[0]);
        let depth = shells
            .iter()
            .filter(|shell| shell.contains(&probe))
            .count();
        if depth % 2 == 1 {
            // Odd nesting depth: a hole of the innermost enclosing shell.
            if let Some(parent) = shells
                .iter_mut()
                .zip(&depths)
                .filter(|(shell, d)| **d == depth - 1 && shell.contains(&probe))
                .map(|(shell, _)| shell)
                .last()
            {
                parent.interiors_push(ring);
                continue;
            }
        }
        shells.push(Polygon::new(ring, Vec::new()));
        depths.push(depth);
    }
    Ok(match shells.len() {
        1 => Geometry::Polygon(shells.remove(0)),
        _ => Geometry::MultiPolygon(MultiPolygon(shells)),
    })
}

fn collect_rings(geom: &Geometry<f64>, out: &mut Vec<LineString<f64>>) -> KernelResult<()> {
    match geom {
        Geometry::LineString(ls) => out.push(ls.clone()),
        Geometry::MultiLineString(mls) => out.extend(mls.0.iter().cloned()),
        Geometry::GeometryCollection(gc) => {
            for member in &gc.0 {
                collect_rings(member, out)?;
            }
        }
        other => {
            return Err(KernelError::invalid(format!(
                "area construction expects lineal input, got {}",
                spatial_fusion_model::type_name(other)
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::{line_string, point};

    #[test]
    fn collect_builds_the_tightest_multi_type() {
        let points = vec![
            Geometry::Point(point! { x: 1.0, y: 1.0 }),
            Geometry::Point(point! { x: 2.0, y: 2.0 }),
        ];
        assert!(matches!(collect(points), Geometry::MultiPoint(_)));

        let mixed = vec![
            Geometry::Point(point! { x: 1.0, y: 1.0 }),
            Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.)]),
        ];
        assert!(matches!(collect(mixed), Geometry::GeometryCollection(_)));
    }

    #[test]
    fn make_polygon_rejects_open_shells() {
        let open = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)]);
        assert!(make_polygon(&open, &[]).is_err());

        let shell = Geometry::LineString(line_string![
            (x: 0., y: 0.), (x: 4., y: 0.), (x: 4., y: 4.), (x: 0., y: 4.), (x: 0., y: 0.)
        ]);
        let hole = Geometry::LineString(line_string![
            (x: 1., y: 1.), (x: 2., y: 1.), (x: 2., y: 2.), (x: 1., y: 1.)
        ]);
        let Geometry::Polygon(p) = make_polygon(&shell, std::slice::from_ref(&hole)).unwrap()
        else {
            panic!("expected a polygon");
        };
        assert_eq!(p.interiors().len(), 1);
    }

    #[test]
    fn multi_promotes_atoms_only() {
        let p = Geometry::Point(point! { x: 1.0, y: 1.0 });
        assert!(matches!(multi(&p), Geometry::MultiPoint(_)));
        let already = multi(&p);
        assert_eq!(multi(&already), already);
    }

    #[test]
    fn collection_extract_defaults_to_the_highest_dimension() {
        let mixed = Geometry::GeometryCollection(GeometryCollection(vec![
            Geometry::Point(point! { x: 0.0, y: 0.0 }),
            Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 1.)]),
        ]));
        assert!(matches!(
            collection_extract(&mixed, None).unwrap(),
            Geometry::MultiLineString(_)
        ));
        assert!(matches!(
            collection_extract(&mixed, Some(1)).unwrap(),
            Geometry::MultiPoint(_)
        ));
        assert!(collection_extract(&mixed, Some(4)).is_err());
    }

    #[test]
    fn line_merge_stitches_touching_paths() {
        let mls = Geometry::MultiLineString(MultiLineString(vec![
            line_string![(x: 0., y: 0.), (x: 1., y: 0.)],
            line_string![(x: 2., y: 0.), (x: 1., y: 0.)],
        ]));
        let Geometry::LineString(merged) = line_merge(&mls) else {
            panic!("expected one merged linestring");
        };
        assert_eq!(merged.0.len(), 3);
    }

    #[test]
    fn line_merge_keeps_disjoint_paths_apart() {
        let mls = Geometry::MultiLineString(MultiLineString(vec![
            line_string![(x: 0., y: 0.), (x: 1., y: 0.)],
            line_string![(x: 5., y: 5.), (x: 6., y: 5.)],
        ]));
        assert!(matches!(line_merge(&mls), Geometry::MultiLineString(_)));
    }

    #[test]
    fn substring_walks_cumulative_length() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 10., y: 0.)]);
        let Geometry::LineString(part) = line_substring(&line, 0.2, 0.6).unwrap() else {
            panic!("expected a linestring");
        };
        assert_eq!(part.0, vec![Coord { x: 2.0, y: 0.0 }, Coord { x: 6.0, y: 0.0 }]);

        let Geometry::Point(mid) = line_substring(&line, 0.5, 0.5).unwrap() else {
            panic!("expected a point");
        };
        assert_eq!(mid, Point::new(5.0, 0.0));
    }

    #[test]
    fn interpolate_point_along_a_bend() {
        let line = Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.)]);
        let Geometry::Point(p) = line_interpolate_point(&line, 0.75).unwrap() else {
            panic!("expected a point");
        };
        assert_relative_eq!(p.x(), 1.0);
        assert_relative_eq!(p.y(), 0.5);
        assert!(line_interpolate_point(&line, 1.5).is_err());
    }

    #[test]
    fn build_area_nests_holes() {
        let rings = Geometry::MultiLineString(MultiLineString(vec![
            line_string![(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 0., y: 10.), (x: 0., y: 0.)],
            line_string![(x: 2., y: 2.), (x: 6., y: 2.), (x: 6., y: 6.), (x: 2., y: 6.), (x: 2., y: 2.)],
        ]));
        let Geometry::Polygon(p) = build_area(&rings).unwrap() else {
            panic!("expected a polygon");
        };
        assert_eq!(p.interiors().len(), 1);
        assert_relative_eq!(p.unsigned_area(), 84.0);
    }

    #[test]
    fn line_from_multi_point_keeps_order() {
        let mp = Geometry::MultiPoint(MultiPoint(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
        ]));
        let Geometry::LineString(ls) = line_from_multi_point(&mp).unwrap() else {
            panic!("expected a linestring");
        };
        assert_eq!(ls.0.len(), 3);
        assert_eq!(ls.0[1], Coord { x: 1.0, y: 1.0 });
    }
}
