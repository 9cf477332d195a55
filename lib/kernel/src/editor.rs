//! Editor shims: vertex surgery and coordinate rewrites.
//!
//! Every operation returns a new geometry; inputs are never mutated. Vertex
//! surgery (add/remove/set point) is defined for linestrings only, matching
//! the catalog's editor family contract.

use crate::{KernelError, KernelResult};
use geo::{MapCoords, Simplify, Winding};
use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Polygon,
};

fn as_linestring(geom: &Geometry<f64>) -> KernelResult<&LineString<f64>> {
    match geom {
        Geometry::LineString(ls) => Ok(ls),
        other => Err(KernelError::invalid(format!(
            "expected a linestring, got {}",
            spatial_fusion_model::type_name(other)
        ))),
    }
}

fn as_coord(geom: &Geometry<f64>) -> KernelResult<Coord<f64>> {
    match geom {
        Geometry::Point(p) => Ok(p.0),
        other => Err(KernelError::invalid(format!(
            "expected a point, got {}",
            spatial_fusion_model::type_name(other)
        ))),
    }
}

/// Inserts a vertex into a linestring.
///
/// `index` is the 0-based position of the new vertex; `None` or `-1` appends.
pub fn add_point(
    geom: &Geometry<f64>,
    point: &Geometry<f64>,
    index: Option<i32>,
) -> KernelResult<Geometry<f64>> {
    let ls = as_linestring(geom)?;
    let c = as_coord(point)?;
    let mut coords = ls.0.clone();
    let at = match index {
        None | Some(-1) => coords.len(),
        Some(i) if i >= 0 && (i as usize) <= coords.len() => i as usize,
        Some(i) => {
            return Err(KernelError::Geometry(
                spatial_fusion_model::GeometryError::IndexOutOfRange {
                    what: "linestring",
                    index: i64::from(i),
                    len: coords.len(),
                },
            ))
        }
    };
    coords.insert(at, c);
    Ok(Geometry::LineString(LineString(coords)))
}

/// Removes a vertex from a linestring.
///
/// `index` is the 0-based position to remove; `None` removes the last vertex.
/// The result must remain a valid path of at least two vertices.
pub fn remove_point(geom: &Geometry<f64>, index: Option<i32>) -> KernelResult<Geometry<f64>> {
    let ls = as_linestring(geom)?;
    let mut coords = ls.0.clone();
    if coords.len() <= 2 {
        return Err(KernelError::invalid(
            "cannot remove a point from a linestring with two vertices",
        ));
    }
    let at = match index {
        None => coords.len() - 1,
        Some(i) if i >= 0 && (i as usize) < coords.len() => i as usize,
        Some(i) => {
            return Err(KernelError::Geometry(
                spatial_fusion_model::GeometryError::IndexOutOfRange {
                    what: "linestring",
                    index: i64::from(i),
                    len: coords.len(),
                },
            ))
        }
    };
    coords.remove(at);
    Ok(Geometry::LineString(LineString(coords)))
}

/// Replaces one vertex of a linestring. Negative indices count from the end.
pub fn set_point(
    geom: &Geometry<f64>,
    index: i32,
    point: &Geometry<f64>,
) -> KernelResult<Geometry<f64>> {
    let ls = as_linestring(geom)?;
    let c = as_coord(point)?;
    let mut coords = ls.0.clone();
    let len = coords.len() as i32;
    let at = if index < 0 { len + index } else { index };
    if !(0..len).contains(&at) {
        return Err(KernelError::Geometry(
            spatial_fusion_model::GeometryError::IndexOutOfRange {
                what: "linestring",
                index: i64::from(index),
                len: coords.len(),
            },
        ));
    }
    coords[at as usize] = c;
    Ok(Geometry::LineString(LineString(coords)))
}

/// Reverses the vertex order of every path; component order is unchanged.
pub fn reverse(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::LineString(ls) => Geometry::LineString(reverse_ls(ls)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString(
            mls.0.iter().map(reverse_ls).collect(),
        )),
        Geometry::Polygon(p) => Geometry::Polygon(reverse_polygon(p)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon(
            mp.0.iter().map(reverse_polygon).collect(),
        )),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter().map(reverse).collect(),
        )),
        other => other.clone(),
    }
}

fn reverse_ls(ls: &LineString<f64>) -> LineString<f64> {
    LineString(ls.0.iter().rev().copied().collect())
}

fn reverse_polygon(p: &Polygon<f64>) -> Polygon<f64> {
    Polygon::new(
        reverse_ls(p.exterior()),
        p.interiors().iter().map(reverse_ls).collect(),
    )
}

/// Swaps the X and Y ordinate of every coordinate.
pub fn flip_coordinates(geom: &Geometry<f64>) -> Geometry<f64> {
    geom.map_coords(|c| Coord { x: c.y, y: c.x })
}

/// Canonical form: rings oriented (exterior counter-clockwise, holes
/// clockwise) and rotated to start at their minimum coordinate, paths oriented
/// towards their larger endpoint, multi-components sorted by minimum
/// coordinate. Two geometries describing the same point set normalize to the
/// same representation.
pub fn normalize(geom: &Geometry<f64>) -> Geometry<f64> {
    match geom {
        Geometry::MultiPoint(mp) => {
            let mut points = mp.0.clone();
            points.sort_by(|a, b| coord_cmp(a.0, b.0));
            Geometry::MultiPoint(MultiPoint(points))
        }
        Geometry::LineString(ls) => Geometry::LineString(normalize_path(ls)),
        Geometry::MultiLineString(mls) => {
            let mut lines: Vec<LineString<f64>> = mls.0.iter().map(normalize_path).collect();
            lines.sort_by(|a, b| coord_seq_cmp(&a.0, &b.0));
            Geometry::MultiLineString(MultiLineString(lines))
        }
        Geometry::Polygon(p) => Geometry::Polygon(normalize_polygon(p)),
        Geometry::MultiPolygon(mp) => {
            let mut polygons: Vec<Polygon<f64>> = mp.0.iter().map(normalize_polygon).collect();
            polygons.sort_by(|a, b| coord_seq_cmp(&a.exterior().0, &b.exterior().0));
            Geometry::MultiPolygon(MultiPolygon(polygons))
        }
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter().map(normalize).collect(),
        )),
        other => other.clone(),
    }
}

fn normalize_path(ls: &LineString<f64>) -> LineString<f64> {
    if ls.is_closed() {
        return rotate_ring(ls);
    }
    let (Some(first), Some(last)) = (ls.0.first(), ls.0.last()) else {
        return ls.clone();
    };
    if coord_cmp(*last, *first) == std::cmp::Ordering::Less {
        reverse_ls(ls)
    } else {
        ls.clone()
    }
}

fn normalize_polygon(p: &Polygon<f64>) -> Polygon<f64> {
    let mut exterior = p.exterior().clone();
    exterior.make_ccw_winding();
    let mut interiors: Vec<LineString<f64>> = p
        .interiors()
        .iter()
        .map(|ring| {
            let mut ring = ring.clone();
            ring.make_cw_winding();
            rotate_ring(&ring)
        })
        .collect();
    interiors.sort_by(|a, b| coord_seq_cmp(&a.0, &b.0));
    Polygon::new(rotate_ring(&exterior), interiors)
}

/// Rotates a closed ring so its minimum coordinate comes first.
fn rotate_ring(ring: &LineString<f64>) -> LineString<f64> {
    if ring.0.len() < 3 || !ring.is_closed() {
        return ring.clone();
    }
    let open = &ring.0[..ring.0.len() - 1];
    let Some(start) = open
        .iter()
        .enumerate()
        .min_by(|a, b| coord_cmp(*a.1, *b.1))
        .map(|(i, _)| i)
    else {
        return ring.clone();
    };
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    coords.extend_from_slice(&open[start..]);
    coords.extend_from_slice(&open[..start]);
    coords.push(open[start]);
    LineString(coords)
}

fn coord_cmp(a: Coord<f64>, b: Coord<f64>) -> std::cmp::Ordering {
    (a.x, a.y)
        .partial_cmp(&(b.x, b.y))
        .unwrap_or(std::cmp::Ordering::Equal)
}

fn coord_seq_cmp(a: &[Coord<f64>], b: &[Coord<f64>]) -> std::cmp::Ordering {
    for (ca, cb) in a.iter().zip(b.iter()) {
        let ord = coord_cmp(*ca, *cb);
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Rounds every ordinate onto a grid of `10^digits` cells per unit.
pub fn reduce_precision(geom: &Geometry<f64>, digits: i32) -> KernelResult<Geometry<f64>> {
    if !(-15..=15).contains(&digits) {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "precisionScale",
            min: -15.0,
            max: 15.0,
            value: f64::from(digits),
        });
    }
    let factor = 10.0_f64.powi(digits);
    Ok(geom.map_coords(|c| Coord {
        x: (c.x * factor).round() / factor,
        y: (c.y * factor).round() / factor,
    }))
}

/// Distance-tolerance simplification that never collapses a geometry: a ring
/// or path that would drop below the structural minimum keeps its original
/// coordinates.
pub fn simplify_preserve_topology(
    geom: &Geometry<f64>,
    tolerance: f64,
) -> KernelResult<Geometry<f64>> {
    if !(tolerance >= 0.0 && tolerance.is_finite()) {
        return Err(KernelError::ArgumentOutOfRange {
            arg: "distanceTolerance",
            min: 0.0,
            max: f64::MAX,
            value: tolerance,
        });
    }
    Ok(simplify_geometry(geom, tolerance))
}

fn simplify_geometry(geom: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    match geom {
        Geometry::LineString(ls) => Geometry::LineString(simplify_path(ls, tolerance, 2)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(MultiLineString(
            mls.0.iter().map(|ls| simplify_path(ls, tolerance, 2)).collect(),
        )),
        Geometry::Polygon(p) => Geometry::Polygon(simplify_polygon(p, tolerance)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(MultiPolygon(
            mp.0.iter().map(|p| simplify_polygon(p, tolerance)).collect(),
        )),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection(
            gc.0.iter().map(|g| simplify_geometry(g, tolerance)).collect(),
        )),
        other => other.clone(),
    }
}

fn simplify_path(ls: &LineString<f64>, tolerance: f64, min_len: usize) -> LineString<f64> {
    let simplified = ls.simplify(&tolerance);
    if simplified.0.len() < min_len {
        ls.clone()
    } else {
        simplified
    }
}

fn simplify_polygon(p: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    Polygon::new(
        simplify_path(p.exterior(), tolerance, 4),
        p.interiors()
            .iter()
            .map(|ring| simplify_path(ring, tolerance, 4))
            .collect(),
    )
}

/// Planar translation by `(dx, dy)`.
pub fn translate(geom: &Geometry<f64>, dx: f64, dy: f64) -> Geometry<f64> {
    geom.map_coords(|c| Coord {
        x: c.x + dx,
        y: c.y + dy,
    })
}

/// Planar affine transform `x' = a·x + b·y + xoff, y' = d·x + e·y + yoff`.
pub fn affine_2d(
    geom: &Geometry<f64>,
    a: f64,
    b: f64,
    d: f64,
    e: f64,
    xoff: f64,
    yoff: f64,
) -> Geometry<f64> {
    geom.map_coords(|c| Coord {
        x: a * c.x + b * c.y + xoff,
        y: d * c.x + e * c.y + yoff,
    })
}

/// Full 3D affine transform over the geometry and its Z ordinate table.
///
/// `matrix` holds `[a, b, c, d, e, f, g, h, i, xoff, yoff, zoff]` for
/// `x' = a·x + b·y + c·z + xoff`, `y' = d·x + e·y + f·z + yoff`,
/// `z' = g·x + h·y + i·z + zoff`. Missing Z ordinates read as zero; the
/// returned table is aligned with the returned geometry's traversal order,
/// which the transform preserves.
pub fn affine_3d(
    geom: &Geometry<f64>,
    z: &[f64],
    matrix: [f64; 12],
) -> (Geometry<f64>, Vec<f64>) {
    use geo::CoordsIter;
    let [a, b, c, d, e, f, g, h, i, xoff, yoff, zoff] = matrix;
    let zs: Vec<f64> = geom
        .coords_iter()
        .enumerate()
        .map(|(n, co)| {
            let zv = z.get(n).copied().unwrap_or(0.0);
            g * co.x + h * co.y + i * zv + zoff
        })
        .collect();
    let pos = std::cell::Cell::new(0_usize);
    let out = geom.map_coords(|co| {
        let n = pos.get();
        pos.set(n + 1);
        let zv = z.get(n).copied().unwrap_or(0.0);
        Coord {
            x: a * co.x + b * co.y + c * zv + xoff,
            y: d * co.x + e * co.y + f * zv + yoff,
        }
    });
    (out, zs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, point, polygon, Point};

    fn path() -> Geometry<f64> {
        Geometry::LineString(line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 2., y: 0.)])
    }

    #[test]
    fn add_point_appends_by_default() {
        let out = add_point(&path(), &Geometry::Point(point! { x: 3.0, y: 0.0 }), None).unwrap();
        let Geometry::LineString(ls) = out else {
            panic!("expected a linestring");
        };
        assert_eq!(ls.0.len(), 4);
        assert_eq!(ls.0[3], Coord { x: 3.0, y: 0.0 });
    }

    #[test]
    fn add_point_inserts_positionally() {
        let out = add_point(&path(), &Geometry::Point(point! { x: 0.5, y: 0.0 }), Some(1)).unwrap();
        let Geometry::LineString(ls) = out else {
            panic!("expected a linestring");
        };
        assert_eq!(ls.0[1], Coord { x: 0.5, y: 0.0 });
    }

    #[test]
    fn remove_point_guards_the_two_vertex_floor() {
        let out = remove_point(&path(), None).unwrap();
        assert!(remove_point(&out, None).is_err());
        assert!(remove_point(&path(), Some(5)).is_err());
    }

    #[test]
    fn set_point_accepts_negative_indices() {
        let out = set_point(&path(), -1, &Geometry::Point(point! { x: 9.0, y: 9.0 })).unwrap();
        let Geometry::LineString(ls) = out else {
            panic!("expected a linestring");
        };
        assert_eq!(ls.0[2], Coord { x: 9.0, y: 9.0 });
    }

    #[test]
    fn vertex_surgery_rejects_polygons() {
        let poly: Geometry<f64> = Geometry::Polygon(polygon![
            (x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.), (x: 0., y: 0.)
        ]);
        assert!(add_point(&poly, &Geometry::Point(point! { x: 0.0, y: 0.0 }), None).is_err());
    }

    #[test]
    fn reverse_flips_vertex_order_only() {
        let Geometry::LineString(ls) = reverse(&path()) else {
            panic!("expected a linestring");
        };
        assert_eq!(ls.0.first(), Some(&Coord { x: 2.0, y: 0.0 }));
    }

    #[test]
    fn flip_swaps_ordinates() {
        let Geometry::Point(p) = flip_coordinates(&Geometry::Point(point! { x: 1.0, y: 2.0 }))
        else {
            panic!("expected a point");
        };
        assert_eq!(p, Point::new(2.0, 1.0));
    }

    #[test]
    fn normalize_is_idempotent_and_orientation_insensitive() {
        let a: Geometry<f64> = Geometry::Polygon(polygon![
            (x: 0., y: 0.), (x: 0., y: 2.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 0.)
        ]);
        let b: Geometry<f64> = Geometry::Polygon(polygon![
            (x: 2., y: 2.), (x: 0., y: 2.), (x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.)
        ]);
        assert_eq!(normalize(&a), normalize(&b));
        assert_eq!(normalize(&normalize(&a)), normalize(&a));
    }

    #[test]
    fn reduce_precision_rounds_onto_the_grid() {
        let p = Geometry::Point(point! { x: 1.2345, y: -1.2355 });
        let Geometry::Point(out) = reduce_precision(&p, 2).unwrap() else {
            panic!("expected a point");
        };
        assert_eq!(out, Point::new(1.23, -1.24));
    }

    #[test]
    fn simplify_drops_interior_noise_but_keeps_rings() {
        let noisy = Geometry::LineString(line_string![
            (x: 0., y: 0.), (x: 1., y: 0.01), (x: 2., y: 0.), (x: 3., y: 0.)
        ]);
        let Geometry::LineString(out) = simplify_geometry(&noisy, 0.1) else {
            panic!("expected a linestring");
        };
        assert_eq!(out.0.len(), 2);

        let tiny: Geometry<f64> = Geometry::Polygon(polygon![
            (x: 0., y: 0.), (x: 0.01, y: 0.), (x: 0.01, y: 0.01), (x: 0., y: 0.)
        ]);
        // Would collapse below four coordinates; the ring survives unchanged.
        assert_eq!(simplify_geometry(&tiny, 10.0), tiny);
    }

    #[test]
    fn affine_translate_and_scale() {
        let p = Geometry::Point(point! { x: 1.0, y: 2.0 });
        let Geometry::Point(moved) = translate(&p, 3.0, -1.0) else {
            panic!("expected a point");
        };
        assert_eq!(moved, Point::new(4.0, 1.0));

        let Geometry::Point(scaled) = affine_2d(&p, 2.0, 0.0, 0.0, 2.0, 0.0, 0.0) else {
            panic!("expected a point");
        };
        assert_eq!(scaled, Point::new(2.0, 4.0));
    }

    #[test]
    fn affine_3d_transforms_the_z_table() {
        let p = Geometry::Point(point! { x: 1.0, y: 1.0 });
        let (out, z) = affine_3d(
            &p,
            &[2.0],
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(out, p);
        assert_eq!(z, vec![7.0]);
    }
}
