//! Spherical and spheroidal measurement shims.
//!
//! Coordinates are interpreted as lon/lat degrees. Non-point inputs are
//! reduced to a representative point (their centroid) before point-to-point
//! distances, matching the catalog's documented behavior for these functions.

use crate::{KernelError, KernelResult};
use geo::{Centroid, GeodesicArea, GeodesicDistance, GeodesicLength};
use geo_types::{Geometry, Point};

/// Mean Earth radius in meters; the fixed default for sphere distances.
pub const EARTH_MEAN_RADIUS: f64 = 6_371_008.0;

/// Great-circle distance on a sphere of the given radius.
pub fn sphere_distance(a: &Geometry<f64>, b: &Geometry<f64>, radius: f64) -> KernelResult<f64> {
    let pa = representative(a)?;
    let pb = representative(b)?;
    let (lon1, lat1) = (pa.x().to_radians(), pa.y().to_radians());
    let (lon2, lat2) = (pb.x().to_radians(), pb.y().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    Ok(2.0 * radius * h.sqrt().asin())
}

/// Geodesic distance on the WGS84 spheroid.
pub fn spheroid_distance(a: &Geometry<f64>, b: &Geometry<f64>) -> KernelResult<f64> {
    let pa = representative(a)?;
    let pb = representative(b)?;
    Ok(pa.geodesic_distance(&pb))
}

/// Surface area on the WGS84 spheroid. Non-areal input measures zero.
pub fn spheroid_area(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => p.geodesic_area_unsigned(),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(GeodesicArea::geodesic_area_unsigned).sum(),
        Geometry::GeometryCollection(gc) => gc.0.iter().map(spheroid_area).sum(),
        Geometry::Rect(r) => r.to_polygon().geodesic_area_unsigned(),
        Geometry::Triangle(t) => t.to_polygon().geodesic_area_unsigned(),
        _ => 0.0,
    }
}

/// Path length on the WGS84 spheroid; perimeter for areal input.
pub fn spheroid_length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::Line(l) => l.geodesic_length(),
        Geometry::LineString(ls) => ls.geodesic_length(),
        Geometry::MultiLineString(mls) => mls.geodesic_length(),
        Geometry::Polygon(p) => {
            p.exterior().geodesic_length()
                + p.interiors().iter().map(GeodesicLength::geodesic_length).sum::<f64>()
        }
        Geometry::MultiPolygon(mp) => {
            mp.0.iter()
                .map(|p| spheroid_length(&Geometry::Polygon(p.clone())))
                .sum()
        }
        Geometry::GeometryCollection(gc) => gc.0.iter().map(spheroid_length).sum(),
        Geometry::Rect(r) => spheroid_length(&Geometry::Polygon(r.to_polygon())),
        Geometry::Triangle(t) => spheroid_length(&Geometry::Polygon(t.to_polygon())),
    }
}

fn representative(geom: &Geometry<f64>) -> KernelResult<Point<f64>> {
    match geom {
        Geometry::Point(p) => Ok(*p),
        other => other
            .centroid()
            .ok_or_else(|| KernelError::invalid("spherical distance of an empty geometry")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo_types::point;

    #[test]
    fn quarter_meridian_on_the_unit_sphere() {
        let equator = Geometry::Point(point! { x: 0.0, y: 0.0 });
        let pole = Geometry::Point(point! { x: 0.0, y: 90.0 });
        let d = sphere_distance(&equator, &pole, 1.0).unwrap();
        assert_relative_eq!(d, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn default_radius_matches_earth_scale() {
        let a = Geometry::Point(point! { x: 0.0, y: 0.0 });
        let b = Geometry::Point(point! { x: 0.0, y: 1.0 });
        let d = sphere_distance(&a, &b, EARTH_MEAN_RADIUS).unwrap();
        // One degree of latitude is roughly 111 km.
        assert!((d - 111_195.0).abs() < 100.0, "{d}");
    }

    #[test]
    fn spheroid_distance_close_to_sphere_distance() {
        let a = Geometry::Point(point! { x: 8.5, y: 47.4 });
        let b = Geometry::Point(point! { x: 2.35, y: 48.85 });
        let sphere = sphere_distance(&a, &b, EARTH_MEAN_RADIUS).unwrap();
        let spheroid = spheroid_distance(&a, &b).unwrap();
        assert!((sphere - spheroid).abs() / spheroid < 0.01);
    }

    #[test]
    fn non_areal_spheroid_area_is_zero() {
        let p = Geometry::Point(point! { x: 1.0, y: 2.0 });
        assert_relative_eq!(spheroid_area(&p), 0.0);
    }
}
