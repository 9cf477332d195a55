//! Geohash cell string encoding.

use crate::CodecError;
use geo::Centroid;
use spatial_fusion_model::SpatialGeometry;

/// Highest precision the base-32 encoding supports.
pub const MAX_PRECISION: i32 = 12;

/// Encodes the geometry's representative point as a geohash cell string.
///
/// Non-point geometries are reduced to their centroid before encoding; the
/// coordinates are interpreted as lon/lat degrees.
pub fn geohash(value: &SpatialGeometry, precision: i32) -> Result<String, CodecError> {
    if !(1..=MAX_PRECISION).contains(&precision) {
        return Err(CodecError::OutOfRange {
            arg: "precision",
            min: 1,
            max: i64::from(MAX_PRECISION),
            value: i64::from(precision),
        });
    }
    let centroid = value
        .geometry()
        .centroid()
        .ok_or_else(|| CodecError::Geohash("empty geometry".to_owned()))?;
    geohash::encode(
        geohash::Coord {
            x: centroid.x(),
            y: centroid.y(),
        },
        precision as usize,
    )
    .map_err(|e| CodecError::Geohash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ewkt::parse_ewkt;

    #[test]
    fn cell_contains_the_point() {
        let value = parse_ewkt("POINT (-0.0015 51.4778)").unwrap();
        let hash = geohash(&value, 12).unwrap();
        assert_eq!(hash.len(), 12);
        let (coord, _, _) = geohash::decode(&hash).unwrap();
        assert!((coord.x - -0.0015).abs() < 1e-6);
        assert!((coord.y - 51.4778).abs() < 1e-6);
    }

    #[test]
    fn shorter_precision_is_a_prefix() {
        let value = parse_ewkt("POINT (-0.0015 51.4778)").unwrap();
        let long = geohash(&value, 12).unwrap();
        let short = geohash(&value, 5).unwrap();
        assert_eq!(&long[..5], short);
    }

    #[test]
    fn precision_is_validated() {
        let value = parse_ewkt("POINT (0 0)").unwrap();
        assert!(geohash(&value, 0).is_err());
        assert!(geohash(&value, 13).is_err());
    }
}
