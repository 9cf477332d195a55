//! GeoJSON (RFC 7946) geometry encoding.
//!
//! Coordinates are emitted in source order; serialization never reprojects.
//! The spatial reference id has no representation in RFC 7946 and is dropped
//! on output; decoded geometries start with the id unset.

use crate::CodecError;
use geojson::{GeoJson, Value};
use spatial_fusion_model::{Geometry, SpatialGeometry};

/// Renders a geometry as a GeoJSON geometry object.
pub fn write_geojson(value: &SpatialGeometry) -> Result<String, CodecError> {
    let geometry = geojson::Geometry::new(Value::from(value.geometry()));
    serde_json::to_string(&geometry).map_err(|e| CodecError::InvalidGeoJson(e.to_string()))
}

/// Parses a GeoJSON geometry object (a bare geometry, not a feature).
pub fn parse_geojson(text: &str) -> Result<SpatialGeometry, CodecError> {
    let parsed = text
        .parse::<GeoJson>()
        .map_err(|e| CodecError::InvalidGeoJson(e.to_string()))?;
    let geometry = match parsed {
        GeoJson::Geometry(g) => g,
        GeoJson::Feature(feature) => feature
            .geometry
            .ok_or_else(|| CodecError::InvalidGeoJson("feature without geometry".to_owned()))?,
        GeoJson::FeatureCollection(_) => {
            return Err(CodecError::InvalidGeoJson(
                "expected a geometry, got a feature collection".to_owned(),
            ))
        }
    };
    let geom = Geometry::<f64>::try_from(geometry)?;
    Ok(SpatialGeometry::new(geom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ewkt::parse_ewkt;

    #[test]
    fn point_renders_per_rfc() {
        let value = parse_ewkt("POINT (1 2)").unwrap();
        let text = write_geojson(&value).unwrap();
        assert!(text.contains(r#""type":"Point""#), "{text}");
        assert!(text.contains(r#""coordinates":[1.0,2.0]"#), "{text}");
    }

    #[test]
    fn polygon_round_trips() {
        let value = parse_ewkt("POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0))").unwrap();
        let text = write_geojson(&value).unwrap();
        let back = parse_geojson(&text).unwrap();
        assert_eq!(back.geometry(), value.geometry());
    }

    #[test]
    fn feature_collection_is_rejected() {
        let text = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(matches!(
            parse_geojson(text),
            Err(CodecError::InvalidGeoJson(_))
        ));
    }
}
