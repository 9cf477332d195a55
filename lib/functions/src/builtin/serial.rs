//! Serialization functions and the input constructors feeding them.
//!
//! `ST_AsText`/`ST_AsEWKT` and `ST_AsBinary`/`ST_AsEWKB` are alias pairs:
//! two catalog entries sharing one binding, so their output is byte-identical
//! by construction.

use crate::CatalogBuilder;
use spatial_fusion_encoding as encoding;
use spatial_fusion_model::{Geometry, Point, SpatialGeometry, ValueKind as K};

pub(super) fn register(b: &mut CatalogBuilder) {
    b.function("ST_AsText")
        .overload(&[K::Geometry], K::String, |args| {
            Ok(encoding::write_ewkt(args.geometry(0)?).into())
        });
    b.alias("ST_AsEWKT", "ST_AsText");

    b.function("ST_AsBinary")
        .overload(&[K::Geometry], K::Bytes, |args| {
            Ok(encoding::write_ewkb(args.geometry(0)?)?.into())
        });
    b.alias("ST_AsEWKB", "ST_AsBinary");

    b.function("ST_AsGeoJSON")
        .overload(&[K::Geometry], K::String, |args| {
            Ok(encoding::write_geojson(args.geometry(0)?)?.into())
        });
    b.function("ST_AsGML")
        .overload(&[K::Geometry], K::String, |args| {
            Ok(encoding::write_gml(args.geometry(0)?).into())
        });
    b.function("ST_AsKML")
        .overload(&[K::Geometry], K::String, |args| {
            Ok(encoding::write_kml(args.geometry(0)?).into())
        });

    b.function("ST_GeoHash")
        .overload(&[K::Geometry, K::Integer], K::String, |args| {
            Ok(encoding::geohash(args.geometry(0)?, args.integer(1)?)?.into())
        });
    b.function("ST_S2CellIDs")
        .expanding(&[K::Geometry, K::Integer], K::Bytes, |args| {
            // The 64-bit cell id array crosses the engine boundary in its
            // little-endian byte encoding.
            let ids = encoding::s2_cell_ids(args.geometry(0)?, args.integer(1)?)?;
            let bytes: Vec<u8> = ids.iter().flat_map(|id| id.to_le_bytes()).collect();
            Ok(bytes.into())
        });

    b.function("ST_GeomFromWKT")
        .overload(&[K::String], K::Geometry, |args| {
            Ok(encoding::parse_ewkt(args.string(0)?)?.into())
        })
        .overload(&[K::String, K::Integer], K::Geometry, |args| {
            let parsed = encoding::parse_ewkt(args.string(0)?)?;
            Ok(parsed.reref(args.integer(1)?).into())
        });
    b.function("ST_GeomFromEWKT")
        .overload(&[K::String], K::Geometry, |args| {
            Ok(encoding::parse_ewkt(args.string(0)?)?.into())
        });
    b.function("ST_GeomFromWKB")
        .overload(&[K::Bytes], K::Geometry, |args| {
            Ok(encoding::parse_ewkb(args.bytes(0)?)?.into())
        });
    b.function("ST_GeomFromGeoJSON")
        .overload(&[K::String], K::Geometry, |args| {
            Ok(encoding::parse_geojson(args.string(0)?)?.into())
        });
    b.function("ST_Point")
        .overload(&[K::Double, K::Double], K::Geometry, |args| {
            let point = Point::new(args.double(0)?, args.double(1)?);
            Ok(SpatialGeometry::new(Geometry::Point(point)).into())
        });
}
