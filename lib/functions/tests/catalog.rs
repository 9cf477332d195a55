//! End-to-end checks of the catalog contract: registration hygiene, alias
//! behavior, codec round-trips, overload resolution and the per-family null
//! policies.

use approx::assert_relative_eq;
use spatial_fusion_encoding::parse_ewkt;
use spatial_fusion_functions::{FunctionCatalog, FunctionError, ResolutionError};
use spatial_fusion_kernel::KernelError;
use spatial_fusion_model::{SpatialValue, ValueKind};

fn catalog() -> FunctionCatalog {
    FunctionCatalog::build().expect("builtin catalog must build")
}

fn geom(wkt: &str) -> SpatialValue {
    SpatialValue::Geometry(parse_ewkt(wkt).expect("test geometry must parse"))
}

fn as_double(value: SpatialValue) -> f64 {
    match value {
        SpatialValue::Double(d) => d,
        other => panic!("expected a double, got {other:?}"),
    }
}

#[test]
fn catalog_is_total_and_unambiguous() {
    let catalog = catalog();
    assert!(catalog.len() >= 90, "only {} functions registered", catalog.len());
    for name in catalog.names() {
        let descriptor = catalog.descriptor(name).unwrap();
        let overloads = descriptor.overloads();
        assert!(!overloads.is_empty(), "{name} has no overloads");
        for (i, a) in overloads.iter().enumerate() {
            for b in overloads.iter().skip(i + 1) {
                assert!(
                    !a.signature().matches(b.signature().params()),
                    "{name} declares an ambiguous signature pair"
                );
            }
        }
    }
}

#[test]
fn text_alias_pair_is_char_identical() {
    let catalog = catalog();
    for wkt in [
        "POINT (1 2)",
        "SRID=4326;LINESTRING (0 0, 1 1, 2 0)",
        "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 4 2, 4 4, 2 4, 2 2))",
    ] {
        let args = vec![geom(wkt)];
        let text = catalog.invoke("ST_AsText", &args).unwrap();
        let ewkt = catalog.invoke("ST_AsEWKT", &args).unwrap();
        assert_eq!(text, ewkt);
    }
}

#[test]
fn binary_alias_pair_is_byte_identical() {
    let catalog = catalog();
    let args = vec![geom("SRID=3857;POINT (1 2)")];
    let a = catalog.invoke("ST_AsBinary", &args).unwrap();
    let b = catalog.invoke("ST_AsEWKB", &args).unwrap();
    let (SpatialValue::Bytes(a), SpatialValue::Bytes(b)) = (a, b) else {
        panic!("expected byte output");
    };
    assert_eq!(hex::encode(&a), hex::encode(&b));
}

#[test]
fn ewkt_round_trips_through_the_catalog() {
    let catalog = catalog();
    for wkt in [
        "POINT (1 2)",
        "SRID=4326;POINT Z (1 2 3)",
        "LINESTRING (0 0, 1 1, 2 0)",
        "SRID=4326;POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))",
        "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
        "GEOMETRYCOLLECTION (POINT (1 2), LINESTRING (0 0, 1 1))",
    ] {
        let original = geom(wkt);
        let text = catalog.invoke("ST_AsEWKT", &[original.clone()]).unwrap();
        let restored = catalog.invoke("ST_GeomFromEWKT", &[text]).unwrap();
        assert_eq!(restored, original, "round trip of {wkt}");
    }
}

#[test]
fn ewkb_round_trips_with_reference_id() {
    let catalog = catalog();
    for wkt in [
        "POINT (1 2)",
        "SRID=4326;POINT (1 2)",
        "SRID=4326;LINESTRING (0 0, 1 1)",
        "SRID=32633;POLYGON ((0 0, 4 0, 4 4, 0 4, 0 0))",
        "SRID=4326;MULTIPOINT ((1 1), (2 2))",
    ] {
        let original = geom(wkt);
        let bytes = catalog.invoke("ST_AsEWKB", &[original.clone()]).unwrap();
        let restored = catalog.invoke("ST_GeomFromWKB", &[bytes]).unwrap();
        assert_eq!(restored, original, "round trip of {wkt}");
    }
}

#[test]
fn dump_preserves_component_order() {
    let catalog = catalog();

    let single = geom("POINT (1 2)");
    let SpatialValue::GeometryArray(parts) = catalog.invoke("ST_Dump", &[single.clone()]).unwrap()
    else {
        panic!("expected an array");
    };
    assert_eq!(parts.len(), 1);
    assert_eq!(SpatialValue::Geometry(parts[0].clone()), single);

    let multi = geom("MULTIPOINT ((1 1), (2 2), (3 3))");
    let SpatialValue::GeometryArray(parts) = catalog.invoke("ST_Dump", &[multi]).unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(parts.len(), 3);
    for (i, part) in parts.iter().enumerate() {
        let expected = (i + 1) as f64;
        let text = spatial_fusion_encoding::write_ewkt(part);
        assert_eq!(text, format!("POINT ({expected} {expected})"));
    }
}

#[test]
fn minimum_bounding_radius_of_a_point_is_zero() {
    let catalog = catalog();
    let SpatialValue::Pair(center, radius) = catalog
        .invoke("ST_MinimumBoundingRadius", &[geom("POINT (3 4)")])
        .unwrap()
    else {
        panic!("expected a pair");
    };
    assert_eq!(spatial_fusion_encoding::write_ewkt(&center), "POINT (3 4)");
    assert_relative_eq!(radius, 0.0);
}

#[test]
fn zero_radius_buffer_keeps_polygon_area() {
    let catalog = catalog();
    let square = geom("POLYGON ((0 0, 2 0, 2 2, 0 2, 0 0))");
    let buffered = catalog
        .invoke("ST_Buffer", &[square, SpatialValue::Double(0.0)])
        .unwrap();
    let area = as_double(catalog.invoke("ST_Area", &[buffered]).unwrap());
    assert_relative_eq!(area, 4.0, epsilon = 1e-9);
}

#[test]
fn collect_pair_and_array_overloads_agree() {
    let catalog = catalog();
    let a = geom("POINT (1 1)");
    let b = geom("POINT (2 2)");
    let via_pair = catalog.invoke("ST_Collect", &[a.clone(), b.clone()]).unwrap();

    let (SpatialValue::Geometry(ga), SpatialValue::Geometry(gb)) = (a, b) else {
        panic!("expected geometries");
    };
    let via_array = catalog
        .invoke("ST_Collect", &[SpatialValue::GeometryArray(vec![ga, gb])])
        .unwrap();
    assert_eq!(via_pair, via_array);
}

#[test]
fn transform_rejects_unknown_reference_ids() {
    let catalog = catalog();
    let result = catalog.invoke(
        "ST_Transform",
        &[geom("SRID=4326;POINT (8.5 47.4)"), SpatialValue::Integer(999_999)],
    );
    assert!(matches!(
        result,
        Err(FunctionError::Kernel(KernelError::UnknownCrs(_)))
    ));

    // A geometry without a reference id cannot act as a transform source.
    let result = catalog.invoke(
        "ST_Transform",
        &[geom("POINT (8.5 47.4)"), SpatialValue::Integer(3857)],
    );
    assert!(matches!(
        result,
        Err(FunctionError::Kernel(KernelError::UnknownCrs(_)))
    ));
}

#[test]
fn transform_reprojects_and_stamps_the_target_id() {
    let catalog = catalog();
    let out = catalog
        .invoke(
            "ST_Transform",
            &[geom("SRID=4326;POINT (8.5417 47.3769)"), SpatialValue::Integer(3857)],
        )
        .unwrap();
    let SpatialValue::Geometry(g) = out else {
        panic!("expected a geometry");
    };
    assert_eq!(g.srid(), 3857);
}

#[test]
fn geometric_median_arity_family() {
    let catalog = catalog();
    let square = geom("MULTIPOINT ((0 0), (2 0), (2 2), (0 2))");

    let SpatialValue::Geometry(median) = catalog
        .invoke("ST_GeometricMedian", &[square.clone()])
        .unwrap()
    else {
        panic!("expected a geometry");
    };
    let spatial_fusion_model::Geometry::Point(p) = median.geometry() else {
        panic!("expected a point");
    };
    assert_relative_eq!(p.x(), 1.0, epsilon = 1e-4);
    assert_relative_eq!(p.y(), 1.0, epsilon = 1e-4);

    // Hard-failure semantics on a hopeless iteration budget.
    let skewed = geom("MULTIPOINT ((0 0), (10 0), (3 7), (1 9))");
    let result = catalog.invoke(
        "ST_GeometricMedian",
        &[
            skewed.clone(),
            SpatialValue::Double(1e-15),
            SpatialValue::Integer(1),
            SpatialValue::Boolean(true),
        ],
    );
    assert!(matches!(
        result,
        Err(FunctionError::Kernel(KernelError::NotConverged { .. }))
    ));

    // Relaxed semantics substitute the best-effort estimate.
    let relaxed = catalog.invoke(
        "ST_GeometricMedian",
        &[
            skewed,
            SpatialValue::Double(1e-15),
            SpatialValue::Integer(1),
            SpatialValue::Boolean(false),
        ],
    );
    assert!(matches!(relaxed, Ok(SpatialValue::Geometry(_))));
}

#[test]
fn null_policies_are_per_family() {
    let catalog = catalog();

    // Predicates answer false.
    assert_eq!(
        catalog.invoke("ST_IsValid", &[SpatialValue::Null]).unwrap(),
        SpatialValue::Boolean(false)
    );
    // Multi-valued results collapse to their empty value.
    assert_eq!(
        catalog.invoke("ST_Dump", &[SpatialValue::Null]).unwrap(),
        SpatialValue::GeometryArray(Vec::new())
    );
    assert_eq!(
        catalog
            .invoke("ST_S2CellIDs", &[SpatialValue::Null, SpatialValue::Integer(10)])
            .unwrap(),
        SpatialValue::Bytes(Vec::new())
    );
    // Everything else propagates null.
    assert_eq!(
        catalog.invoke("ST_Area", &[SpatialValue::Null]).unwrap(),
        SpatialValue::Null
    );
    assert_eq!(
        catalog
            .invoke("ST_Buffer", &[SpatialValue::Null, SpatialValue::Double(1.0)])
            .unwrap(),
        SpatialValue::Null
    );
}

#[test]
fn resolution_is_by_exact_kind_sequence() {
    let catalog = catalog();

    let resolved = catalog
        .resolve("ST_Collect", &[ValueKind::Geometry, ValueKind::Geometry])
        .unwrap();
    assert_eq!(resolved.signature().returns(), ValueKind::Geometry);
    assert!(catalog.resolve("ST_Collect", &[ValueKind::GeometryArray]).is_ok());

    // No widening: INTEGER does not match DOUBLE.
    let err = catalog
        .resolve("ST_Buffer", &[ValueKind::Geometry, ValueKind::Integer])
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ST_Buffer"));
    assert!(message.contains("GEOMETRY, INTEGER"));

    assert!(matches!(
        catalog.resolve("ST_DoesNotExist", &[ValueKind::Geometry]),
        Err(ResolutionError::FunctionNotFound(_))
    ));
}

#[test]
fn transform_arity_family_resolves() {
    let catalog = catalog();
    for kinds in [
        vec![ValueKind::Geometry, ValueKind::Integer],
        vec![ValueKind::Geometry, ValueKind::Integer, ValueKind::Boolean],
        vec![ValueKind::Geometry, ValueKind::Integer, ValueKind::Integer],
        vec![
            ValueKind::Geometry,
            ValueKind::Integer,
            ValueKind::Integer,
            ValueKind::Boolean,
        ],
    ] {
        assert!(catalog.resolve("ST_Transform", &kinds).is_ok());
    }
}

#[test]
fn make_polygon_takes_an_interior_ring_list() {
    let catalog = catalog();
    let shell = geom("LINESTRING (0 0, 10 0, 10 10, 0 10, 0 0)");
    let SpatialValue::Geometry(hole) =
        geom("LINESTRING (2 2, 4 2, 4 4, 2 4, 2 2)")
    else {
        panic!("expected a geometry");
    };

    let plain = catalog.invoke("ST_MakePolygon", &[shell.clone()]).unwrap();
    let area = as_double(catalog.invoke("ST_Area", &[plain]).unwrap());
    assert_relative_eq!(area, 100.0);

    let holed = catalog
        .invoke(
            "ST_MakePolygon",
            &[shell, SpatialValue::GeometryArray(vec![hole])],
        )
        .unwrap();
    let area = as_double(catalog.invoke("ST_Area", &[holed]).unwrap());
    assert_relative_eq!(area, 96.0);
}

#[test]
fn s2_cell_ids_encode_little_endian_words() {
    let catalog = catalog();
    let out = catalog
        .invoke(
            "ST_S2CellIDs",
            &[geom("MULTIPOINT ((8.54 47.37), (-74 40.7))"), SpatialValue::Integer(10)],
        )
        .unwrap();
    let SpatialValue::Bytes(bytes) = out else {
        panic!("expected bytes");
    };
    assert_eq!(bytes.len() % 8, 0);
    assert_eq!(bytes.len(), 16);
}

#[test]
fn geohash_reflects_requested_precision() {
    let catalog = catalog();
    let out = catalog
        .invoke(
            "ST_GeoHash",
            &[geom("POINT (-0.0015 51.4778)"), SpatialValue::Integer(9)],
        )
        .unwrap();
    let SpatialValue::String(hash) = out else {
        panic!("expected a string");
    };
    assert_eq!(hash.len(), 9);
}

#[test]
fn subdivide_is_ordered_and_bounded() {
    let catalog = catalog();
    let coords: Vec<String> = (0..40).map(|i| format!("{i} 0")).collect();
    let line = geom(&format!("LINESTRING ({})", coords.join(", ")));
    let SpatialValue::GeometryArray(parts) = catalog
        .invoke("ST_Subdivide", &[line, SpatialValue::Integer(10)])
        .unwrap()
    else {
        panic!("expected an array");
    };
    assert!(parts.len() > 1);
}

#[test]
fn constructors_stamp_the_reference_id() {
    let catalog = catalog();

    let parsed = catalog
        .invoke(
            "ST_GeomFromWKT",
            &[
                SpatialValue::String("POINT (1 2)".to_owned()),
                SpatialValue::Integer(4326),
            ],
        )
        .unwrap();
    let text = catalog.invoke("ST_AsText", &[parsed.clone()]).unwrap();
    assert_eq!(text, SpatialValue::String("SRID=4326;POINT (1 2)".to_owned()));
    assert_eq!(
        catalog.invoke("ST_SRID", &[parsed]).unwrap(),
        SpatialValue::Integer(4326)
    );

    let point = catalog
        .invoke(
            "ST_Point",
            &[SpatialValue::Double(3.0), SpatialValue::Double(4.0)],
        )
        .unwrap();
    let rerefed = catalog
        .invoke("ST_SetSRID", &[point, SpatialValue::Integer(3857)])
        .unwrap();
    let SpatialValue::Geometry(g) = rerefed else {
        panic!("expected a geometry");
    };
    assert_eq!(g.srid(), 3857);
    assert_eq!(spatial_fusion_encoding::write_ewkt(&g), "SRID=3857;POINT (3 4)");
}

#[test]
fn editors_keep_ordinates_where_order_is_preserved() {
    let catalog = catalog();
    let out = catalog
        .invoke(
            "ST_Translate",
            &[
                geom("SRID=4326;POINT Z (1 2 3)"),
                SpatialValue::Double(1.0),
                SpatialValue::Double(1.0),
                SpatialValue::Double(1.0),
            ],
        )
        .unwrap();
    let SpatialValue::Geometry(g) = out else {
        panic!("expected a geometry");
    };
    assert_eq!(g.srid(), 4326);
    assert_eq!(g.z_ordinates(), &[4.0]);
    assert_eq!(spatial_fusion_encoding::write_ewkt(&g), "SRID=4326;POINT Z (2 3 4)");
}
