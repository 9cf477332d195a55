//! Constructive operations and multi-valued results.

use crate::{Args, CatalogBuilder, FunctionError};
use spatial_fusion_kernel::{accessor, construct, hull, measure, overlay};
use spatial_fusion_model::{
    Geometry, SpatialGeometry, SpatialValue, ValueKind as K, UNKNOWN_SRID,
};

/// Segments per quadrant of the bounding-circle polygon when the caller does
/// not pass any.
const BOUNDING_CIRCLE_QUADRANT_SEGMENTS: i32 = 48;

/// Defaults of the geometric-median iteration.
const MEDIAN_TOLERANCE: f64 = 1e-6;
const MEDIAN_MAX_ITER: i32 = 1000;

pub(super) fn register(b: &mut CatalogBuilder) {
    b.function("ST_Boundary")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(accessor::boundary(g.geometry())).into())
        });
    b.function("ST_Envelope")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(accessor::envelope(g.geometry())).into())
        });
    b.function("ST_BoundingDiagonal")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(accessor::bounding_diagonal(g.geometry())).into())
        });

    b.function("ST_Buffer")
        .overload(&[K::Geometry, K::Double], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(overlay::buffer(g.geometry(), args.double(1)?)?).into())
        });

    b.function("ST_Centroid")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(hull::centroid(g.geometry())).into())
        });
    b.function("ST_PointOnSurface")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(hull::point_on_surface(g.geometry())).into())
        });
    b.function("ST_ClosestPoint")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let nearest = measure::closest_point(g.geometry(), args.geometry(1)?.geometry())?;
            Ok(g.derive(nearest).into())
        });

    b.function("ST_Collect")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let first = args.geometry(0)?;
            let second = args.geometry(1)?;
            let collected =
                construct::collect(vec![first.geometry().clone(), second.geometry().clone()]);
            Ok(first.derive(collected).into())
        })
        .overload(&[K::GeometryArray], K::Geometry, |args| {
            let parts = args.geometry_array(0)?;
            let srid = parts.first().map_or(UNKNOWN_SRID, SpatialGeometry::srid);
            let collected =
                construct::collect(parts.iter().map(|g| g.geometry().clone()).collect());
            Ok(SpatialGeometry::with_srid(collected, srid).into())
        });

    b.function("ST_CollectionExtract")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(construct::collection_extract(g.geometry(), None)?).into())
        })
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let extracted = construct::collection_extract(g.geometry(), Some(args.integer(1)?))?;
            Ok(g.derive(extracted).into())
        });

    b.function("ST_ConvexHull")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(hull::convex_hull(g.geometry())).into())
        });
    b.function("ST_ConcaveHull")
        .overload(&[K::Geometry, K::Double], K::Geometry, concave_hull)
        .overload(
            &[K::Geometry, K::Double, K::Boolean],
            K::Geometry,
            concave_hull,
        );

    b.function("ST_Intersection")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = overlay::intersection(g.geometry(), args.geometry(1)?.geometry())?;
            Ok(g.derive(out).into())
        });
    b.function("ST_Difference")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = overlay::difference(g.geometry(), args.geometry(1)?.geometry())?;
            Ok(g.derive(out).into())
        });
    b.function("ST_SymDifference")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = overlay::sym_difference(g.geometry(), args.geometry(1)?.geometry())?;
            Ok(g.derive(out).into())
        });
    b.function("ST_Split")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = overlay::split(g.geometry(), args.geometry(1)?.geometry())?;
            Ok(g.derive(out).into())
        });

    b.function("ST_MakePolygon")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let shell = args.geometry(0)?;
            Ok(shell.derive(construct::make_polygon(shell.geometry(), &[])?).into())
        })
        .overload(&[K::Geometry, K::GeometryArray], K::Geometry, |args| {
            let shell = args.geometry(0)?;
            let holes: Vec<Geometry<f64>> = args
                .geometry_array(1)?
                .iter()
                .map(|g| g.geometry().clone())
                .collect();
            Ok(shell.derive(construct::make_polygon(shell.geometry(), &holes)?).into())
        });

    b.function("ST_MakeValid")
        .overload(&[K::Geometry], K::Geometry, make_valid)
        .overload(&[K::Geometry, K::Boolean], K::Geometry, make_valid);

    b.function("ST_MinimumBoundingCircle")
        .overload(&[K::Geometry], K::Geometry, bounding_circle)
        .overload(&[K::Geometry, K::Integer], K::Geometry, bounding_circle);
    b.function("ST_MinimumBoundingRadius")
        .overload(&[K::Geometry], K::PairGeometryDouble, |args| {
            let g = args.geometry(0)?;
            // Both fields are produced together or the whole call fails.
            let (center, radius) = hull::minimum_bounding_circle(g.geometry())?;
            Ok(SpatialValue::Pair(
                g.derive(Geometry::Point(center)),
                radius,
            ))
        });

    b.function("ST_Multi")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(construct::multi(g.geometry())).into())
        });

    b.function("ST_GeometricMedian")
        .overload(&[K::Geometry], K::Geometry, median)
        .overload(&[K::Geometry, K::Double], K::Geometry, median)
        .overload(&[K::Geometry, K::Double, K::Integer], K::Geometry, median)
        .overload(
            &[K::Geometry, K::Double, K::Integer, K::Boolean],
            K::Geometry,
            median,
        );

    b.function("ST_BuildArea")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(construct::build_area(g.geometry())?).into())
        });
    b.function("ST_LineFromMultiPoint")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(construct::line_from_multi_point(g.geometry())?).into())
        });
    b.function("ST_LineMerge")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(construct::line_merge(g.geometry())).into())
        });
    b.function("ST_LineSubstring")
        .overload(&[K::Geometry, K::Double, K::Double], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let part =
                construct::line_substring(g.geometry(), args.double(1)?, args.double(2)?)?;
            Ok(g.derive(part).into())
        });
    b.function("ST_LineInterpolatePoint")
        .overload(&[K::Geometry, K::Double], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let point = construct::line_interpolate_point(g.geometry(), args.double(1)?)?;
            Ok(g.derive(point).into())
        });

    // Multi-valued results. Ordering follows the input's traversal order and
    // is part of the contract; null input collapses to the empty array.
    b.function("ST_Dump")
        .expanding(&[K::Geometry], K::GeometryArray, |args| {
            let g = args.geometry(0)?;
            Ok(derive_all(g, accessor::dump(g.geometry())))
        });
    b.function("ST_DumpPoints")
        .expanding(&[K::Geometry], K::GeometryArray, |args| {
            let g = args.geometry(0)?;
            Ok(derive_all(g, accessor::dump_points(g.geometry())))
        });
    b.function("ST_Subdivide")
        .expanding(&[K::Geometry, K::Integer], K::GeometryArray, |args| {
            let g = args.geometry(0)?;
            let pieces = overlay::subdivide(g.geometry(), args.integer(1)?)?;
            Ok(derive_all(g, pieces))
        });
}

fn derive_all(source: &SpatialGeometry, parts: Vec<Geometry<f64>>) -> SpatialValue {
    SpatialValue::GeometryArray(parts.into_iter().map(|g| source.derive(g)).collect())
}

fn concave_hull(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    let pct_convex = args.double(1)?;
    let allow_holes = args.boolean_or(2, false)?;
    Ok(g.derive(hull::concave_hull(g.geometry(), pct_convex, allow_holes)?).into())
}

fn make_valid(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    let keep_collapsed = args.boolean_or(1, false)?;
    Ok(g.derive(overlay::make_valid(g.geometry(), keep_collapsed)?).into())
}

fn bounding_circle(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    let quadrant_segments = args.integer_or(1, BOUNDING_CIRCLE_QUADRANT_SEGMENTS)?;
    let circle = hull::minimum_bounding_circle_polygon(g.geometry(), quadrant_segments)?;
    Ok(g.derive(circle).into())
}

fn median(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    let tolerance = args.double_or(1, MEDIAN_TOLERANCE)?;
    let max_iter = args.integer_or(2, MEDIAN_MAX_ITER)?;
    let fail_if_not_converged = args.boolean_or(3, false)?;
    let center = hull::geometric_median(g.geometry(), tolerance, max_iter, fail_if_not_converged)?;
    Ok(g.derive(center).into())
}
