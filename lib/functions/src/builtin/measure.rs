//! Measurement functions.

use crate::{Args, CatalogBuilder, FunctionError};
use spatial_fusion_kernel::{measure, sphere};
use spatial_fusion_model::{SpatialValue, ValueKind as K};

pub(super) fn register(b: &mut CatalogBuilder) {
    b.function("GeometryType")
        .overload(&[K::Geometry], K::String, |args| {
            Ok(args.geometry(0)?.type_name_measured().into())
        });
    b.function("ST_GeometryType")
        .overload(&[K::Geometry], K::String, |args| {
            Ok(args.geometry(0)?.st_type_name().into())
        });
    b.function("ST_Area").overload(&[K::Geometry], K::Double, |args| {
        Ok(measure::area(args.geometry(0)?.geometry()).into())
    });
    b.function("ST_AreaSpheroid")
        .overload(&[K::Geometry], K::Double, |args| {
            Ok(sphere::spheroid_area(args.geometry(0)?.geometry()).into())
        });
    b.function("ST_Length")
        .overload(&[K::Geometry], K::Double, |args| {
            Ok(measure::length(args.geometry(0)?.geometry()).into())
        });
    b.function("ST_LengthSpheroid")
        .overload(&[K::Geometry], K::Double, |args| {
            Ok(sphere::spheroid_length(args.geometry(0)?.geometry()).into())
        });
    b.function("ST_Azimuth")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let azimuth =
                measure::azimuth(args.geometry(0)?.geometry(), args.geometry(1)?.geometry())?;
            Ok(azimuth.into())
        });
    b.function("ST_Distance")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let d = measure::distance(args.geometry(0)?.geometry(), args.geometry(1)?.geometry())?;
            Ok(d.into())
        });
    b.function("ST_DistanceSphere")
        .overload(&[K::Geometry, K::Geometry], K::Double, sphere_distance)
        .overload(
            &[K::Geometry, K::Geometry, K::Double],
            K::Double,
            sphere_distance,
        );
    b.function("ST_DistanceSpheroid")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let d = sphere::spheroid_distance(
                args.geometry(0)?.geometry(),
                args.geometry(1)?.geometry(),
            )?;
            Ok(d.into())
        });
    b.function("ST_3DDistance")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let a = args.geometry(0)?;
            let b = args.geometry(1)?;
            let d = measure::distance_3d(
                a.geometry(),
                a.z_ordinates(),
                b.geometry(),
                b.z_ordinates(),
            )?;
            Ok(d.into())
        });
    b.function("ST_FrechetDistance")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let d = measure::frechet_distance(
                args.geometry(0)?.geometry(),
                args.geometry(1)?.geometry(),
            )?;
            Ok(d.into())
        });
    b.function("ST_HausdorffDistance")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let d = measure::hausdorff_distance(
                args.geometry(0)?.geometry(),
                args.geometry(1)?.geometry(),
            )?;
            Ok(d.into())
        })
        .overload(
            &[K::Geometry, K::Geometry, K::Double],
            K::Double,
            |args| {
                let d = measure::hausdorff_distance_densified(
                    args.geometry(0)?.geometry(),
                    args.geometry(1)?.geometry(),
                    args.double(2)?,
                )?;
                Ok(d.into())
            },
        );
    b.function("ST_Angle")
        .overload(&[K::Geometry, K::Geometry], K::Double, |args| {
            let angle = measure::angle_two_lines(
                args.geometry(0)?.geometry(),
                args.geometry(1)?.geometry(),
            )?;
            Ok(angle.into())
        })
        .overload(&[K::Geometry, K::Geometry, K::Geometry], K::Double, |args| {
            let angle = measure::angle_three_points(
                args.geometry(0)?.geometry(),
                args.geometry(1)?.geometry(),
                args.geometry(2)?.geometry(),
            )?;
            Ok(angle.into())
        })
        .overload(
            &[K::Geometry, K::Geometry, K::Geometry, K::Geometry],
            K::Double,
            |args| {
                let angle = measure::angle_four_points(
                    args.geometry(0)?.geometry(),
                    args.geometry(1)?.geometry(),
                    args.geometry(2)?.geometry(),
                    args.geometry(3)?.geometry(),
                )?;
                Ok(angle.into())
            },
        );
    b.function("ST_Degrees").overload(&[K::Double], K::Double, |args| {
        Ok(measure::degrees(args.double(0)?).into())
    });
}

/// Shared by both `ST_DistanceSphere` arities; the radius defaults to the
/// Earth mean radius.
fn sphere_distance(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let radius = args.double_or(2, sphere::EARTH_MEAN_RADIUS)?;
    let d = sphere::sphere_distance(
        args.geometry(0)?.geometry(),
        args.geometry(1)?.geometry(),
        radius,
    )?;
    Ok(d.into())
}
