//! Editors and the coordinate reference system transform.
//!
//! Editors that keep the coordinate traversal order intact carry the Z/M
//! ordinate tables through; editors that restructure coordinates return
//! planar results (see DESIGN.md).

use crate::{Args, CatalogBuilder, FunctionError};
use spatial_fusion_kernel::transform::TransformCache;
use spatial_fusion_kernel::{editor, KernelError};
use spatial_fusion_model::{
    CoordDim, SpatialGeometry, SpatialValue, ValueKind as K, UNKNOWN_SRID,
};
use std::sync::Arc;

pub(super) fn register(b: &mut CatalogBuilder, transforms: &Arc<TransformCache>) {
    b.function("ST_AddPoint")
        .overload(&[K::Geometry, K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = editor::add_point(g.geometry(), args.geometry(1)?.geometry(), None)?;
            Ok(g.derive(out).into())
        })
        .overload(
            &[K::Geometry, K::Geometry, K::Integer],
            K::Geometry,
            |args| {
                let g = args.geometry(0)?;
                let out = editor::add_point(
                    g.geometry(),
                    args.geometry(1)?.geometry(),
                    Some(args.integer(2)?),
                )?;
                Ok(g.derive(out).into())
            },
        );
    b.function("ST_RemovePoint")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(editor::remove_point(g.geometry(), None)?).into())
        })
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = editor::remove_point(g.geometry(), Some(args.integer(1)?))?;
            Ok(g.derive(out).into())
        });
    b.function("ST_SetPoint")
        .overload(
            &[K::Geometry, K::Integer, K::Geometry],
            K::Geometry,
            |args| {
                let g = args.geometry(0)?;
                let out = editor::set_point(
                    g.geometry(),
                    args.integer(1)?,
                    args.geometry(2)?.geometry(),
                )?;
                Ok(g.derive(out).into())
            },
        );

    b.function("ST_SetSRID")
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            Ok(args.geometry(0)?.reref(args.integer(1)?).into())
        });

    b.function("ST_Reverse")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(editor::reverse(g.geometry())).into())
        });
    b.function("ST_FlipCoordinates")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            // Swapping X and Y leaves the traversal order alone, so Z/M ride
            // along.
            Ok(g.derive_same_order(editor::flip_coordinates(g.geometry()))?.into())
        });
    b.function("ST_Normalize")
        .overload(&[K::Geometry], K::Geometry, |args| {
            let g = args.geometry(0)?;
            Ok(g.derive(editor::normalize(g.geometry())).into())
        });
    b.function("ST_ReducePrecision")
        .overload(&[K::Geometry, K::Integer], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = editor::reduce_precision(g.geometry(), args.integer(1)?)?;
            Ok(g.derive_same_order(out)?.into())
        });
    b.function("ST_SimplifyPreserveTopology")
        .overload(&[K::Geometry, K::Double], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let out = editor::simplify_preserve_topology(g.geometry(), args.double(1)?)?;
            Ok(g.derive(out).into())
        });

    b.function("ST_Force_2D")
        .overload(&[K::Geometry], K::Geometry, |args| {
            Ok(args.geometry(0)?.force_2d().into())
        });
    b.function("ST_Force3D")
        .overload(&[K::Geometry], K::Geometry, force_3d)
        .overload(&[K::Geometry, K::Double], K::Geometry, force_3d);

    b.function("ST_Translate")
        .overload(&[K::Geometry, K::Double, K::Double], K::Geometry, |args| {
            let g = args.geometry(0)?;
            let moved = editor::translate(g.geometry(), args.double(1)?, args.double(2)?);
            Ok(g.derive_same_order(moved)?.into())
        })
        .overload(
            &[K::Geometry, K::Double, K::Double, K::Double],
            K::Geometry,
            |args| {
                let g = args.geometry(0)?;
                let moved = editor::translate(g.geometry(), args.double(1)?, args.double(2)?);
                let dz = args.double(3)?;
                let z: Vec<f64> = g.z_ordinates().iter().map(|v| v + dz).collect();
                let out = SpatialGeometry::try_new(
                    moved,
                    g.srid(),
                    g.dim(),
                    z,
                    g.m_ordinates().to_vec(),
                )?;
                Ok(out.into())
            },
        );

    b.function("ST_Affine")
        .overload(
            &[
                K::Geometry,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
            ],
            K::Geometry,
            |args| {
                let g = args.geometry(0)?;
                let out = editor::affine_2d(
                    g.geometry(),
                    args.double(1)?,
                    args.double(2)?,
                    args.double(3)?,
                    args.double(4)?,
                    args.double(5)?,
                    args.double(6)?,
                );
                Ok(g.derive_same_order(out)?.into())
            },
        )
        .overload(
            &[
                K::Geometry,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
                K::Double,
            ],
            K::Geometry,
            affine_twelve,
        );

    // ST_Transform owns the one piece of shared state in this layer: the
    // projection-pair cache, safe for concurrent reads from engine worker
    // threads.
    let cache = Arc::clone(transforms);
    b.function("ST_Transform")
        .overload(&[K::Geometry, K::Integer], K::Geometry, {
            let cache = Arc::clone(&cache);
            move |args| transform_call(&cache, args)
        })
        .overload(&[K::Geometry, K::Integer, K::Boolean], K::Geometry, {
            let cache = Arc::clone(&cache);
            move |args| transform_call(&cache, args)
        })
        .overload(&[K::Geometry, K::Integer, K::Integer], K::Geometry, {
            let cache = Arc::clone(&cache);
            move |args| transform_call(&cache, args)
        })
        .overload(
            &[K::Geometry, K::Integer, K::Integer, K::Boolean],
            K::Geometry,
            move |args| transform_call(&cache, args),
        );
}

/// The Z ordinate added when the caller does not pass any.
const FORCE_3D_Z: f64 = 0.0;

fn force_3d(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    if g.dim().has_z() {
        return Ok(g.clone().into());
    }
    let z = args.double_or(1, FORCE_3D_Z)?;
    let out = SpatialGeometry::try_new(
        g.geometry().clone(),
        g.srid(),
        CoordDim::new(true, g.dim().has_m()),
        vec![z; g.coords_count()],
        g.m_ordinates().to_vec(),
    )?;
    Ok(out.into())
}

fn affine_twelve(args: &Args<'_>) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    let mut matrix = [0.0; 12];
    for (i, slot) in matrix.iter_mut().enumerate() {
        *slot = args.double(i + 1)?;
    }
    if g.dim().has_z() {
        let (out, z) = editor::affine_3d(g.geometry(), g.z_ordinates(), matrix);
        let out = SpatialGeometry::try_new(out, g.srid(), g.dim(), z, g.m_ordinates().to_vec())?;
        return Ok(out.into());
    }
    let [a, bb, _, d, e, _, _, _, _, xoff, yoff, _] = matrix;
    let out = editor::affine_2d(g.geometry(), a, bb, d, e, xoff, yoff);
    Ok(g.derive_same_order(out)?.into())
}

/// Shared by every `ST_Transform` arity.
///
/// Two-integer arities name the source and target reference systems
/// explicitly; otherwise the source comes from the geometry itself. The
/// leniency flag defaults to strict.
fn transform_call(
    cache: &TransformCache,
    args: &Args<'_>,
) -> Result<SpatialValue, FunctionError> {
    let g = args.geometry(0)?;
    let (source, target, lenient) = match args.len() {
        2 => (source_srid(g)?, args.integer(1)?, false),
        3 => match args.boolean(2) {
            Ok(lenient) => (source_srid(g)?, args.integer(1)?, lenient),
            Err(_) => (args.integer(1)?, args.integer(2)?, false),
        },
        _ => (args.integer(1)?, args.integer(2)?, args.boolean(3)?),
    };
    let out = cache.transform(g.geometry(), source, target, lenient)?;
    Ok(SpatialGeometry::with_srid(out, target).into())
}

fn source_srid(g: &SpatialGeometry) -> Result<i32, FunctionError> {
    if g.srid() == UNKNOWN_SRID {
        return Err(KernelError::UnknownCrs(
            "unspecified source reference id (0)".to_owned(),
        )
        .into());
    }
    Ok(g.srid())
}
