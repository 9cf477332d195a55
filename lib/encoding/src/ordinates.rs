//! Helpers for walking Z/M ordinate tables in coordinate traversal order.

use spatial_fusion_model::CoordDim;

/// Read cursor over the Z/M tables of a geometry.
///
/// Writers advance the cursor once per coordinate, in the same traversal
/// order the tables were built in (components in order, exterior ring before
/// interior rings).
pub(crate) struct OrdCursor<'a> {
    z: &'a [f64],
    m: &'a [f64],
    pos: usize,
}

impl<'a> OrdCursor<'a> {
    pub(crate) fn new(z: &'a [f64], m: &'a [f64]) -> Self {
        Self { z, m, pos: 0 }
    }

    pub(crate) fn next(&mut self) -> (Option<f64>, Option<f64>) {
        let z = self.z.get(self.pos).copied();
        let m = self.m.get(self.pos).copied();
        self.pos += 1;
        (z, m)
    }
}

/// Accumulates Z/M ordinates while decoding, enforcing that every coordinate
/// of one geometry agrees on dimensionality.
#[derive(Default)]
pub(crate) struct OrdBuilder {
    z: Vec<f64>,
    m: Vec<f64>,
    dim: Option<CoordDim>,
}

impl OrdBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one coordinate's extra ordinates. Returns `false` on a
    /// dimensionality conflict with earlier coordinates.
    pub(crate) fn push(&mut self, z: Option<f64>, m: Option<f64>) -> bool {
        let dim = CoordDim::new(z.is_some(), m.is_some());
        match self.dim {
            None => self.dim = Some(dim),
            Some(existing) if existing != dim => return false,
            Some(_) => {}
        }
        if let Some(z) = z {
            self.z.push(z);
        }
        if let Some(m) = m {
            self.m.push(m);
        }
        true
    }

    pub(crate) fn finish(self) -> (CoordDim, Vec<f64>, Vec<f64>) {
        (self.dim.unwrap_or_default(), self.z, self.m)
    }
}
