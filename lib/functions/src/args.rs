use crate::FunctionError;
use spatial_fusion_model::{SpatialGeometry, SpatialValue, ValueKind};

/// The argument list handed to a binding, with typed accessors.
///
/// By the time a binding runs, dispatch has already matched every argument
/// against the selected signature and the null policy has been applied, so the
/// accessors normally succeed on the first pattern. The error paths guard
/// hand-assembled invocations.
pub struct Args<'a> {
    function: &'a str,
    values: &'a [SpatialValue],
}

impl<'a> Args<'a> {
    pub(crate) fn new(function: &'a str, values: &'a [SpatialValue]) -> Self {
        Self { function, values }
    }

    pub fn function(&self) -> &str {
        self.function
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn mismatch(&self, index: usize, expected: ValueKind) -> FunctionError {
        FunctionError::ArgumentKind {
            function: self.function.to_owned(),
            index,
            expected,
        }
    }

    pub fn geometry(&self, index: usize) -> Result<&'a SpatialGeometry, FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::Geometry(g)) => Ok(g),
            _ => Err(self.mismatch(index, ValueKind::Geometry)),
        }
    }

    pub fn geometry_array(&self, index: usize) -> Result<&'a [SpatialGeometry], FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::GeometryArray(gs)) => Ok(gs),
            _ => Err(self.mismatch(index, ValueKind::GeometryArray)),
        }
    }

    pub fn double(&self, index: usize) -> Result<f64, FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::Double(d)) => Ok(*d),
            _ => Err(self.mismatch(index, ValueKind::Double)),
        }
    }

    pub fn integer(&self, index: usize) -> Result<i32, FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::Integer(i)) => Ok(*i),
            _ => Err(self.mismatch(index, ValueKind::Integer)),
        }
    }

    pub fn string(&self, index: usize) -> Result<&'a str, FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::String(s)) => Ok(s),
            _ => Err(self.mismatch(index, ValueKind::String)),
        }
    }

    pub fn bytes(&self, index: usize) -> Result<&'a [u8], FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::Bytes(b)) => Ok(b),
            _ => Err(self.mismatch(index, ValueKind::Bytes)),
        }
    }

    pub fn boolean(&self, index: usize) -> Result<bool, FunctionError> {
        match self.values.get(index) {
            Some(SpatialValue::Boolean(b)) => Ok(*b),
            _ => Err(self.mismatch(index, ValueKind::Boolean)),
        }
    }

    /// A trailing optional DOUBLE with its per-function default.
    pub fn double_or(&self, index: usize, default: f64) -> Result<f64, FunctionError> {
        if index < self.values.len() {
            self.double(index)
        } else {
            Ok(default)
        }
    }

    /// A trailing optional INTEGER with its per-function default.
    pub fn integer_or(&self, index: usize, default: i32) -> Result<i32, FunctionError> {
        if index < self.values.len() {
            self.integer(index)
        } else {
            Ok(default)
        }
    }

    /// A trailing optional BOOLEAN with its per-function default.
    pub fn boolean_or(&self, index: usize, default: bool) -> Result<bool, FunctionError> {
        if index < self.values.len() {
            self.boolean(index)
        } else {
            Ok(default)
        }
    }
}
