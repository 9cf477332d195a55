//! The spatial function catalog and its dispatch layer.
//!
//! This crate owns the contract surface the hosting engine sees: ~100 named
//! spatial operations, each described by a [FunctionDescriptor] holding one or
//! more [Signature]s and the bindings that delegate to the kernel and codec
//! crates. Overload resolution is an exact positional match over
//! [ValueKind](spatial_fusion_model::ValueKind)s; everything ambiguous is
//! rejected when the catalog is built, not when a row is processed.

mod args;
mod builtin;
mod catalog;
mod descriptor;
mod error;

pub use args::Args;
pub use catalog::{CatalogBuilder, FunctionBuilder, FunctionCatalog, ResolvedCall};
pub use descriptor::{BindingFn, FunctionDescriptor, NullPolicy, Overload, Signature};
pub use error::{FunctionError, RegistrationError, ResolutionError};
