//! C type graph for the cffi recompiler.
//!
//! This crate holds the model a C declaration parser produces and the
//! recompiler consumes:
//!
//! - [`TypePool`]: arena of type nodes addressed by [`TypeId`]
//! - [`Declarations`]: the `(kind, name) → target` map
//! - [`Ffi`]: one interface, with ownership information for included units
//!
//! # Identity
//!
//! Struct, union and enum nodes are nominal: each declaration gets its own
//! handle even when two declarations are field-for-field identical. All
//! other nodes are hash-consed, so building `int *` twice yields one handle.
//!
//! ```text
//! TypePool ──► Declarations ──► Ffi ──► cffi_recompiler
//! ```

mod data;
mod decl;
mod error;
mod ffi;
mod id;
mod pool;
mod primitive;
mod target;

pub use data::{
    Aggregate, AggregateKind, AggregateOrigin, ArrayLength, EnumData, Enumerator, Field,
    FunctionSig, TypeData,
};
pub use decl::{DeclKind, DeclTarget, Declaration, Declarations, MacroValue};
pub use error::ModelError;
pub use ffi::{Ffi, IncludedUnit};
pub use id::TypeId;
pub use pool::TypePool;
pub use primitive::{Primitive, PrimitiveKind};
pub use target::DataModel;
