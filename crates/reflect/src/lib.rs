//! Type and attribute catalog for the graft injection engine.
//!
//! This crate is the reflection collaborator: it knows which types exist,
//! which attributes they declare (with declared value types, capability
//! tags, access flags, and any hand-written accessor logic), and it owns the
//! per-instance storage model. It installs nothing — the interception engine
//! in `graft-registry` consumes these descriptions read-only.
//!
//! Registration replaces platform reflection: hosts describe their types
//! through [`TypeSpec`]/[`AttrSpec`] builders and receive memoized,
//! ancestry-flattened [`TypeView`]s back.

mod attr;
mod catalog;
mod error;
mod instance;
mod tag;
mod types;
mod value;

pub use attr::{Access, AttrDesc, AttrSpec, NativeGetter, NativeSetter};
pub use catalog::Catalog;
pub use error::ReflectError;
pub use instance::Instance;
pub use tag::{Tag, TagGraph, TagSet};
pub use types::{TypeId, TypeSpec, TypeView};
pub use value::{Value, ValueType};
