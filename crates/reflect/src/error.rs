use thiserror::Error;

/// Catalog registration and lookup failures.
#[derive(Debug, Clone, Error)]
pub enum ReflectError {
	/// A type with this name is already registered.
	#[error("duplicate type: {0}")]
	DuplicateType(&'static str),
	/// The named parent has not been registered.
	#[error("unknown parent {parent} for type {ty}")]
	UnknownParent {
		ty: &'static str,
		parent: &'static str,
	},
	/// The same attribute name appears twice in one declaration.
	#[error("duplicate attribute {attr} on type {ty}")]
	DuplicateAttribute {
		ty: &'static str,
		attr: &'static str,
	},
	/// Lookup of an unregistered type.
	#[error("unknown type: {0}")]
	UnknownType(String),
}
