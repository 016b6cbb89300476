use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Runtime value flowing through attribute accessors.
///
/// Attributes whose declared type is a host object carry an opaque
/// [`Value::Object`]; everything else uses the plain variants. Values are
/// cheap to clone (strings and objects are reference-counted).
#[derive(Clone, Default)]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	Object(Arc<dyn Any + Send + Sync>),
}

impl Value {
	pub fn str(s: impl AsRef<str>) -> Self {
		Self::Str(Arc::from(s.as_ref()))
	}

	pub fn object<T: Any + Send + Sync>(obj: T) -> Self {
		Self::Object(Arc::new(obj))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_float(&self) -> Option<f64> {
		match self {
			Self::Float(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}

	/// Downcasts an [`Value::Object`] payload.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<&T> {
		match self {
			Self::Object(obj) => obj.downcast_ref(),
			_ => None,
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			// Opaque payloads compare by identity.
			(Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Null => write!(f, "null"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Int(n) => write!(f, "{n}"),
			Self::Float(n) => write!(f, "{n}"),
			Self::Str(s) => write!(f, "{s:?}"),
			Self::Object(_) => write!(f, "<object>"),
		}
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

impl From<i64> for Value {
	fn from(n: i64) -> Self {
		Self::Int(n)
	}
}

impl From<f64> for Value {
	fn from(n: f64) -> Self {
		Self::Float(n)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Self::str(s)
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Self::Str(Arc::from(s))
	}
}

/// Declared type of an attribute.
///
/// [`ValueType::Any`] stands for an absent declaration and matches every
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	Any,
	Bool,
	Int,
	Float,
	Str,
	/// Host object type, identified by its registered name.
	Named(&'static str),
}

impl ValueType {
	/// Whether `value` satisfies this declared type. Null satisfies any
	/// declaration, mirroring absent object references.
	pub fn admits(self, value: &Value) -> bool {
		match (self, value) {
			(Self::Any, _) | (_, Value::Null) => true,
			(Self::Bool, Value::Bool(_)) => true,
			(Self::Int, Value::Int(_)) => true,
			(Self::Float, Value::Float(_)) => true,
			(Self::Str, Value::Str(_)) => true,
			(Self::Named(_), Value::Object(_)) => true,
			_ => false,
		}
	}

	/// Zero value for primitive declarations. Object-typed and undeclared
	/// attributes have no intrinsic default; their construction is the
	/// caller's business.
	pub fn default_value(self) -> Option<Value> {
		match self {
			Self::Bool => Some(Value::Bool(false)),
			Self::Int => Some(Value::Int(0)),
			Self::Float => Some(Value::Float(0.0)),
			Self::Str => Some(Value::str("")),
			Self::Any | Self::Named(_) => None,
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Any => write!(f, "any"),
			Self::Bool => write!(f, "bool"),
			Self::Int => write!(f, "int"),
			Self::Float => write!(f, "float"),
			Self::Str => write!(f, "str"),
			Self::Named(name) => write!(f, "{name}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn admits_follows_declared_type() {
		assert!(ValueType::Int.admits(&Value::Int(3)));
		assert!(!ValueType::Int.admits(&Value::str("3")));
		assert!(ValueType::Any.admits(&Value::object(vec![1u8])));
		// Null passes every declaration.
		assert!(ValueType::Named("Service").admits(&Value::Null));
	}

	#[test]
	fn objects_compare_by_identity() {
		let a = Value::object(7u32);
		let b = a.clone();
		assert_eq!(a, b);
		assert_ne!(a, Value::object(7u32));
	}
}
