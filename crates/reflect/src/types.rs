use std::fmt;

use rustc_hash::FxHashMap;

use crate::attr::{AttrDesc, AttrSpec};

/// Dense identifier of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for TypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "type#{}", self.0)
	}
}

/// Registration-time input describing one type.
pub struct TypeSpec {
	pub(crate) name: &'static str,
	pub(crate) parent: Option<&'static str>,
	pub(crate) attrs: Vec<AttrSpec>,
}

impl TypeSpec {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			parent: None,
			attrs: Vec::new(),
		}
	}

	/// Names the superclass; it must already be registered.
	pub fn parent(mut self, name: &'static str) -> Self {
		self.parent = Some(name);
		self
	}

	pub fn attr(mut self, attr: AttrSpec) -> Self {
		self.attrs.push(attr);
		self
	}
}

/// Flattened, memoized description of a type: every attribute declared
/// anywhere in its ancestry, nearest declaration winning.
pub struct TypeView {
	pub id: TypeId,
	pub name: &'static str,
	pub parent: Option<TypeId>,
	pub(crate) attrs: Vec<AttrDesc>,
	pub(crate) by_name: FxHashMap<&'static str, u32>,
}

impl TypeView {
	/// Attributes in ancestry order (root-most declarations first).
	pub fn attrs(&self) -> &[AttrDesc] {
		&self.attrs
	}

	pub fn attr(&self, name: &str) -> Option<&AttrDesc> {
		self.by_name.get(name).map(|&i| &self.attrs[i as usize])
	}

	/// Number of per-instance storage slots.
	pub fn slot_count(&self) -> usize {
		self.attrs.len()
	}
}

impl fmt::Debug for TypeView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TypeView")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("parent", &self.parent)
			.field("attrs", &self.attrs)
			.finish()
	}
}
