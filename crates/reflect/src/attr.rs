use std::fmt;
use std::sync::Arc;

use crate::instance::Instance;
use crate::tag::{Tag, TagSet};
use crate::types::TypeId;
use crate::value::{Value, ValueType};

bitflags::bitflags! {
	/// Access modes an attribute supports.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct Access: u8 {
		const READ = 1 << 0;
		const WRITE = 1 << 1;
	}
}

impl Access {
	pub const RW: Self = Self::READ.union(Self::WRITE);
}

/// Hand-written getter logic a type already defines for an attribute.
///
/// Receives the target instance and its resolved storage slot. Accessors
/// must use the provided slot reference; calling back into the instance's
/// slot table from inside an accessor would deadlock on the slot lock.
pub type NativeGetter = Arc<dyn Fn(&Instance, &mut Option<Value>) -> Value + Send + Sync>;

/// Hand-written setter logic a type already defines for an attribute.
pub type NativeSetter = Arc<dyn Fn(&Instance, &mut Option<Value>, Value) + Send + Sync>;

/// Declaration-time input for one attribute.
pub struct AttrSpec {
	pub(crate) name: &'static str,
	pub(crate) value_type: ValueType,
	pub(crate) tags: Vec<Tag>,
	pub(crate) access: Access,
	pub(crate) native_getter: Option<NativeGetter>,
	pub(crate) native_setter: Option<NativeSetter>,
}

impl AttrSpec {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			value_type: ValueType::Any,
			tags: Vec::new(),
			access: Access::RW,
			native_getter: None,
			native_setter: None,
		}
	}

	pub fn of(name: &'static str, value_type: ValueType) -> Self {
		Self {
			value_type,
			..Self::new(name)
		}
	}

	pub fn tag(mut self, tag: Tag) -> Self {
		self.tags.push(tag);
		self
	}

	pub fn read_only(mut self) -> Self {
		self.access = Access::READ;
		self
	}

	pub fn write_only(mut self) -> Self {
		self.access = Access::WRITE;
		self
	}

	/// Attaches existing non-default getter logic; installed overrides will
	/// capture it as their call-through target.
	pub fn native_getter(
		mut self,
		f: impl Fn(&Instance, &mut Option<Value>) -> Value + Send + Sync + 'static,
	) -> Self {
		self.native_getter = Some(Arc::new(f));
		self
	}

	pub fn native_setter(
		mut self,
		f: impl Fn(&Instance, &mut Option<Value>, Value) + Send + Sync + 'static,
	) -> Self {
		self.native_setter = Some(Arc::new(f));
		self
	}
}

/// Resolved attribute descriptor as seen through a type's flattened view.
#[derive(Clone)]
pub struct AttrDesc {
	pub name: &'static str,
	pub value_type: ValueType,
	/// Capability tags, closed over tag inheritance. Immutable after
	/// registration.
	pub tags: TagSet,
	pub access: Access,
	/// Most-derived type that (re)declared this attribute.
	pub declared_by: TypeId,
	/// Index of the per-instance storage slot within the concrete type.
	pub slot: u32,
	pub native_getter: Option<NativeGetter>,
	pub native_setter: Option<NativeSetter>,
}

impl AttrDesc {
	pub fn readable(&self) -> bool {
		self.access.contains(Access::READ)
	}

	pub fn writable(&self) -> bool {
		self.access.contains(Access::WRITE)
	}

	pub fn has_native(&self) -> bool {
		self.native_getter.is_some() || self.native_setter.is_some()
	}
}

impl fmt::Debug for AttrDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttrDesc")
			.field("name", &self.name)
			.field("value_type", &self.value_type)
			.field("tags", &self.tags)
			.field("access", &self.access)
			.field("declared_by", &self.declared_by)
			.field("slot", &self.slot)
			.finish_non_exhaustive()
	}
}
