use graft_reflect::{AttrDesc, Catalog, Tag, TypeView};

use super::{DeclarativeFamily, FamilyAccessors};
use crate::accessor::{getters, setters};
use crate::tags;

/// Gives declared-but-unbacked attributes plain slot storage semantics:
/// reads return the slot, writes store into it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicFamily;

impl DynamicFamily {
	pub fn new() -> Self {
		Self
	}
}

impl DeclarativeFamily for DynamicFamily {
	fn name(&self) -> &'static str {
		"dynamic"
	}

	fn tag(&self) -> Tag {
		tags::DYNAMIC
	}

	fn accessors(
		&self,
		_catalog: &Catalog,
		_view: &TypeView,
		attr: &AttrDesc,
	) -> Option<FamilyAccessors> {
		let pair = FamilyAccessors {
			getter: attr.readable().then(getters::slot),
			setter: attr.writable().then(setters::store),
		};
		if pair.getter.is_none() && pair.setter.is_none() {
			return None;
		}
		Some(pair)
	}
}
