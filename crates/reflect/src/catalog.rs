use rustc_hash::FxHashMap;

use crate::attr::AttrDesc;
use crate::error::ReflectError;
use crate::instance::Instance;
use crate::tag::{Tag, TagGraph};
use crate::types::{TypeId, TypeSpec, TypeView};

/// The reflection collaborator: enumerates registered types and their
/// flattened attribute descriptors.
///
/// Registration stands in for platform reflection; a type becomes known the
/// moment it is registered. Views are computed once per type, are
/// side-effect-free to read, and stay valid for the catalog's lifetime.
#[derive(Default)]
pub struct Catalog {
	tags: TagGraph,
	views: Vec<TypeView>,
	by_name: FxHashMap<&'static str, TypeId>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares `tag` as extending `parent`. Extends edges must be in place
	/// before registering types that use the child tag; attribute tag sets
	/// are closed exactly once, at registration.
	pub fn extend_tag(&mut self, tag: Tag, parent: Tag) {
		self.tags.extend(tag, parent);
	}

	/// Registers a type, producing its flattened view.
	///
	/// Attributes inherited from the parent keep their slot positions; a
	/// re-declaration replaces the inherited descriptor in place (nearest
	/// declaration wins) without moving its slot.
	pub fn register(&mut self, spec: TypeSpec) -> Result<TypeId, ReflectError> {
		if self.by_name.contains_key(spec.name) {
			return Err(ReflectError::DuplicateType(spec.name));
		}
		let parent = match spec.parent {
			Some(parent_name) => Some(self.by_name.get(parent_name).copied().ok_or(
				ReflectError::UnknownParent {
					ty: spec.name,
					parent: parent_name,
				},
			)?),
			None => None,
		};

		let id = TypeId(self.views.len() as u32);
		let mut attrs: Vec<AttrDesc> = match parent {
			Some(pid) => self.views[pid.index()].attrs.clone(),
			None => Vec::new(),
		};
		let mut by_name: FxHashMap<&'static str, u32> = match parent {
			Some(pid) => self.views[pid.index()].by_name.clone(),
			None => FxHashMap::default(),
		};

		let mut seen: FxHashMap<&'static str, ()> = FxHashMap::default();
		for attr in spec.attrs {
			if seen.insert(attr.name, ()).is_some() {
				return Err(ReflectError::DuplicateAttribute {
					ty: spec.name,
					attr: attr.name,
				});
			}
			let desc = AttrDesc {
				name: attr.name,
				value_type: attr.value_type,
				tags: self.tags.close(attr.tags),
				access: attr.access,
				declared_by: id,
				slot: 0,
				native_getter: attr.native_getter,
				native_setter: attr.native_setter,
			};
			match by_name.get(attr.name) {
				Some(&i) => {
					let slot = attrs[i as usize].slot;
					attrs[i as usize] = AttrDesc { slot, ..desc };
				}
				None => {
					let slot = attrs.len() as u32;
					by_name.insert(attr.name, slot);
					attrs.push(AttrDesc { slot, ..desc });
				}
			}
		}

		self.views.push(TypeView {
			id,
			name: spec.name,
			parent,
			attrs,
			by_name,
		});
		self.by_name.insert(spec.name, id);
		Ok(id)
	}

	pub fn lookup(&self, name: &str) -> Result<TypeId, ReflectError> {
		self.by_name
			.get(name)
			.copied()
			.ok_or_else(|| ReflectError::UnknownType(name.to_string()))
	}

	/// Flattened description of a registered type.
	pub fn view(&self, id: TypeId) -> &TypeView {
		&self.views[id.index()]
	}

	pub fn name_of(&self, id: TypeId) -> &'static str {
		self.views[id.index()].name
	}

	/// All registered type views, in registration order.
	pub fn types(&self) -> impl Iterator<Item = &TypeView> {
		self.views.iter()
	}

	pub fn len(&self) -> usize {
		self.views.len()
	}

	pub fn is_empty(&self) -> bool {
		self.views.is_empty()
	}

	/// Whether `ty` is `ancestor` or derives from it.
	pub fn is_descendant(&self, ty: TypeId, ancestor: TypeId) -> bool {
		let mut cur = Some(ty);
		while let Some(id) = cur {
			if id == ancestor {
				return true;
			}
			cur = self.views[id.index()].parent;
		}
		false
	}

	/// Creates a fresh instance of a registered type with empty slots.
	pub fn spawn(&self, id: TypeId) -> Instance {
		Instance::new(id, self.views[id.index()].slot_count())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::attr::{Access, AttrSpec};
	use crate::value::{Value, ValueType};

	fn base_catalog() -> Catalog {
		let mut catalog = Catalog::new();
		catalog
			.register(
				TypeSpec::new("Entity")
					.attr(AttrSpec::of("id", ValueType::Int))
					.attr(AttrSpec::of("label", ValueType::Str).tag(Tag("ui"))),
			)
			.unwrap();
		catalog
			.register(
				TypeSpec::new("Player")
					.parent("Entity")
					.attr(AttrSpec::of("score", ValueType::Int))
					.attr(AttrSpec::of("label", ValueType::Str)),
			)
			.unwrap();
		catalog
	}

	#[test]
	fn ancestry_is_flattened_with_stable_slots() {
		let catalog = base_catalog();
		let player = catalog.lookup("Player").unwrap();
		let view = catalog.view(player);

		let names: Vec<_> = view.attrs().iter().map(|a| a.name).collect();
		assert_eq!(names, vec!["id", "label", "score"]);
		assert_eq!(view.attr("label").unwrap().slot, 1);
	}

	#[test]
	fn nearest_declaration_wins() {
		let catalog = base_catalog();
		let entity = catalog.lookup("Entity").unwrap();
		let player = catalog.lookup("Player").unwrap();

		// Player re-declares "label" without the tag; the narrower set is
		// honored on Player while Entity keeps its own.
		let on_player = catalog.view(player).attr("label").unwrap();
		assert_eq!(on_player.declared_by, player);
		assert!(on_player.tags.is_empty());

		let on_entity = catalog.view(entity).attr("label").unwrap();
		assert_eq!(on_entity.declared_by, entity);
		assert!(on_entity.tags.contains(Tag("ui")));

		// Inherited attribute keeps its declaring type.
		assert_eq!(catalog.view(player).attr("id").unwrap().declared_by, entity);
	}

	#[test]
	fn tag_sets_close_over_extends() {
		let mut catalog = Catalog::new();
		catalog.extend_tag(Tag("archived"), Tag("settings"));
		catalog
			.register(TypeSpec::new("Config").attr(AttrSpec::new("blob").tag(Tag("archived"))))
			.unwrap();

		let id = catalog.lookup("Config").unwrap();
		let attr = catalog.view(id).attr("blob").unwrap();
		assert!(attr.tags.contains(Tag("archived")));
		assert!(attr.tags.contains(Tag("settings")));
	}

	#[test]
	fn registration_errors() {
		let mut catalog = base_catalog();
		assert!(matches!(
			catalog.register(TypeSpec::new("Entity")),
			Err(ReflectError::DuplicateType("Entity"))
		));
		assert!(matches!(
			catalog.register(TypeSpec::new("Npc").parent("Monster")),
			Err(ReflectError::UnknownParent { .. })
		));
		assert!(matches!(
			catalog.register(
				TypeSpec::new("Twice")
					.attr(AttrSpec::new("x"))
					.attr(AttrSpec::new("x"))
			),
			Err(ReflectError::DuplicateAttribute { .. })
		));
	}

	#[test]
	fn spawn_sizes_slots_from_the_flattened_view() {
		let catalog = base_catalog();
		let player = catalog.lookup("Player").unwrap();
		let instance = catalog.spawn(player);
		assert_eq!(instance.peek(2), None);
		instance.poke(2, Value::Int(9));
		assert_eq!(instance.peek(2), Some(Value::Int(9)));
	}

	#[test]
	fn access_flags_default_to_read_write() {
		let catalog = base_catalog();
		let entity = catalog.lookup("Entity").unwrap();
		assert_eq!(catalog.view(entity).attr("id").unwrap().access, Access::RW);
	}
}
