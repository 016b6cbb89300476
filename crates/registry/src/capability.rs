use std::sync::Arc;

use graft_reflect::{Catalog, Tag};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::table::AttrPath;

/// Lazily computed, memoized index from capability tag to the attributes
/// carrying it.
///
/// Results are canonical (declaring type, attribute) pairs; subtypes
/// inherit them through the access path, and a subtype re-declaring an
/// attribute with a narrower tag set is simply a different canonical pair
/// (nearest declaration wins). The cache assumes no type registration
/// happens after the first query, per the setup-phase contract.
#[derive(Default)]
pub struct CapabilityIndex {
	cache: Mutex<FxHashMap<Tag, Arc<[AttrPath]>>>,
}

impl CapabilityIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn attributes_with_tag(&self, catalog: &Catalog, tag: Tag) -> Arc<[AttrPath]> {
		if let Some(hit) = self.cache.lock().get(&tag) {
			return hit.clone();
		}
		let mut paths = Vec::new();
		for view in catalog.types() {
			for attr in view.attrs().iter().filter(|a| a.declared_by == view.id) {
				if attr.tags.contains(tag) {
					paths.push(AttrPath {
						owner: view.id,
						name: attr.name,
					});
				}
			}
		}
		let paths: Arc<[AttrPath]> = paths.into();
		self.cache.lock().insert(tag, paths.clone());
		paths
	}
}

#[cfg(test)]
mod tests {
	use graft_reflect::{AttrSpec, TypeSpec};

	use super::*;

	#[test]
	fn tagged_attributes_are_canonical_and_nearest_wins() {
		let mut catalog = Catalog::new();
		let base = catalog
			.register(
				TypeSpec::new("Base")
					.attr(AttrSpec::new("cache").tag(Tag("lazy")))
					.attr(AttrSpec::new("plain")),
			)
			.unwrap();
		// Derived narrows "cache" to no tags and adds its own tagged attr.
		let derived = catalog
			.register(
				TypeSpec::new("Derived")
					.parent("Base")
					.attr(AttrSpec::new("cache"))
					.attr(AttrSpec::new("log").tag(Tag("lazy"))),
			)
			.unwrap();

		let index = CapabilityIndex::new();
		let paths = index.attributes_with_tag(&catalog, Tag("lazy"));
		assert_eq!(
			paths.to_vec(),
			vec![
				AttrPath { owner: base, name: "cache" },
				AttrPath { owner: derived, name: "log" },
			]
		);
	}

	#[test]
	fn queries_are_memoized() {
		let mut catalog = Catalog::new();
		catalog
			.register(TypeSpec::new("Only").attr(AttrSpec::new("x").tag(Tag("t"))))
			.unwrap();
		let index = CapabilityIndex::new();
		let first = index.attributes_with_tag(&catalog, Tag("t"));
		let second = index.attributes_with_tag(&catalog, Tag("t"));
		assert!(Arc::ptr_eq(&first, &second));
	}
}
