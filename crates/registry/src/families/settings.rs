use std::sync::Arc;

use graft_reflect::{AttrDesc, Catalog, Tag, TypeView, Value};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{DeclarativeFamily, FamilyAccessors};
use crate::accessor::{GetOutcome, getters, setters};
use crate::tags;

/// Persistence collaborator for the settings family. The engine only
/// depends on this contract; backends and their serialization formats are
/// the host's business.
pub trait SettingsStore: Send {
	fn get(&self, key: &str) -> Option<Value>;
	fn set(&mut self, key: &str, value: Value);
}

/// Maps an attribute to its persistence key. Receives the declaring type's
/// view and the attribute descriptor (name, declared type, tags).
pub type KeyFn = Arc<dyn Fn(&TypeView, &AttrDesc) -> String + Send + Sync>;

/// Routes tagged attributes through a [`SettingsStore`]: reads consult the
/// store (falling through to default behavior when the key is absent),
/// writes delegate storage to the store instead of the instance slot.
pub struct SettingsFamily {
	store: Arc<Mutex<dyn SettingsStore>>,
	key_fn: Option<KeyFn>,
}

impl SettingsFamily {
	/// Keys default to the attribute name.
	pub fn new(store: Arc<Mutex<dyn SettingsStore>>) -> Self {
		Self {
			store,
			key_fn: None,
		}
	}

	pub fn with_keys(
		store: Arc<Mutex<dyn SettingsStore>>,
		key_fn: impl Fn(&TypeView, &AttrDesc) -> String + Send + Sync + 'static,
	) -> Self {
		Self {
			store,
			key_fn: Some(Arc::new(key_fn)),
		}
	}

	fn key_for(&self, view: &TypeView, attr: &AttrDesc) -> String {
		match &self.key_fn {
			Some(f) => f(view, attr),
			None => attr.name.to_string(),
		}
	}
}

impl DeclarativeFamily for SettingsFamily {
	fn name(&self) -> &'static str {
		"settings"
	}

	fn tag(&self) -> Tag {
		tags::SETTINGS
	}

	fn accessors(
		&self,
		_catalog: &Catalog,
		view: &TypeView,
		attr: &AttrDesc,
	) -> Option<FamilyAccessors> {
		let key = self.key_for(view, attr);

		let getter = attr.readable().then(|| {
			let store = self.store.clone();
			let key = key.clone();
			getters::from_fn(move |_, _, _| match store.lock().get(&key) {
				Some(value) => GetOutcome::Inject(value),
				None => GetOutcome::Pass,
			})
		});
		let setter = attr.writable().then(|| {
			let store = self.store.clone();
			setters::from_fn(move |_, _, value, _| store.lock().set(&key, value))
		});
		if getter.is_none() && setter.is_none() {
			return None;
		}
		Some(FamilyAccessors { getter, setter })
	}
}

/// In-memory [`SettingsStore`] for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
	entries: FxHashMap<String, Value>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps the store the way [`SettingsFamily`] consumes it.
	pub fn shared() -> Arc<Mutex<dyn SettingsStore>> {
		Arc::new(Mutex::new(Self::new()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl SettingsStore for MemoryStore {
	fn get(&self, key: &str) -> Option<Value> {
		self.entries.get(key).cloned()
	}

	fn set(&mut self, key: &str, value: Value) {
		self.entries.insert(key.to_string(), value);
	}
}

#[cfg(test)]
mod tests {
	use graft_reflect::{AttrSpec, TypeSpec, ValueType};

	use super::*;

	#[test]
	fn default_key_is_the_attribute_name() {
		let mut catalog = Catalog::new();
		let id = catalog
			.register(
				TypeSpec::new("Prefs")
					.attr(AttrSpec::of("volume", ValueType::Int).tag(tags::SETTINGS)),
			)
			.unwrap();
		let family = SettingsFamily::new(MemoryStore::shared());
		let view = catalog.view(id);
		let attr = view.attr("volume").unwrap();
		assert_eq!(family.key_for(view, attr), "volume");
	}

	#[test]
	fn key_fn_sees_type_and_attribute() {
		let mut catalog = Catalog::new();
		let id = catalog
			.register(
				TypeSpec::new("Prefs")
					.attr(AttrSpec::of("volume", ValueType::Int).tag(tags::SETTINGS)),
			)
			.unwrap();
		let family = SettingsFamily::with_keys(MemoryStore::shared(), |view, attr| {
			format!("{}.{}", view.name.to_lowercase(), attr.name)
		});
		let view = catalog.view(id);
		let attr = view.attr("volume").unwrap();
		assert_eq!(family.key_for(view, attr), "prefs.volume");
	}
}
