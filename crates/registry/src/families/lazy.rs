use std::sync::Arc;

use graft_reflect::{AttrDesc, Catalog, Tag, TypeView, Value};

use super::{DeclarativeFamily, FamilyAccessors};
use crate::accessor::getters;
use crate::tags;

/// Produces one fresh value per instance, invoked on first read.
pub type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

type Factory = Arc<dyn Fn(&TypeView, &AttrDesc) -> Option<Producer> + Send + Sync>;

/// Constructs and caches a value on the first read of each tagged
/// attribute.
///
/// Primitive-typed attributes default to their zero value; object-typed
/// and undeclared attributes need a factory and are skipped without one.
#[derive(Default)]
pub struct LazyFamily {
	factory: Option<Factory>,
}

impl LazyFamily {
	pub fn new() -> Self {
		Self::default()
	}

	/// Supplies per-attribute constructors. Returning `None` falls back to
	/// the declared type's default value.
	pub fn with_factory(
		f: impl Fn(&TypeView, &AttrDesc) -> Option<Producer> + Send + Sync + 'static,
	) -> Self {
		Self {
			factory: Some(Arc::new(f)),
		}
	}
}

impl DeclarativeFamily for LazyFamily {
	fn name(&self) -> &'static str {
		"lazy"
	}

	fn tag(&self) -> Tag {
		tags::LAZY
	}

	fn accessors(
		&self,
		_catalog: &Catalog,
		view: &TypeView,
		attr: &AttrDesc,
	) -> Option<FamilyAccessors> {
		let produce: Producer = match self.factory.as_ref().and_then(|f| f(view, attr)) {
			Some(producer) => producer,
			None => {
				let zero = attr.value_type.default_value()?;
				Arc::new(move || zero.clone())
			}
		};
		Some(FamilyAccessors {
			getter: Some(getters::cache_on_first_read(move |_| produce())),
			setter: None,
		})
	}
}
