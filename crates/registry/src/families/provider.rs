use std::sync::Arc;

use graft_reflect::{AttrDesc, Catalog, Tag, TypeView, Value};

use super::{DeclarativeFamily, FamilyAccessors};
use crate::accessor::{Getter, getters};
use crate::tags;

type Provide = Arc<dyn Fn(&TypeView, &AttrDesc) -> Option<FamilyAccessors> + Send + Sync>;

/// Declarative injection for attributes tagged [`tags::INJECT`], built
/// from a caller closure consulted once per tagged attribute.
///
/// Attributes the closure declines stay unmatched and count against the
/// required-injection diagnostic at `finalize()`.
pub struct ProviderFamily {
	provide: Provide,
}

impl ProviderFamily {
	/// Injects the returned value whenever the slot is empty.
	pub fn values(f: impl Fn(&TypeView, &AttrDesc) -> Option<Value> + Send + Sync + 'static) -> Self {
		Self {
			provide: Arc::new(move |view, attr| {
				Some(FamilyAccessors {
					getter: Some(getters::value(f(view, attr)?)),
					setter: None,
				})
			}),
		}
	}

	/// Injects a custom getter per attribute.
	pub fn getters(
		f: impl Fn(&TypeView, &AttrDesc) -> Option<Getter> + Send + Sync + 'static,
	) -> Self {
		Self {
			provide: Arc::new(move |view, attr| {
				Some(FamilyAccessors {
					getter: Some(f(view, attr)?),
					setter: None,
				})
			}),
		}
	}
}

impl DeclarativeFamily for ProviderFamily {
	fn name(&self) -> &'static str {
		"inject"
	}

	fn tag(&self) -> Tag {
		tags::INJECT
	}

	fn accessors(
		&self,
		_catalog: &Catalog,
		view: &TypeView,
		attr: &AttrDesc,
	) -> Option<FamilyAccessors> {
		(self.provide)(view, attr)
	}
}
