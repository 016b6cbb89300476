//! Declarative capability families.
//!
//! A family targets every attribute carrying its tag and supplies the
//! accessor logic to install. Families are mutually exclusive per
//! attribute; a second family reaching an already-overridden accessor is a
//! conflict.

use graft_reflect::{AttrDesc, Catalog, Tag, TypeView};

use crate::accessor::{Getter, Setter};

mod dynamic;
mod lazy;
mod provider;
mod settings;

pub use dynamic::DynamicFamily;
pub use lazy::LazyFamily;
pub use provider::ProviderFamily;
pub use settings::{KeyFn, MemoryStore, SettingsFamily, SettingsStore};

/// Accessor pair a family supplies for one tagged attribute.
#[derive(Default)]
pub struct FamilyAccessors {
	pub getter: Option<Getter>,
	pub setter: Option<Setter>,
}

/// A declarative injection family.
pub trait DeclarativeFamily {
	/// Family name, used as install provenance.
	fn name(&self) -> &'static str;

	/// Tag opting attributes into this family.
	fn tag(&self) -> Tag;

	/// Accessors to install for one tagged attribute. `None` skips the
	/// attribute for this family.
	fn accessors(
		&self,
		catalog: &Catalog,
		view: &TypeView,
		attr: &AttrDesc,
	) -> Option<FamilyAccessors>;
}
