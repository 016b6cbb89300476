use std::fmt::Write as _;

use graft_reflect::Catalog;

use crate::table::OverrideTable;

/// Human-readable tree of installed overrides: types, their intercepted
/// attributes, accessor kinds, and provenance. Operational inspection aid.
pub fn dump(catalog: &Catalog, table: &OverrideTable) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "override table ({} installed)", table.len());

	let mut types = table.installed_types();
	types.sort_by_key(|&ty| catalog.name_of(ty));
	for ty in types {
		let _ = writeln!(out, "{}", catalog.name_of(ty));
		for (attr, kind, provenance) in table.installed_attrs(ty) {
			let _ = writeln!(out, "\t{attr} [{kind}] <- {provenance}");
		}
	}
	out
}
