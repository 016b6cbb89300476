//! Accessor composition and installation.
//!
//! The engine turns injected logic into a composed accessor — custom logic
//! plus slot semantics, the do-not-inject fall-through, and an optional
//! call-through to hand-written accessor logic captured at install time —
//! and hands it to the [`OverrideTable`], which enforces the conflict
//! policy.

use std::sync::Arc;

use graft_reflect::{AttrDesc, Catalog, NativeGetter, NativeSetter};

use crate::accessor::{AccessorKind, GetOutcome, Getter, Setter};
use crate::error::InstallError;
use crate::provenance::Provenance;
use crate::table::{AttrPath, Composed, InstallAction, OverrideTable};

fn resolve<'c>(
	catalog: &'c Catalog,
	path: AttrPath,
	kind: AccessorKind,
) -> Result<&'c AttrDesc, InstallError> {
	let view = catalog.view(path.owner);
	let desc = view
		.attr(path.name)
		.ok_or_else(|| InstallError::UnknownAttribute {
			type_name: view.name,
			attr: path.name.to_string(),
		})?;
	let supported = match kind {
		AccessorKind::Get => desc.readable(),
		AccessorKind::Set => desc.writable(),
	};
	if !supported {
		return Err(InstallError::CapabilityMismatch {
			type_name: view.name,
			attr: desc.name,
			kind,
		});
	}
	Ok(desc)
}

/// Installs a getter override for `path`.
///
/// The call-through entry point is the attribute's hand-written getter,
/// resolved here, once; invoking it from inside the override never
/// re-enters the engine. `GetOutcome::Pass` falls through to that entry
/// point, or to a plain slot read when none exists.
pub fn install_getter(
	catalog: &Catalog,
	table: &mut OverrideTable,
	path: AttrPath,
	getter: Getter,
	provenance: Provenance,
) -> Result<InstallAction, InstallError> {
	let desc = resolve(catalog, path, AccessorKind::Get)?;
	let chain = desc.native_getter.clone();
	let chained = chain.is_some();

	let composed: NativeGetter = Arc::new(move |target, slot| {
		match getter(target, slot, chain.as_ref()) {
			GetOutcome::Inject(value) => value,
			GetOutcome::Pass => match &chain {
				Some(original) => original(target, slot),
				None => slot.clone().unwrap_or_default(),
			},
		}
	});
	table.install(
		catalog,
		path,
		AccessorKind::Get,
		Composed::Get(composed),
		chained,
		provenance,
	)
}

/// Installs a setter override for `path`. Counterpart of
/// [`install_getter`]; the injected logic owns the store decision.
pub fn install_setter(
	catalog: &Catalog,
	table: &mut OverrideTable,
	path: AttrPath,
	setter: Setter,
	provenance: Provenance,
) -> Result<InstallAction, InstallError> {
	let desc = resolve(catalog, path, AccessorKind::Set)?;
	let chain = desc.native_setter.clone();
	let chained = chain.is_some();

	let composed: NativeSetter = Arc::new(move |target, slot, value| {
		setter(target, slot, value, chain.as_ref());
	});
	table.install(
		catalog,
		path,
		AccessorKind::Set,
		Composed::Set(composed),
		chained,
		provenance,
	)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::sync::atomic::{AtomicU32, Ordering};

	use graft_reflect::{AttrSpec, Catalog, TypeSpec, Value, ValueType};
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::accessor::getters;
	use crate::provenance::RuleId;

	#[test]
	fn pass_falls_through_to_default_storage() {
		let mut catalog = Catalog::new();
		let id = catalog
			.register(TypeSpec::new("Doc").attr(AttrSpec::of("title", ValueType::Str)))
			.unwrap();
		let path = AttrPath { owner: id, name: "title" };
		let mut table = OverrideTable::new();

		install_getter(
			&catalog,
			&mut table,
			path,
			getters::from_fn(|_, slot, _| match slot {
				Some(_) => GetOutcome::Pass,
				None => GetOutcome::Inject(Value::str("untitled")),
			}),
			Provenance::Rule(RuleId(0)),
		)
		.unwrap();

		let doc = catalog.spawn(id);
		assert_eq!(table.read(&catalog, &doc, "title").unwrap(), Value::str("untitled"));
		table
			.write(&catalog, &doc, "title", Value::str("notes"))
			.unwrap();
		assert_eq!(table.read(&catalog, &doc, "title").unwrap(), Value::str("notes"));
	}

	#[test]
	fn call_through_reproduces_native_behavior() {
		let calls = Arc::new(AtomicU32::new(0));
		let counter = calls.clone();

		let mut catalog = Catalog::new();
		let id = catalog
			.register(TypeSpec::new("Meter").attr(
				AttrSpec::of("reading", ValueType::Int).native_getter(move |_, _| {
					counter.fetch_add(1, Ordering::Relaxed);
					Value::Int(100)
				}),
			))
			.unwrap();
		let path = AttrPath { owner: id, name: "reading" };
		let mut table = OverrideTable::new();

		// Override doubles whatever the original produces.
		install_getter(
			&catalog,
			&mut table,
			path,
			getters::from_fn(|target, slot, original| match original {
				Some(original) => {
					let base = original(target, slot);
					GetOutcome::Inject(Value::Int(base.as_int().unwrap_or(0) * 2))
				}
				None => GetOutcome::Pass,
			}),
			Provenance::Rule(RuleId(0)),
		)
		.unwrap();

		let meter = catalog.spawn(id);
		assert_eq!(table.read(&catalog, &meter, "reading").unwrap(), Value::Int(200));
		// The original ran exactly once, with its side effect intact.
		assert_eq!(calls.load(Ordering::Relaxed), 1);
	}

	#[test]
	fn getter_rule_on_write_only_attribute_is_a_capability_mismatch() {
		let mut catalog = Catalog::new();
		let id = catalog
			.register(TypeSpec::new("Sink").attr(AttrSpec::new("input").write_only()))
			.unwrap();
		let path = AttrPath { owner: id, name: "input" };
		let mut table = OverrideTable::new();

		let err = install_getter(
			&catalog,
			&mut table,
			path,
			getters::slot(),
			Provenance::Family("dynamic"),
		)
		.unwrap_err();
		assert!(matches!(err, InstallError::CapabilityMismatch { .. }));
		assert!(!table.is_installed(path, AccessorKind::Get));
	}
}
