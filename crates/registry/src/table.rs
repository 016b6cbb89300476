use std::fmt;

use graft_reflect::{Catalog, Instance, NativeGetter, NativeSetter, TypeId, Value};
use rustc_hash::FxHashMap;

use crate::accessor::AccessorKind;
use crate::error::{AccessError, InstallError};
use crate::provenance::Provenance;

/// Canonical override key: the most-derived type declaring the attribute,
/// plus the attribute name. Subtypes inherit through the access path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrPath {
	pub owner: TypeId,
	pub name: &'static str,
}

impl AttrPath {
	pub fn label(&self, catalog: &Catalog) -> String {
		format!("{}.{}", catalog.name_of(self.owner), self.name)
	}
}

/// Composed accessor held by an override record.
#[derive(Clone)]
pub(crate) enum Composed {
	Get(NativeGetter),
	Set(NativeSetter),
}

/// One installed override.
pub(crate) struct OverrideRecord {
	pub(crate) accessor: Composed,
	/// Whether hand-written accessor logic existed before this install and
	/// is chained behind the composed accessor.
	pub(crate) chained: bool,
	pub(crate) provenance: Provenance,
}

impl fmt::Debug for OverrideRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OverrideRecord")
			.field("chained", &self.chained)
			.field("provenance", &self.provenance)
			.finish_non_exhaustive()
	}
}

/// Result of an accepted installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallAction {
	/// No record existed for the key; the override was installed.
	InsertedNew,
	/// A record with compatible provenance existed; the retry was accepted
	/// silently and the existing record kept.
	KeptExisting,
}

/// Source of truth for "is this attribute overridden".
///
/// Shared mutable state scoped to one setup session's output; installation
/// is the only mutator and happens during setup, reads happen afterwards.
/// That split is a documented contract, not runtime-enforced.
#[derive(Default)]
pub struct OverrideTable {
	records: FxHashMap<(AttrPath, AccessorKind), OverrideRecord>,
	/// Accepted install events per key, across the whole session. Survives
	/// uninstalls; feeds the duplicate-injection diagnostic.
	events: FxHashMap<(AttrPath, AccessorKind), u32>,
}

impl OverrideTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn install(
		&mut self,
		catalog: &Catalog,
		path: AttrPath,
		kind: AccessorKind,
		accessor: Composed,
		chained: bool,
		provenance: Provenance,
	) -> Result<InstallAction, InstallError> {
		let action = match self.records.get(&(path, kind)) {
			None => {
				self.records.insert(
					(path, kind),
					OverrideRecord {
						accessor,
						chained,
						provenance,
					},
				);
				InstallAction::InsertedNew
			}
			Some(existing) if existing.provenance.admits(provenance) => {
				// Idempotent retry (or a later rule losing to the first
				// match): keep the installed record.
				InstallAction::KeptExisting
			}
			Some(existing) => {
				return Err(InstallError::Conflict {
					type_name: catalog.name_of(path.owner),
					attr: path.name,
					kind,
					existing: existing.provenance,
					requested: provenance,
				});
			}
		};
		*self.events.entry((path, kind)).or_insert(0) += 1;
		tracing::debug!(target: "graft", attr = %path.label(catalog), %kind, %provenance, ?action, "install");
		Ok(action)
	}

	/// Removes an override. The attribute falls back to the prior accessor
	/// captured at install time (still owned by the catalog) or to default
	/// storage behavior. Most-recently-installed is undone first; with the
	/// at-most-one-installer policy the stack is never deeper than one
	/// override over the native logic.
	pub fn uninstall(&mut self, path: AttrPath, kind: AccessorKind) -> bool {
		self.records.remove(&(path, kind)).is_some()
	}

	/// Removes every override installed by the named declarative family.
	pub fn reject_family(&mut self, family: &str) -> usize {
		self.reject_where(|_, _, p| matches!(p, Provenance::Family(name) if name == family))
	}

	/// Removes overrides matching `pred`.
	pub fn reject_where(
		&mut self,
		pred: impl Fn(AttrPath, AccessorKind, Provenance) -> bool,
	) -> usize {
		let before = self.records.len();
		self.records
			.retain(|&(path, kind), rec| !pred(path, kind, rec.provenance));
		before - self.records.len()
	}

	/// Removes every override. Hand-written native accessors are catalog
	/// state and are never touched.
	pub fn reject_all(&mut self) -> usize {
		let n = self.records.len();
		self.records.clear();
		n
	}

	pub fn is_installed(&self, path: AttrPath, kind: AccessorKind) -> bool {
		self.records.contains_key(&(path, kind))
	}

	pub fn provenance_of(&self, path: AttrPath, kind: AccessorKind) -> Option<Provenance> {
		self.records.get(&(path, kind)).map(|r| r.provenance)
	}

	/// Types with at least one installed override, sorted.
	pub fn installed_types(&self) -> Vec<TypeId> {
		let mut types: Vec<TypeId> = self.records.keys().map(|(path, _)| path.owner).collect();
		types.sort_unstable();
		types.dedup();
		types
	}

	/// Installed overrides on one type: (attribute, kind, provenance),
	/// sorted by attribute then kind.
	pub fn installed_attrs(&self, ty: TypeId) -> Vec<(&'static str, AccessorKind, Provenance)> {
		let mut attrs: Vec<_> = self
			.records
			.iter()
			.filter(|((path, _), _)| path.owner == ty)
			.map(|(&(path, kind), rec)| (path.name, kind, rec.provenance))
			.collect();
		attrs.sort_unstable_by_key(|&(name, kind, _)| (name, kind));
		attrs
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Keys with more than one accepted install event this session.
	pub(crate) fn duplicate_events(&self) -> Vec<(AttrPath, AccessorKind, u32)> {
		let mut dups: Vec<_> = self
			.events
			.iter()
			.filter(|&(_, &n)| n > 1)
			.map(|(&(path, kind), &n)| (path, kind, n))
			.collect();
		dups.sort_unstable();
		dups
	}

	/// Reads an attribute through the installed accessor, the native
	/// accessor, or default slot storage, in that order.
	pub fn read(
		&self,
		catalog: &Catalog,
		target: &Instance,
		attr: &str,
	) -> Result<Value, AccessError> {
		let view = catalog.view(target.type_id());
		let desc = view.attr(attr).ok_or_else(|| AccessError::UnknownAttribute {
			type_name: view.name,
			attr: attr.to_string(),
		})?;
		if !desc.readable() {
			return Err(AccessError::NotReadable {
				type_name: view.name,
				attr: desc.name,
			});
		}
		let path = AttrPath {
			owner: desc.declared_by,
			name: desc.name,
		};
		Ok(target.with_slot(desc.slot, |slot| {
			if let Some(OverrideRecord {
				accessor: Composed::Get(composed),
				..
			}) = self.records.get(&(path, AccessorKind::Get))
			{
				composed(target, slot)
			} else if let Some(native) = &desc.native_getter {
				native(target, slot)
			} else {
				slot.clone().unwrap_or_default()
			}
		}))
	}

	/// Writes an attribute through the installed accessor, the native
	/// accessor, or default slot storage, in that order.
	pub fn write(
		&self,
		catalog: &Catalog,
		target: &Instance,
		attr: &str,
		value: Value,
	) -> Result<(), AccessError> {
		let view = catalog.view(target.type_id());
		let desc = view.attr(attr).ok_or_else(|| AccessError::UnknownAttribute {
			type_name: view.name,
			attr: attr.to_string(),
		})?;
		if !desc.writable() {
			return Err(AccessError::NotWritable {
				type_name: view.name,
				attr: desc.name,
			});
		}
		let path = AttrPath {
			owner: desc.declared_by,
			name: desc.name,
		};
		target.with_slot(desc.slot, |slot| {
			if let Some(OverrideRecord {
				accessor: Composed::Set(composed),
				..
			}) = self.records.get(&(path, AccessorKind::Set))
			{
				composed(target, slot, value);
			} else if let Some(native) = &desc.native_setter {
				native(target, slot, value);
			} else {
				*slot = Some(value);
			}
		});
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use graft_reflect::{AttrSpec, TypeSpec, ValueType};

	use super::*;
	use crate::provenance::RuleId;

	fn setup() -> (Catalog, AttrPath) {
		let mut catalog = Catalog::new();
		let id = catalog
			.register(TypeSpec::new("Widget").attr(AttrSpec::of("size", ValueType::Int)))
			.unwrap();
		(catalog, AttrPath { owner: id, name: "size" })
	}

	fn noop_getter() -> Composed {
		Composed::Get(Arc::new(|_, slot| slot.clone().unwrap_or_default()))
	}

	#[test]
	fn same_provenance_retry_is_accepted_silently() {
		let (catalog, path) = setup();
		let mut table = OverrideTable::new();
		let fam = Provenance::Family("lazy");

		let first = table
			.install(&catalog, path, AccessorKind::Get, noop_getter(), false, fam)
			.unwrap();
		assert_eq!(first, InstallAction::InsertedNew);

		let retry = table
			.install(&catalog, path, AccessorKind::Get, noop_getter(), false, fam)
			.unwrap();
		assert_eq!(retry, InstallAction::KeptExisting);
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn different_family_conflicts_and_leaves_prior_state() {
		let (catalog, path) = setup();
		let mut table = OverrideTable::new();

		table
			.install(
				&catalog,
				path,
				AccessorKind::Get,
				noop_getter(),
				false,
				Provenance::Family("lazy"),
			)
			.unwrap();
		let err = table
			.install(
				&catalog,
				path,
				AccessorKind::Get,
				noop_getter(),
				false,
				Provenance::Family("settings"),
			)
			.unwrap_err();
		assert!(matches!(err, InstallError::Conflict { .. }));
		assert_eq!(
			table.provenance_of(path, AccessorKind::Get),
			Some(Provenance::Family("lazy"))
		);
	}

	#[test]
	fn later_rule_keeps_first_install_and_counts_the_event() {
		let (catalog, path) = setup();
		let mut table = OverrideTable::new();

		table
			.install(
				&catalog,
				path,
				AccessorKind::Get,
				noop_getter(),
				false,
				Provenance::Rule(RuleId(0)),
			)
			.unwrap();
		let action = table
			.install(
				&catalog,
				path,
				AccessorKind::Get,
				noop_getter(),
				false,
				Provenance::Rule(RuleId(3)),
			)
			.unwrap();
		assert_eq!(action, InstallAction::KeptExisting);
		assert_eq!(
			table.provenance_of(path, AccessorKind::Get),
			Some(Provenance::Rule(RuleId(0)))
		);
		assert_eq!(table.duplicate_events(), vec![(path, AccessorKind::Get, 2)]);
	}

	#[test]
	fn uninstall_restores_default_storage() {
		let (catalog, path) = setup();
		let mut table = OverrideTable::new();
		let constant = Composed::Get(Arc::new(|_, _| Value::Int(42)));

		table
			.install(
				&catalog,
				path,
				AccessorKind::Get,
				constant,
				false,
				Provenance::Family("lazy"),
			)
			.unwrap();

		let target = catalog.spawn(path.owner);
		assert_eq!(table.read(&catalog, &target, "size").unwrap(), Value::Int(42));

		assert!(table.uninstall(path, AccessorKind::Get));
		assert_eq!(table.read(&catalog, &target, "size").unwrap(), Value::Null);
		table.write(&catalog, &target, "size", Value::Int(5)).unwrap();
		assert_eq!(table.read(&catalog, &target, "size").unwrap(), Value::Int(5));
	}

	#[test]
	fn reject_family_is_selective() {
		let (catalog, path) = setup();
		let mut table = OverrideTable::new();
		table
			.install(
				&catalog,
				path,
				AccessorKind::Get,
				noop_getter(),
				false,
				Provenance::Family("lazy"),
			)
			.unwrap();
		table
			.install(
				&catalog,
				path,
				AccessorKind::Set,
				Composed::Set(Arc::new(|_, slot, v| *slot = Some(v))),
				false,
				Provenance::Rule(RuleId(0)),
			)
			.unwrap();

		assert_eq!(table.reject_family("settings"), 0);
		assert_eq!(table.reject_family("lazy"), 1);
		assert!(!table.is_installed(path, AccessorKind::Get));
		assert!(table.is_installed(path, AccessorKind::Set));
		assert_eq!(table.reject_all(), 1);
	}

	#[test]
	fn unknown_attribute_read_errs() {
		let (catalog, path) = setup();
		let table = OverrideTable::new();
		let target = catalog.spawn(path.owner);
		assert!(matches!(
			table.read(&catalog, &target, "missing"),
			Err(AccessError::UnknownAttribute { .. })
		));
	}
}
