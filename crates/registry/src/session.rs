use graft_reflect::Catalog;
use rustc_hash::FxHashSet;

use crate::accessor::{AccessorKind, Getter, Setter};
use crate::capability::CapabilityIndex;
use crate::diagnostics::{self, DuplicateInstall, SetupReport};
use crate::engine;
use crate::error::{InstallError, SetupError};
use crate::families::DeclarativeFamily;
use crate::provenance::{Provenance, RuleId};
use crate::rules::{self, Rule};
use crate::table::{AttrPath, InstallAction, OverrideTable};
use crate::tags;

/// One explicit setup session.
///
/// Declarative families apply as soon as they are handed in; imperative
/// rules queue until [`Session::finalize`], which resolves them in
/// registration order, installs the winners, runs the completeness
/// diagnostics, and consumes the session. `finalize` is to be called
/// exactly once; consuming `self` makes a second call unrepresentable.
///
/// Per-attribute failures never abort the session: they are collected into
/// the [`SetupReport`] and the remaining installations proceed.
pub struct Session<'a> {
	catalog: &'a Catalog,
	table: &'a mut OverrideTable,
	caps: CapabilityIndex,
	rules: Vec<Rule>,
	/// Attributes some rule or family targeted, successfully or not.
	matched: FxHashSet<AttrPath>,
	report: SetupReport,
	enforce_required: bool,
}

impl<'a> Session<'a> {
	pub fn new(catalog: &'a Catalog, table: &'a mut OverrideTable) -> Self {
		Self {
			catalog,
			table,
			caps: CapabilityIndex::new(),
			rules: Vec::new(),
			matched: FxHashSet::default(),
			report: SetupReport::default(),
			enforce_required: true,
		}
	}

	/// Disables the required-injection assertion at finalize. Debugging
	/// aid; unmatched attributes are then reported instead of fatal.
	pub fn allow_unmatched(mut self) -> Self {
		self.enforce_required = false;
		self
	}

	/// The attributes carrying `tag`, through this session's memoized
	/// capability index.
	pub fn capability(&self, tag: graft_reflect::Tag) -> std::sync::Arc<[AttrPath]> {
		self.caps.attributes_with_tag(self.catalog, tag)
	}

	/// Applies a declarative family to every attribute carrying its tag.
	/// Returns the number of overrides installed; failures land in the
	/// report.
	pub fn apply(&mut self, family: &dyn DeclarativeFamily) -> usize {
		let provenance = Provenance::Family(family.name());
		let paths = self.caps.attributes_with_tag(self.catalog, family.tag());
		let before = self.report.installed;
		for &path in paths.iter() {
			let view = self.catalog.view(path.owner);
			let Some(attr) = view.attr(path.name) else {
				continue;
			};
			let Some(pair) = family.accessors(self.catalog, view, attr) else {
				continue;
			};
			self.matched.insert(path);
			self.install_pair(path, pair.getter, pair.setter, provenance);
		}
		self.report.installed - before
	}

	/// Queues an imperative rule. Rules are evaluated at finalize, in
	/// registration order; the first match wins per attribute.
	pub fn install_rule(&mut self, rule: Rule) -> RuleId {
		let id = RuleId(self.rules.len() as u32);
		self.rules.push(rule);
		id
	}

	/// Installs both accessors of one attribute, or neither: a conflict on
	/// either kind rejects the whole request and leaves the attribute in
	/// its prior state.
	fn install_pair(
		&mut self,
		path: AttrPath,
		getter: Option<Getter>,
		setter: Option<Setter>,
		provenance: Provenance,
	) {
		for (kind, wanted) in [
			(AccessorKind::Get, getter.is_some()),
			(AccessorKind::Set, setter.is_some()),
		] {
			if !wanted {
				continue;
			}
			if let Some(existing) = self.table.provenance_of(path, kind) {
				if !existing.admits(provenance) {
					self.report.conflicts.push(InstallError::Conflict {
						type_name: self.catalog.name_of(path.owner),
						attr: path.name,
						kind,
						existing,
						requested: provenance,
					});
					return;
				}
			}
		}
		if let Some(getter) = getter {
			match engine::install_getter(self.catalog, self.table, path, getter, provenance) {
				Ok(InstallAction::InsertedNew) => self.report.installed += 1,
				Ok(InstallAction::KeptExisting) => {}
				Err(err) => self.report.conflicts.push(err),
			}
		}
		if let Some(setter) = setter {
			match engine::install_setter(self.catalog, self.table, path, setter, provenance) {
				Ok(InstallAction::InsertedNew) => self.report.installed += 1,
				Ok(InstallAction::KeptExisting) => {}
				Err(err) => self.report.conflicts.push(err),
			}
		}
	}

	/// Resolves queued rules, installs the winners, and runs end-of-session
	/// diagnostics.
	pub fn finalize(mut self) -> Result<SetupReport, SetupError> {
		let resolution = rules::resolve(self.catalog, &self.rules);

		for &(path, index) in &resolution.winners {
			self.matched.insert(path);
			let provenance = Provenance::Rule(RuleId(index as u32));
			let (getter, setter) = self.rules[index].accessor_pair();
			self.install_pair(path, getter, setter, provenance);
		}

		self.report.idle_rules = resolution
			.match_counts
			.iter()
			.enumerate()
			.filter(|&(_, &count)| count == 0)
			.map(|(i, _)| self.rules[i].display_label(i))
			.collect();

		self.report.duplicates = self
			.table
			.duplicate_events()
			.into_iter()
			.map(|(path, kind, events)| DuplicateInstall {
				attr: path.label(self.catalog),
				kind,
				events,
			})
			.collect();

		let required = self.caps.attributes_with_tag(self.catalog, tags::INJECT);
		let unmatched: Vec<String> = required
			.iter()
			.filter(|path| !self.matched.contains(*path))
			.map(|path| path.label(self.catalog))
			.collect();

		if !unmatched.is_empty() && self.enforce_required {
			diagnostics::emit_warnings(&self.report);
			return Err(SetupError::UnmatchedRequired { attrs: unmatched });
		}
		self.report.unmatched_required = unmatched;
		diagnostics::emit_warnings(&self.report);
		Ok(self.report)
	}
}
