use std::sync::Arc;

use graft_reflect::{AttrDesc, Catalog, Tag, TypeView, Value, ValueType};

use crate::accessor::{Getter, Setter, getters};
use crate::table::AttrPath;

/// What a rule matches attributes by. The two selector kinds are mutually
/// exclusive; explicit value-type selectors are consulted before tag
/// selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
	/// Attributes declared with exactly this value type.
	Type(ValueType),
	/// Attributes carrying this capability tag.
	Tag(Tag),
}

/// Filter predicate narrowing a rule's matches. Must be pure: it receives
/// the catalog read-only and may not mutate anything observable.
pub type Filter = Arc<dyn Fn(&Catalog, &TypeView, &AttrDesc) -> bool + Send + Sync>;

pub(crate) enum Payload {
	/// Constant: injected while the slot is empty.
	Value(Value),
	/// Computed on first read, then cached in the slot.
	Lazy(Arc<dyn Fn() -> Value + Send + Sync>),
	/// Custom accessor pair.
	Accessors {
		getter: Option<Getter>,
		setter: Option<Setter>,
	},
}

/// One ordered imperative registration. Built via [`Rule::for_type`] or
/// [`Rule::for_tag`]; first registered match wins per attribute.
pub struct Rule {
	pub(crate) label: Option<&'static str>,
	pub(crate) selector: Selector,
	pub(crate) filter: Option<Filter>,
	pub(crate) payload: Payload,
}

impl Rule {
	/// Rule scoped to attributes of one declared value type.
	pub fn for_type(value_type: ValueType) -> RuleBuilder {
		RuleBuilder::new(Selector::Type(value_type))
	}

	/// Rule scoped to attributes carrying a capability tag.
	pub fn for_tag(tag: Tag) -> RuleBuilder {
		RuleBuilder::new(Selector::Tag(tag))
	}
}

pub struct RuleBuilder {
	label: Option<&'static str>,
	selector: Selector,
	filter: Option<Filter>,
}

impl RuleBuilder {
	fn new(selector: Selector) -> Self {
		Self {
			label: None,
			selector,
			filter: None,
		}
	}

	pub fn label(mut self, label: &'static str) -> Self {
		self.label = Some(label);
		self
	}

	/// Narrows matches with a pure predicate. Composes (AND) with any
	/// previously set filter.
	pub fn filter(
		mut self,
		f: impl Fn(&Catalog, &TypeView, &AttrDesc) -> bool + Send + Sync + 'static,
	) -> Self {
		self.filter = Some(match self.filter.take() {
			None => Arc::new(f),
			Some(prev) => Arc::new(move |catalog, view, attr| {
				prev(catalog, view, attr) && f(catalog, view, attr)
			}),
		});
		self
	}

	/// Restricts matches to attributes declared on `type_name` or its
	/// descendants.
	pub fn within(self, type_name: &'static str) -> Self {
		self.filter(move |catalog, view, _| {
			catalog
				.lookup(type_name)
				.is_ok_and(|ancestor| catalog.is_descendant(view.id, ancestor))
		})
	}

	/// Terminal: inject a constant value (used while the slot is empty).
	pub fn value(self, value: impl Into<Value>) -> Rule {
		self.finish(Payload::Value(value.into()))
	}

	/// Terminal: compute the value on first read, cache it in the slot.
	pub fn lazy(self, f: impl Fn() -> Value + Send + Sync + 'static) -> Rule {
		self.finish(Payload::Lazy(Arc::new(f)))
	}

	/// Terminal: custom getter.
	pub fn getter(self, getter: Getter) -> Rule {
		self.finish(Payload::Accessors {
			getter: Some(getter),
			setter: None,
		})
	}

	/// Terminal: custom setter.
	pub fn setter(self, setter: Setter) -> Rule {
		self.finish(Payload::Accessors {
			getter: None,
			setter: Some(setter),
		})
	}

	/// Terminal: custom accessor pair.
	pub fn accessors(self, getter: Option<Getter>, setter: Option<Setter>) -> Rule {
		self.finish(Payload::Accessors { getter, setter })
	}

	fn finish(self, payload: Payload) -> Rule {
		Rule {
			label: self.label,
			selector: self.selector,
			filter: self.filter,
			payload,
		}
	}
}

impl Rule {
	pub(crate) fn matches(&self, catalog: &Catalog, view: &TypeView, attr: &AttrDesc) -> bool {
		let selected = match self.selector {
			Selector::Type(vt) => attr.value_type == vt,
			Selector::Tag(tag) => attr.tags.contains(tag),
		};
		selected
			&& self
				.filter
				.as_ref()
				.is_none_or(|f| f(catalog, view, attr))
	}

	/// Accessor pair realizing this rule's payload.
	pub(crate) fn accessor_pair(&self) -> (Option<Getter>, Option<Setter>) {
		match &self.payload {
			Payload::Value(value) => (Some(getters::value(value.clone())), None),
			Payload::Lazy(f) => {
				let f = f.clone();
				(Some(getters::cache_on_first_read(move |_| f())), None)
			}
			Payload::Accessors { getter, setter } => (getter.clone(), setter.clone()),
		}
	}

	pub(crate) fn display_label(&self, index: usize) -> String {
		match self.label {
			Some(label) => label.to_string(),
			None => format!("rule#{index}"),
		}
	}
}

pub(crate) struct Resolution {
	/// Winning rule index per matched attribute, in discovery order.
	pub winners: Vec<(AttrPath, usize)>,
	/// Attributes matched per rule, indexed by registration order.
	pub match_counts: Vec<u32>,
}

/// Evaluates the ordered rule list once per declared attribute.
///
/// Explicit value-type selectors are evaluated before tag selectors;
/// within a selector kind, registration order decides. The first rule whose
/// selector and filter match wins; later rules are not consulted for that
/// attribute.
pub(crate) fn resolve(catalog: &Catalog, rules: &[Rule]) -> Resolution {
	let mut order: Vec<usize> = (0..rules.len())
		.filter(|&i| matches!(rules[i].selector, Selector::Type(_)))
		.collect();
	order.extend((0..rules.len()).filter(|&i| matches!(rules[i].selector, Selector::Tag(_))));

	let mut winners = Vec::new();
	let mut match_counts = vec![0u32; rules.len()];
	for view in catalog.types() {
		for attr in view.attrs().iter().filter(|a| a.declared_by == view.id) {
			for &i in &order {
				if rules[i].matches(catalog, view, attr) {
					match_counts[i] += 1;
					winners.push((
						AttrPath {
							owner: view.id,
							name: attr.name,
						},
						i,
					));
					break;
				}
			}
		}
	}
	Resolution {
		winners,
		match_counts,
	}
}

#[cfg(test)]
mod tests {
	use graft_reflect::{AttrSpec, TypeSpec};
	use pretty_assertions::assert_eq;

	use super::*;

	fn catalog() -> Catalog {
		let mut catalog = Catalog::new();
		catalog
			.register(
				TypeSpec::new("Service")
					.attr(AttrSpec::of("endpoint", ValueType::Str).tag(Tag("net")))
					.attr(AttrSpec::of("retries", ValueType::Int)),
			)
			.unwrap();
		catalog
			.register(
				TypeSpec::new("Worker")
					.parent("Service")
					.attr(AttrSpec::of("threads", ValueType::Int)),
			)
			.unwrap();
		catalog
	}

	fn winner_names(catalog: &Catalog, res: &Resolution) -> Vec<(String, usize)> {
		res.winners
			.iter()
			.map(|&(path, i)| (path.label(catalog), i))
			.collect()
	}

	#[test]
	fn first_registered_rule_wins_within_a_selector_kind() {
		let catalog = catalog();
		let rules = vec![
			Rule::for_type(ValueType::Int).value(1i64),
			Rule::for_type(ValueType::Int).value(2i64),
		];
		let res = resolve(&catalog, &rules);
		assert_eq!(
			winner_names(&catalog, &res),
			vec![
				("Service.retries".to_string(), 0),
				("Worker.threads".to_string(), 0),
			]
		);
		assert_eq!(res.match_counts, vec![2, 0]);
	}

	#[test]
	fn type_selectors_are_consulted_before_tag_selectors() {
		let catalog = catalog();
		// Registered after the tag rule, but the type selector still wins.
		let rules = vec![
			Rule::for_tag(Tag("net")).value("tagged"),
			Rule::for_type(ValueType::Str).value("typed"),
		];
		let res = resolve(&catalog, &rules);
		assert_eq!(
			winner_names(&catalog, &res),
			vec![("Service.endpoint".to_string(), 1)]
		);
		assert_eq!(res.match_counts, vec![0, 1]);
	}

	#[test]
	fn filters_narrow_and_compose() {
		let catalog = catalog();
		let rules = vec![
			Rule::for_type(ValueType::Int)
				.within("Worker")
				.filter(|_, _, attr| attr.name != "retries")
				.value(8i64),
		];
		let res = resolve(&catalog, &rules);
		assert_eq!(
			winner_names(&catalog, &res),
			vec![("Worker.threads".to_string(), 0)]
		);
	}

	#[test]
	fn swapping_non_overlapping_rules_does_not_change_outcomes() {
		let catalog = catalog();
		let forward = vec![
			Rule::for_type(ValueType::Int).value(1i64),
			Rule::for_type(ValueType::Str).value("s"),
		];
		let backward = vec![
			Rule::for_type(ValueType::Str).value("s"),
			Rule::for_type(ValueType::Int).value(1i64),
		];
		let a = resolve(&catalog, &forward);
		let b = resolve(&catalog, &backward);

		let selector_of = |rules: &[Rule], i: usize| match rules[i].selector {
			Selector::Type(vt) => vt.to_string(),
			Selector::Tag(tag) => tag.to_string(),
		};
		let mut a_names: Vec<(String, String)> = a
			.winners
			.iter()
			.map(|&(p, i)| (p.label(&catalog), selector_of(&forward, i)))
			.collect();
		let mut b_names: Vec<(String, String)> = b
			.winners
			.iter()
			.map(|&(p, i)| (p.label(&catalog), selector_of(&backward, i)))
			.collect();
		a_names.sort();
		b_names.sort();
		assert_eq!(a_names, b_names);
	}

	#[test]
	fn zero_match_rules_are_visible_in_counts() {
		let catalog = catalog();
		let rules = vec![Rule::for_tag(Tag("no-such-tag")).label("stale").value(0i64)];
		let res = resolve(&catalog, &rules);
		assert!(res.winners.is_empty());
		assert_eq!(res.match_counts, vec![0]);
		assert_eq!(rules[0].display_label(0), "stale");
	}
}
