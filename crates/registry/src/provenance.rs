use std::fmt;

/// Identity of an imperative rule, assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u32);

impl fmt::Display for RuleId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rule#{}", self.0)
	}
}

/// Records which installer put an override in place. Used for conflict
/// detection and selective removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
	/// A declarative capability family, by name.
	Family(&'static str),
	/// An imperative rule.
	Rule(RuleId),
}

impl Provenance {
	/// Whether an existing record with this provenance admits a new install
	/// request from `other`.
	///
	/// Identical provenance is an idempotent retry. Two distinct imperative
	/// rules share one family (first match stays installed, the retry is
	/// counted). Declarative families are mutually exclusive per attribute,
	/// between themselves and against rules.
	pub(crate) fn admits(self, other: Self) -> bool {
		match (self, other) {
			(a, b) if a == b => true,
			(Self::Rule(_), Self::Rule(_)) => true,
			_ => false,
		}
	}
}

impl fmt::Display for Provenance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Family(name) => write!(f, "family:{name}"),
			Self::Rule(id) => write!(f, "{id}"),
		}
	}
}
