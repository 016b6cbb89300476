use thiserror::Error;

use crate::accessor::AccessorKind;
use crate::provenance::Provenance;

/// Per-installation failures. These abort the single installation they
/// occur in; setup continues attribute-by-attribute.
#[derive(Debug, Clone, Error)]
pub enum InstallError {
	/// Two installers target the same attribute accessor and at least one
	/// of them is a declarative family. The attribute keeps its prior state.
	#[error("conflicting override for {type_name}.{attr} ({kind}): installed by {existing}, requested by {requested}")]
	Conflict {
		type_name: &'static str,
		attr: &'static str,
		kind: AccessorKind,
		existing: Provenance,
		requested: Provenance,
	},
	/// The rule targets an accessor kind the attribute does not support
	/// (e.g. a getter override on a write-only attribute).
	#[error("{type_name}.{attr} does not support {kind} access")]
	CapabilityMismatch {
		type_name: &'static str,
		attr: &'static str,
		kind: AccessorKind,
	},
	/// The named attribute is not declared on the target type.
	#[error("unknown attribute {type_name}.{attr}")]
	UnknownAttribute {
		type_name: &'static str,
		attr: String,
	},
}

/// Steady-state attribute access failures.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
	#[error("unknown attribute {type_name}.{attr}")]
	UnknownAttribute {
		type_name: &'static str,
		attr: String,
	},
	#[error("{type_name}.{attr} is not readable")]
	NotReadable {
		type_name: &'static str,
		attr: &'static str,
	},
	#[error("{type_name}.{attr} is not writable")]
	NotWritable {
		type_name: &'static str,
		attr: &'static str,
	},
}

/// Session-level failures raised once, at `finalize()`.
#[derive(Debug, Error)]
pub enum SetupError {
	/// Attributes tagged as requiring injection that no rule or family ever
	/// matched. Aggregates every violation found in the session.
	#[error("unmatched required attributes: {}", .attrs.join(", "))]
	UnmatchedRequired { attrs: Vec<String> },
	#[error(transparent)]
	Reflect(#[from] graft_reflect::ReflectError),
}
