use crate::accessor::AccessorKind;
use crate::error::InstallError;

/// One attribute accessor that accumulated more than one install event
/// across the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateInstall {
	/// "Type.attribute" label.
	pub attr: String,
	pub kind: AccessorKind,
	pub events: u32,
}

/// End-of-session accounting returned by `finalize()`.
#[derive(Debug, Default)]
pub struct SetupReport {
	/// Overrides installed (new records, not retries).
	pub installed: usize,
	/// Per-attribute installation failures collected along the way.
	pub conflicts: Vec<InstallError>,
	/// Duplicate-injection warnings.
	pub duplicates: Vec<DuplicateInstall>,
	/// Rules that matched zero attributes (stale or typo'd selectors).
	pub idle_rules: Vec<String>,
	/// Required attributes left unmatched. Only populated when the session
	/// ran with enforcement disabled; otherwise these fail `finalize()`.
	pub unmatched_required: Vec<String>,
}

impl SetupReport {
	/// True when setup completed with nothing to log.
	pub fn is_clean(&self) -> bool {
		self.conflicts.is_empty()
			&& self.duplicates.is_empty()
			&& self.idle_rules.is_empty()
			&& self.unmatched_required.is_empty()
	}
}

/// Routes the report's non-fatal findings to the logging collaborator.
pub(crate) fn emit_warnings(report: &SetupReport) {
	for err in &report.conflicts {
		tracing::warn!(target: "graft", %err, "installation rejected");
	}
	for dup in &report.duplicates {
		tracing::warn!(
			target: "graft",
			attr = %dup.attr,
			kind = %dup.kind,
			events = dup.events,
			"attribute injected more than once"
		);
	}
	for rule in &report.idle_rules {
		tracing::warn!(target: "graft", rule = %rule, "rule matched no attributes");
	}
	for attr in &report.unmatched_required {
		tracing::warn!(target: "graft", attr = %attr, "required attribute never injected");
	}
}
