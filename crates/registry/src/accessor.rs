use std::fmt;
use std::sync::Arc;

use graft_reflect::{Instance, NativeGetter, NativeSetter, Value};

/// Which accessor of an attribute an override targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessorKind {
	Get,
	Set,
}

impl fmt::Display for AccessorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Get => f.write_str("get"),
			Self::Set => f.write_str("set"),
		}
	}
}

/// What injected getter logic decided for one read.
pub enum GetOutcome {
	/// Use this value for the current read.
	Inject(Value),
	/// Do-not-inject sentinel: leave the slot untouched and fall through to
	/// the original (or default storage) behavior for this single call.
	Pass,
}

/// Injected getter logic.
///
/// Receives the target instance, its storage slot, and the call-through
/// entry point captured at install time (present when the attribute already
/// had hand-written getter logic).
pub type Getter =
	Arc<dyn Fn(&Instance, &mut Option<Value>, Option<&NativeGetter>) -> GetOutcome + Send + Sync>;

/// Injected setter logic. May validate or transform the value before
/// storing it in the slot, or delegate storage elsewhere entirely.
pub type Setter =
	Arc<dyn Fn(&Instance, &mut Option<Value>, Value, Option<&NativeSetter>) + Send + Sync>;

/// Getter constructors for the common injection shapes.
pub mod getters {
	use super::*;

	pub fn from_fn(
		f: impl Fn(&Instance, &mut Option<Value>, Option<&NativeGetter>) -> GetOutcome
		+ Send
		+ Sync
		+ 'static,
	) -> Getter {
		Arc::new(f)
	}

	/// Always injects `value`, ignoring the slot.
	pub fn constant(value: Value) -> Getter {
		Arc::new(move |_, _, _| GetOutcome::Inject(value.clone()))
	}

	/// Injects `value` while the slot is empty; once something was stored,
	/// reads return the stored value. Nothing is written to the slot.
	pub fn value(value: Value) -> Getter {
		Arc::new(move |_, slot, _| {
			GetOutcome::Inject(match slot {
				Some(stored) => stored.clone(),
				None => value.clone(),
			})
		})
	}

	/// Fills the slot from `make` on first read, then reads the slot.
	pub fn cache_on_first_read(
		make: impl Fn(&Instance) -> Value + Send + Sync + 'static,
	) -> Getter {
		Arc::new(move |target, slot, _| {
			if slot.is_none() {
				*slot = Some(make(target));
			}
			GetOutcome::Inject(slot.clone().unwrap_or_default())
		})
	}

	/// Plain slot read; empty slots read as null.
	pub fn slot() -> Getter {
		Arc::new(|_, slot, _| GetOutcome::Inject(slot.clone().unwrap_or_default()))
	}
}

/// Setter constructors for the common injection shapes.
pub mod setters {
	use super::*;

	pub fn from_fn(
		f: impl Fn(&Instance, &mut Option<Value>, Value, Option<&NativeSetter>) + Send + Sync + 'static,
	) -> Setter {
		Arc::new(f)
	}

	/// Plain slot store.
	pub fn store() -> Setter {
		Arc::new(|_, slot, value, _| *slot = Some(value))
	}

	/// Transforms the value, then stores it in the slot.
	pub fn map(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Setter {
		Arc::new(move |_, slot, value, _| *slot = Some(f(value)))
	}
}
