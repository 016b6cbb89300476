//! Attribute-interception and dependency-injection engine.
//!
//! Given a catalog of described types (`graft-reflect`), this crate
//! installs custom read/write behavior for selected attributes — selected
//! declaratively by capability tag, or imperatively by ordered rules — and
//! keeps the bookkeeping honest: idempotent retries, family conflicts,
//! call-through to hand-written accessor logic, and end-of-session
//! completeness diagnostics.
//!
//! The shape of a setup phase:
//!
//! ```
//! use graft_reflect::{AttrSpec, Catalog, TypeSpec, Value, ValueType};
//! use graft_registry::families::LazyFamily;
//! use graft_registry::{OverrideTable, Rule, Session, tags};
//!
//! let mut catalog = Catalog::new();
//! let player = catalog
//! 	.register(
//! 		TypeSpec::new("Player")
//! 			.attr(AttrSpec::of("score", ValueType::Int).tag(tags::LAZY))
//! 			.attr(AttrSpec::of("name", ValueType::Str)),
//! 	)
//! 	.unwrap();
//!
//! let mut table = OverrideTable::new();
//! let mut session = Session::new(&catalog, &mut table);
//! session.apply(&LazyFamily::new());
//! session.install_rule(Rule::for_type(ValueType::Str).value("n/a"));
//! let report = session.finalize().unwrap();
//! assert!(report.is_clean());
//!
//! let target = catalog.spawn(player);
//! assert_eq!(table.read(&catalog, &target, "score").unwrap(), Value::Int(0));
//! assert_eq!(table.read(&catalog, &target, "name").unwrap(), Value::str("n/a"));
//! ```

mod accessor;
mod capability;
mod debug;
mod diagnostics;
pub mod engine;
mod error;
pub mod families;
mod provenance;
mod rules;
mod session;
mod table;
pub mod tags;

pub use accessor::{AccessorKind, GetOutcome, Getter, Setter};
pub use accessor::{getters, setters};
pub use capability::CapabilityIndex;
pub use debug::dump;
pub use diagnostics::{DuplicateInstall, SetupReport};
pub use error::{AccessError, InstallError, SetupError};
pub use provenance::{Provenance, RuleId};
pub use rules::{Filter, Rule, RuleBuilder, Selector};
pub use session::Session;
pub use table::{AttrPath, InstallAction, OverrideTable};
