//! Well-known capability tags consumed by the built-in families.

use graft_reflect::Tag;

/// Marks an attribute that must be injected at least once during setup;
/// attributes carrying this tag and matched by nothing fail `finalize()`.
pub const INJECT: Tag = Tag("inject");

/// Opts an attribute into [`crate::families::LazyFamily`]: construct and
/// cache a value on first read.
pub const LAZY: Tag = Tag("lazy");

/// Opts an attribute into [`crate::families::DynamicFamily`]: plain
/// slot-backed storage accessors.
pub const DYNAMIC: Tag = Tag("dynamic");

/// Opts an attribute into [`crate::families::SettingsFamily`]: reads and
/// writes go to the persistence collaborator.
pub const SETTINGS: Tag = Tag("settings");
