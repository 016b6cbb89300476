use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Symbolic capability marker carried by an attribute declaration.
///
/// Tags opt attributes into declarative injection families and are matched
/// by imperative rule selectors. The set of tags is open; families publish
/// their own constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub &'static str);

impl fmt::Display for Tag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Sorted, deduplicated set of tags.
///
/// Attribute tag sets are computed once at registration (closed over the
/// [`TagGraph`]) and immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
	tags: SmallVec<[Tag; 4]>,
}

impl TagSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, tag: Tag) {
		if let Err(pos) = self.tags.binary_search(&tag) {
			self.tags.insert(pos, tag);
		}
	}

	pub fn contains(&self, tag: Tag) -> bool {
		self.tags.binary_search(&tag).is_ok()
	}

	pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
		self.tags.iter().copied()
	}

	pub fn len(&self) -> usize {
		self.tags.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tags.is_empty()
	}
}

impl FromIterator<Tag> for TagSet {
	fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
		let mut set = Self::new();
		for tag in iter {
			set.insert(tag);
		}
		set
	}
}

impl fmt::Display for TagSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, tag) in self.tags.iter().enumerate() {
			if i > 0 {
				f.write_str("+")?;
			}
			write!(f, "{tag}")?;
		}
		Ok(())
	}
}

/// Tag inheritance edges: a tag that extends another implies the parent
/// wherever the child is declared.
#[derive(Debug, Default)]
pub struct TagGraph {
	parents: FxHashMap<Tag, SmallVec<[Tag; 2]>>,
}

impl TagGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares `tag` as extending `parent`.
	pub fn extend(&mut self, tag: Tag, parent: Tag) {
		let parents = self.parents.entry(tag).or_default();
		if !parents.contains(&parent) {
			parents.push(parent);
		}
	}

	/// Transitive closure of `declared` over the extends edges.
	pub fn close(&self, declared: impl IntoIterator<Item = Tag>) -> TagSet {
		let mut set = TagSet::new();
		let mut queue: SmallVec<[Tag; 8]> = declared.into_iter().collect();
		while let Some(tag) = queue.pop() {
			if set.contains(tag) {
				continue;
			}
			set.insert(tag);
			if let Some(parents) = self.parents.get(&tag) {
				queue.extend(parents.iter().copied());
			}
		}
		set
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn closure_includes_transitive_parents() {
		let mut graph = TagGraph::new();
		graph.extend(Tag("archived"), Tag("settings"));
		graph.extend(Tag("settings"), Tag("persisted"));

		let set = graph.close([Tag("archived")]);
		assert!(set.contains(Tag("archived")));
		assert!(set.contains(Tag("settings")));
		assert!(set.contains(Tag("persisted")));
		assert_eq!(set.len(), 3);
	}

	#[test]
	fn closure_handles_cycles() {
		let mut graph = TagGraph::new();
		graph.extend(Tag("a"), Tag("b"));
		graph.extend(Tag("b"), Tag("a"));

		let set = graph.close([Tag("a")]);
		assert_eq!(set.len(), 2);
	}

	#[test]
	fn tag_set_is_sorted_and_deduplicated() {
		let set: TagSet = [Tag("z"), Tag("a"), Tag("z")].into_iter().collect();
		assert_eq!(set.len(), 2);
		assert_eq!(set.iter().next(), Some(Tag("a")));
	}
}
