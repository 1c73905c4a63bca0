/*!
Path parsing for the badge tree.

Paths are slash-delimited (`Social/Union/Star`). The parent of a path is
everything before its last separator; a path with no separator is a root.
A path whose last separator sits at position 0 (`/Star`) has no valid parent
and cannot be turned into a node.
*/

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::types::{BadgeError, BadgeResult, NodeKey};

/// Segment separator.
pub const SEPARATOR: char = '/';

/// Parent path of `path`.
///
/// `Ok(None)` for a root, `Err(MalformedPath)` for a leading separator.
///
/// ```
/// use badges::path::parent_of;
///
/// assert_eq!(parent_of("Social/Union/Star").unwrap(), Some("Social/Union"));
/// assert_eq!(parent_of("Social").unwrap(), None);
/// assert!(parent_of("/Social").is_err());
/// ```
pub fn parent_of(path: &str) -> BadgeResult<Option<&str>> {
  match path.rsplit_once(SEPARATOR) {
    None => Ok(None),
    Some(("", _)) => Err(BadgeError::MalformedPath(path.to_owned())),
    Some((parent, _)) => Ok(Some(parent)),
  }
}

/// Check that `path` and every ancestor prefix can become a node.
pub fn check(path: &str) -> BadgeResult<()> {
  let mut current = path;
  while let Some(parent) = parent_of(current)? {
    current = parent;
  }
  Ok(())
}

/// Path segments from root to leaf.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
  path.split(SEPARATOR)
}

/// Number of segments (a root has depth 1).
pub fn depth(path: &str) -> usize {
  segments(path).count()
}

/// Ancestors of `path`, nearest first. Stops at the root or at a malformed prefix.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
  std::iter::successors(parent_of(path).ok().flatten(), |p| {
    parent_of(p).ok().flatten()
  })
}

/// Default path hash. Deterministic for the process lifetime.
pub fn hash(path: &str) -> NodeKey {
  let mut hasher = FxHasher::default();
  path.hash(&mut hasher);
  NodeKey(hasher.finish())
}

/// Default path validity check: rejects empty and whitespace-only strings.
pub fn is_valid(path: &str) -> bool {
  !path.trim().is_empty()
}
