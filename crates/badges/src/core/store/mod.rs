/*!
Node storage for the badge tree.

Nodes are keyed by the hash of their path and are never removed one at a
time; only `clear` (engine reset) discards them. Parent links are keys into
this map, so the store is the sole owner of every node.

## Invariants

1. **Ancestors first**: a node is inserted only after its whole parent chain
   exists, so every `parent` key resolves.
2. **Bidirectional links**: `node.parent == Some(p)` iff `p.children` contains
   `node.key`.
3. **All or nothing**: a path with a malformed or invalid prefix inserts
   nothing. Every created ancestor passes the same validator as the leaf.
*/

mod node;

pub(crate) use node::NotificationNode;

use std::collections::HashMap;

use crate::path;
use crate::types::NodeKey;

/// Path hashing collaborator. Must be collision-free over the registered paths.
pub type PathHasher = fn(&str) -> NodeKey;

/// Path validity collaborator. Invalid paths make every operation a no-op.
pub type PathValidator = fn(&str) -> bool;

pub(crate) struct NodeStore {
  hasher: PathHasher,
  validator: PathValidator,
  nodes: HashMap<NodeKey, NotificationNode>,
}

impl NodeStore {
  pub(crate) fn new(hasher: PathHasher, validator: PathValidator) -> Self {
    Self {
      hasher,
      validator,
      nodes: HashMap::new(),
    }
  }

  pub(crate) fn is_valid(&self, path: &str) -> bool {
    (self.validator)(path)
  }

  pub(crate) fn key_of(&self, path: &str) -> NodeKey {
    (self.hasher)(path)
  }

  pub(crate) fn get(&self, key: NodeKey) -> Option<&NotificationNode> {
    self.nodes.get(&key)
  }

  pub(crate) fn get_mut(&mut self, key: NodeKey) -> Option<&mut NotificationNode> {
    self.nodes.get_mut(&key)
  }

  /// Look up a node without creating it.
  pub(crate) fn find(&self, path: &str) -> Option<&NotificationNode> {
    self.get(self.key_of(path))
  }

  /// Look up a node, creating it and any missing ancestors (root to leaf).
  ///
  /// Returns `None` if some prefix of the path is malformed or fails the
  /// validator; nothing is inserted in that case.
  pub(crate) fn resolve(&mut self, path: &str) -> Option<NodeKey> {
    let key = self.key_of(path);
    if let Some(existing) = self.nodes.get(&key) {
      if existing.path() != path {
        log::error!(
          "Hash collision: {path:?} and {:?} share key {key}. Paths must hash uniquely.",
          existing.path()
        );
      }
      return Some(key);
    }

    if !self.is_valid(path) {
      log::debug!("Rejected node creation for invalid path {path:?}");
      return None;
    }

    // Collect the missing chain leaf-first, stopping at the first existing ancestor.
    let mut missing = vec![path];
    let mut attach_to = None;
    let mut current = path;
    loop {
      match path::parent_of(current) {
        Err(e) => {
          log::debug!("Rejected node creation for {path:?}: {e}");
          return None;
        }
        Ok(None) => break,
        Ok(Some(parent)) => {
          let parent_key = self.key_of(parent);
          if self.nodes.contains_key(&parent_key) {
            attach_to = Some(parent_key);
            break;
          }
          if !self.is_valid(parent) {
            log::debug!("Rejected node creation for {path:?}: invalid prefix {parent:?}");
            return None;
          }
          missing.push(parent);
          current = parent;
        }
      }
    }

    let mut parent = attach_to;
    for p in missing.into_iter().rev() {
      let key = self.key_of(p);
      self
        .nodes
        .insert(key, NotificationNode::new(p.to_owned(), key, parent));
      if let Some(parent_node) = parent.and_then(|pk| self.nodes.get_mut(&pk)) {
        parent_node.children.push(key);
      }
      log::trace!("Created node {p:?} ({key})");
      parent = Some(key);
    }
    parent
  }

  /// `root` and all of its descendants, parents before children.
  /// Iterative to avoid stack overflow on deep trees.
  pub(crate) fn subtree(&self, root: NodeKey) -> Vec<NodeKey> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(key) = stack.pop() {
      let Some(node) = self.nodes.get(&key) else {
        continue;
      };
      stack.extend(node.children().iter().rev());
      out.push(key);
    }
    out
  }

  pub(crate) fn iter(&self) -> impl Iterator<Item = &NotificationNode> {
    self.nodes.values()
  }

  pub(crate) fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Zero every root's subtree silently, then discard all nodes.
  /// Returns how many nodes were discarded.
  pub(crate) fn clear(&mut self) -> usize {
    let roots: Vec<NodeKey> = self
      .nodes
      .values()
      .filter(|n| n.is_root())
      .map(NotificationNode::key)
      .collect();
    for root in roots {
      for key in self.subtree(root) {
        if let Some(node) = self.nodes.get_mut(&key) {
          node.reset();
        }
      }
    }
    let discarded = self.nodes.len();
    self.nodes.clear();
    discarded
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> NodeStore {
    NodeStore::new(path::hash, path::is_valid)
  }

  #[test]
  fn resolve_builds_ancestor_chain() {
    let mut s = store();
    let leaf = s.resolve("a/b/c").unwrap();
    assert_eq!(s.len(), 3);

    let b = s.find("a/b").unwrap();
    let a = s.find("a").unwrap();
    assert_eq!(s.get(leaf).unwrap().parent(), Some(b.key()));
    assert_eq!(b.parent(), Some(a.key()));
    assert!(a.is_root());
    assert_eq!(a.children(), &[b.key()]);
    assert_eq!(b.children(), &[leaf]);
  }

  #[test]
  fn resolve_is_idempotent() {
    let mut s = store();
    let first = s.resolve("a/b").unwrap();
    let second = s.resolve("a/b").unwrap();
    assert_eq!(first, second);
    assert_eq!(s.len(), 2);
    assert_eq!(s.find("a").unwrap().children().len(), 1);
  }

  #[test]
  fn resolve_attaches_to_existing_ancestor() {
    let mut s = store();
    s.resolve("a/b").unwrap();
    s.resolve("a/c/d").unwrap();
    assert_eq!(s.len(), 4);
    let a = s.find("a").unwrap();
    assert_eq!(a.children().len(), 2);
  }

  #[test]
  fn malformed_path_inserts_nothing() {
    let mut s = store();
    assert!(s.resolve("/a").is_none());
    assert!(s.resolve("/a/b/c").is_none());
    assert_eq!(s.len(), 0);
  }

  #[test]
  fn invalid_prefix_inserts_nothing() {
    let mut s = store();
    assert!(s.resolve(" /x").is_none());
    assert!(s.resolve("\t/a/b").is_none());
    assert!(s.resolve("").is_none());
    assert_eq!(s.len(), 0);
  }

  #[test]
  fn colliding_hash_reuses_existing_node() {
    fn constant(_: &str) -> NodeKey {
      NodeKey(0)
    }
    let mut s = NodeStore::new(constant, path::is_valid);
    let first = s.resolve("a").unwrap();
    let second = s.resolve("b").unwrap();
    assert_eq!(first, second);
    assert_eq!(s.len(), 1);
    // The first path keeps the slot; the colliding one is not inserted.
    assert_eq!(s.get(first).unwrap().path(), "a");
  }

  #[test]
  fn find_never_creates() {
    let s = store();
    assert!(s.find("a").is_none());
    assert_eq!(s.len(), 0);
  }

  #[test]
  fn subtree_lists_parents_first() {
    let mut s = store();
    s.resolve("a/b/c").unwrap();
    s.resolve("a/d").unwrap();
    let a = s.key_of("a");
    let keys = s.subtree(a);
    assert_eq!(keys.len(), 4);
    assert_eq!(keys.first(), Some(&a));
    let pos = |p: &str| keys.iter().position(|k| *k == s.key_of(p)).unwrap();
    assert!(pos("a/b") < pos("a/b/c"));
  }

  #[test]
  fn clear_discards_everything() {
    let mut s = store();
    let key = s.resolve("a/b").unwrap();
    s.get_mut(key).unwrap().increase("A");
    assert_eq!(s.clear(), 2);
    assert_eq!(s.len(), 0);
    assert!(s.find("a/b").is_none());
  }
}
