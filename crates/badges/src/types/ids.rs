/*! Branded ID types for nodes and bound visual objects. */

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lookup key of a tree node: the hash of its path.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct NodeKey(pub u64);

/// Stable identity of a visual object bound to the tree.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
pub struct ObjectId(pub u64);

/// Global counter for `ObjectId` generation. Starts at 1 (0 could be confused with "null").
static OBJECT_COUNTER: AtomicU64 = AtomicU64::new(1);

impl ObjectId {
  /// Generate a new process-unique `ObjectId`.
  pub fn new() -> Self {
    Self(OBJECT_COUNTER.fetch_add(1, Ordering::Relaxed))
  }
}

impl Default for ObjectId {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn object_ids_are_unique() {
    let a = ObjectId::new();
    let b = ObjectId::new();
    assert_ne!(a, b);
    assert!(b.0 > a.0);
  }

  #[test]
  fn node_key_round_trips_through_u64() {
    let key = NodeKey::from(42_u64);
    assert_eq!(u64::from(key), 42);
    assert_eq!(key.to_string(), "42");
  }
}
