/*! Read-only view of a tree node, for inspection and debugging. */

use super::{NodeKey, Propagation};
use serde::Serialize;

/// Snapshot of one node's counters and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
  pub path: String,
  pub key: NodeKey,
  /// Callers currently holding the node on.
  pub direct_callers: u32,
  /// Direct children that are visible and propagate.
  pub child_contribution: u32,
  /// `direct_callers + child_contribution`
  pub effective_count: u32,
  pub erased: bool,
  pub always_hide: bool,
  pub propagation: Propagation,
  pub visible: bool,
  pub parent: Option<NodeKey>,
  pub children: Vec<NodeKey>,
}
