/*!
Visual objects bound to tree nodes.

The engine never owns an observer: it keeps a `Weak` handle and treats a
dropped observer as stale, pruning its link the next time the link is walked.
*/

use crate::types::{NodeKey, ObjectId};

/// A visual object that shows or hides a badge.
///
/// Callbacks run synchronously inside engine operations. They must not call
/// back into the engine that delivered them.
pub trait BadgeObserver: Send + Sync {
  /// Stable identity. An identity is bound to at most one path at a time.
  fn object_id(&self) -> ObjectId;

  /// Deliver the current visibility of the bound node.
  ///
  /// Called on registration, on every visibility transition of the node, and
  /// on every `update_objects` pass.
  fn on_visibility_changed(&self, path: &str, key: NodeKey, visible: bool);
}
