/*!
Signal operations: show/hide, clear, erase, always-hide, and the queries.

Every mutation ends in `refresh`, which is edge-triggered: if the node's
Visible predicate did not flip, nothing else happens. On a flip, observers of
the node are notified and, if the node propagates, the parent's child
contribution moves by one and the parent is refreshed in turn.
*/

use super::store::NotificationNode;
use super::Badges;
use crate::types::{NodeInfo, NodeKey, Propagation};

impl Badges {
  /// Show or hide `path` on behalf of the default caller.
  pub fn set(&mut self, path: &str, visible: bool) {
    self.set_as(path, visible, "");
  }

  /// Show or hide `path` on behalf of `caller`. An empty caller is the default caller.
  ///
  /// Showing auto-creates the node (and its ancestors) and is idempotent per
  /// caller; it also lifts an erase. Hiding only drops this caller's signal and
  /// does nothing if the node does not exist.
  pub fn set_as(&mut self, path: &str, visible: bool, caller: &str) {
    if !self.accepts(path) {
      return;
    }
    let caller = if caller.is_empty() {
      self.default_caller.as_str()
    } else {
      caller
    };

    if visible {
      let Some(key) = self.store.resolve(path) else {
        return;
      };
      if let Some(node) = self.store.get_mut(key) {
        node.increase(caller);
      }
      self.refresh(key);
    } else {
      let key = self.store.key_of(path);
      let Some(node) = self.store.get_mut(key) else {
        return;
      };
      if node.decrease(caller) {
        self.refresh(key);
      }
    }
  }

  /// Drop every caller's signal at `path`, and at all descendants if `clear_children`.
  ///
  /// Use sparingly: this discards other callers' signals too.
  pub fn clear(&mut self, path: &str, clear_children: bool) {
    let Some(node) = self.store.find(path) else {
      return;
    };
    let keys = if clear_children {
      self.store.subtree(node.key())
    } else {
      vec![node.key()]
    };

    // Leaves first, so each parent sees its children settle before itself.
    for key in keys.into_iter().rev() {
      if self
        .store
        .get_mut(key)
        .is_some_and(NotificationNode::clear_callers)
      {
        self.refresh(key);
      }
    }
  }

  /// Hide the badge at `path` without touching its counts.
  ///
  /// The next show at this node lifts the erase. With
  /// `Propagation::PropagateAndForceErase`, every ancestor is erased too.
  pub fn erase(&mut self, path: &str) {
    let Some(node) = self.store.find(path) else {
      return;
    };

    let mut targets = vec![node.key()];
    if node.propagation.forces_erase() {
      let mut cursor = node.parent();
      while let Some(key) = cursor {
        targets.push(key);
        cursor = self.store.get(key).and_then(NotificationNode::parent);
      }
    }

    for key in targets {
      if let Some(node) = self.store.get_mut(key) {
        node.erased = true;
      }
      self.refresh(key);
    }
  }

  /// Whether the badge at `path` is visible. False for unknown paths. Never creates nodes.
  pub fn is_visible(&self, path: &str) -> bool {
    self
      .store
      .find(path)
      .is_some_and(NotificationNode::is_visible)
  }

  /// Force the badge at `path` hidden (or release it), regardless of counts.
  /// Auto-creates the node.
  pub fn set_always_hide(&mut self, path: &str, always_hide: bool) {
    if !self.accepts(path) {
      return;
    }
    let Some(key) = self.store.resolve(path) else {
      return;
    };
    if let Some(node) = self.store.get_mut(key) {
      node.always_hide = always_hide;
    }
    self.refresh(key);
  }

  /// Create `path` (if needed) and fix its propagation policy.
  ///
  /// Re-declaring only updates the policy. If a visible node starts or stops
  /// propagating, its parent's child contribution follows.
  pub fn declare(&mut self, path: &str, propagation: Propagation) -> Option<NodeKey> {
    if !self.accepts(path) {
      return None;
    }
    let key = self.store.resolve(path)?;
    let node = self.store.get_mut(key)?;
    let previous = std::mem::replace(&mut node.propagation, propagation);
    let (was_visible, parent) = (node.last_visible, node.parent());

    if was_visible && previous.propagates() != propagation.propagates() {
      if let Some(parent_key) = parent {
        if let Some(parent_node) = self.store.get_mut(parent_key) {
          parent_node.shift_contribution(propagation.propagates());
        }
        self.refresh(parent_key);
      }
    }
    Some(key)
  }

  /// Effective count at `path` (own callers plus contributing children). 0 if unknown.
  pub fn notification_count(&self, path: &str) -> u32 {
    self
      .store
      .find(path)
      .map_or(0, NotificationNode::effective_count)
  }

  /// Counters and flags of the node at `path`.
  pub fn node(&self, path: &str) -> Option<NodeInfo> {
    self.store.find(path).map(NotificationNode::info)
  }

  /// Every node, sorted by path.
  pub fn snapshot(&self) -> Vec<NodeInfo> {
    let mut nodes: Vec<NodeInfo> = self.store.iter().map(NotificationNode::info).collect();
    nodes.sort_by(|a, b| a.path.cmp(&b.path));
    nodes
  }

  /// Discard the whole tree (e.g. on session switch).
  ///
  /// Nothing is dispatched; bound observers stay bound and pick up the empty
  /// state on the next [`Badges::update_objects`].
  pub fn reset(&mut self) {
    let discarded = self.store.clear();
    log::debug!("Reset badge tree ({discarded} nodes discarded)");
  }

  /// Re-evaluate `key` and ripple a flip up the tree.
  /// Iterative to avoid stack overflow on deep trees.
  pub(super) fn refresh(&mut self, key: NodeKey) {
    let mut next = Some(key);
    while let Some(current) = next.take() {
      let Some(node) = self.store.get_mut(current) else {
        break;
      };
      let visible = node.is_visible();
      if visible == node.last_visible {
        break;
      }
      node.last_visible = visible;
      log::trace!("{:?} visible={visible}", node.path());
      let parent = if node.propagation.propagates() {
        node.parent()
      } else {
        None
      };

      self.observers.dispatch(current, visible);

      if let Some(parent_key) = parent {
        if let Some(parent_node) = self.store.get_mut(parent_key) {
          parent_node.shift_contribution(visible);
        }
        next = Some(parent_key);
      }
    }
  }
}
