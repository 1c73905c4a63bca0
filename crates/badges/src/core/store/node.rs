/*!
One node of the badge tree.

A node's own signal is the number of callers holding it on; its children add
to that through `child_contribution`. Counter mutators report whether the
Visible predicate may have changed; the engine then runs the edge-triggered
refresh (dispatch + parent ripple), so `last_visible` is only written there.
*/

use std::collections::HashMap;

use crate::types::{NodeInfo, NodeKey, Propagation};

pub(crate) struct NotificationNode {
  path: String,
  key: NodeKey,
  /// Caller name -> active count. Entries are removed when they reach 0.
  callers: HashMap<String, u32>,
  child_contribution: u32,
  pub(crate) always_hide: bool,
  pub(crate) erased: bool,
  pub(crate) propagation: Propagation,
  pub(super) parent: Option<NodeKey>,
  pub(super) children: Vec<NodeKey>,
  /// Visible state as last dispatched and propagated.
  pub(crate) last_visible: bool,
}

impl NotificationNode {
  pub(super) fn new(path: String, key: NodeKey, parent: Option<NodeKey>) -> Self {
    Self {
      path,
      key,
      callers: HashMap::new(),
      child_contribution: 0,
      always_hide: false,
      erased: false,
      propagation: Propagation::default(),
      parent,
      children: Vec::new(),
      last_visible: false,
    }
  }

  pub(crate) fn path(&self) -> &str {
    &self.path
  }

  pub(crate) const fn key(&self) -> NodeKey {
    self.key
  }

  pub(crate) const fn parent(&self) -> Option<NodeKey> {
    self.parent
  }

  pub(crate) fn children(&self) -> &[NodeKey] {
    &self.children
  }

  pub(crate) const fn is_root(&self) -> bool {
    self.parent.is_none()
  }

  /// Callers with an active count.
  pub(crate) fn direct_callers(&self) -> u32 {
    u32::try_from(self.callers.len()).unwrap_or(u32::MAX)
  }

  pub(crate) const fn child_contribution(&self) -> u32 {
    self.child_contribution
  }

  pub(crate) fn effective_count(&self) -> u32 {
    self.direct_callers().saturating_add(self.child_contribution())
  }

  /// The externally observed predicate.
  pub(crate) fn is_visible(&self) -> bool {
    self.effective_count() > 0 && !self.always_hide && !self.erased
  }

  /// Turn `caller` on. Idempotent per caller; always lifts an erase.
  pub(crate) fn increase(&mut self, caller: &str) {
    self.callers.entry(caller.to_owned()).or_insert(1);
    self.erased = false;
  }

  /// Turn `caller` off. Returns false if the caller was not active.
  pub(crate) fn decrease(&mut self, caller: &str) -> bool {
    self.callers.remove(caller).is_some()
  }

  /// Drop every caller's signal. Returns false if there were none.
  pub(crate) fn clear_callers(&mut self) -> bool {
    let had_callers = !self.callers.is_empty();
    self.callers.clear();
    had_callers
  }

  /// A direct child became visible (`true`) or stopped being visible.
  ///
  /// A rising child lifts an erase, the same as a direct show.
  pub(crate) fn shift_contribution(&mut self, rising: bool) {
    if rising {
      self.child_contribution += 1;
      self.erased = false;
      return;
    }
    debug_assert!(
      self.child_contribution > 0,
      "child contribution underflow at {}",
      self.path
    );
    if let Some(n) = self.child_contribution.checked_sub(1) {
      self.child_contribution = n;
    } else {
      log::error!(
        "Child contribution underflow at {:?}. This is a bug - a falling edge had no matching rise.",
        self.path
      );
    }
  }

  /// Zero all counters without any propagation. Used when the store is discarded.
  pub(super) fn reset(&mut self) {
    self.callers.clear();
    self.child_contribution = 0;
    self.erased = false;
    self.last_visible = false;
  }

  pub(crate) fn info(&self) -> NodeInfo {
    NodeInfo {
      path: self.path.clone(),
      key: self.key,
      direct_callers: self.direct_callers(),
      child_contribution: self.child_contribution,
      effective_count: self.effective_count(),
      erased: self.erased,
      always_hide: self.always_hide,
      propagation: self.propagation,
      visible: self.is_visible(),
      parent: self.parent,
      children: self.children.clone(),
    }
  }
}
