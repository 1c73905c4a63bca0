/*!
Observer binding methods for `Badges`.

An object identity is bound to at most one path. Binding never creates a
node: an observer on a path nobody has shown yet simply sees `false`.
*/

use std::sync::Arc;

use super::observers::Binding;
use super::store::NotificationNode;
use super::Badges;
use crate::observer::BadgeObserver;
use crate::types::ObjectId;

impl Badges {
  /// Bind `observer` to `path` and deliver the node's current visibility.
  ///
  /// If the observer's identity is already bound elsewhere it is moved, not
  /// duplicated, so there is no need to remove it first.
  pub fn register_object<O: BadgeObserver + 'static>(&mut self, path: &str, observer: &Arc<O>) {
    if !self.accepts(path) {
      return;
    }
    let key = self.store.key_of(path);
    let (link, binding) = self.observers.bind(observer, path, key);
    match binding {
      Binding::Created => log::debug!("Bound {} to {path:?}", observer.object_id()),
      Binding::Moved { from } => {
        log::debug!("Moved {} from {from} to {path:?}", observer.object_id());
      }
      Binding::Unchanged => {}
    }

    let visible = self
      .store
      .get(key)
      .is_some_and(NotificationNode::is_visible);
    self.observers.deliver_to(link, visible);
  }

  /// Unbind `object` if it is bound to exactly `path`. Returns whether it was.
  pub fn remove_object(&mut self, path: &str, object: ObjectId) -> bool {
    if !self.accepts(path) {
      return false;
    }
    let key = self.store.key_of(path);
    self.observers.unbind(object, key)
  }

  /// Unbind every observer bound to `path`. Returns how many were removed.
  pub fn remove_objects(&mut self, path: &str) -> usize {
    if !self.accepts(path) {
      return 0;
    }
    let key = self.store.key_of(path);
    let removed = self.observers.unbind_all(key);
    if removed > 0 {
      log::debug!("Unbound {removed} observers from {path:?}");
    }
    removed
  }

  /// Unbind every observer. Returns how many were removed.
  pub fn clear_objects(&mut self) -> usize {
    self.observers.clear()
  }

  /// Re-deliver the current visibility to every bound observer.
  ///
  /// Meant to run once per UI tick as a safety net for missed transitions.
  /// Dropped observers are pruned. Returns how many deliveries were made.
  pub fn update_objects(&mut self) -> usize {
    let store = &self.store;
    self
      .observers
      .reconcile(|key| store.get(key).is_some_and(NotificationNode::is_visible))
  }

  /// Path `object` is currently bound to.
  pub fn bound_path(&self, object: ObjectId) -> Option<&str> {
    self.observers.bound_path(object)
  }

  /// Number of bound observers.
  pub fn observer_count(&self) -> usize {
    self.observers.len()
  }
}
