/*!
Observer links: an intrusive singly linked list stored in a slot map.

Each `ObserverLink` binds one object identity to one node key. A link's
`next` field threads it into exactly one chain at a time:

- a **dispatch chain**, headed in `heads[node_key]`, walked on every
  visibility transition of that node;
- a transient **batch chain**, used by `unbind_all` to collect links before
  releasing them together.

A link must be `unlink`ed before it is threaded anywhere else.
*/

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use slotmap::{new_key_type, SlotMap};

use crate::observer::BadgeObserver;
use crate::types::{NodeKey, ObjectId};

new_key_type! {
  pub(crate) struct LinkId;
}

/// Which chain a link is currently threaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chain {
  Detached,
  Dispatch(NodeKey),
  Batch,
}

pub(crate) struct ObserverLink {
  object: ObjectId,
  observer: Weak<dyn BadgeObserver>,
  path: String,
  key: NodeKey,
  next: Option<LinkId>,
  chain: Chain,
}

impl ObserverLink {
  fn deliver(&self, visible: bool) -> bool {
    let Some(observer) = self.observer.upgrade() else {
      return false;
    };
    observer.on_visibility_changed(&self.path, self.key, visible);
    true
  }
}

/// Outcome of `ObserverLinks::bind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
  Created,
  Moved { from: NodeKey },
  Unchanged,
}

pub(crate) struct ObserverLinks {
  links: SlotMap<LinkId, ObserverLink>,
  /// Node key -> first link of its dispatch chain.
  heads: HashMap<NodeKey, LinkId>,
  by_object: HashMap<ObjectId, LinkId>,
}

impl ObserverLinks {
  pub(crate) fn new() -> Self {
    Self {
      links: SlotMap::with_key(),
      heads: HashMap::new(),
      by_object: HashMap::new(),
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.links.len()
  }

  pub(crate) fn bound_path(&self, object: ObjectId) -> Option<&str> {
    let id = self.by_object.get(&object)?;
    self.links.get(*id).map(|l| l.path.as_str())
  }

  /// Bind `observer` to `key`, rebinding its existing link if it has one.
  ///
  /// Returns the link so the caller can deliver the initial state.
  pub(crate) fn bind<O: BadgeObserver + 'static>(
    &mut self,
    observer: &Arc<O>,
    path: &str,
    key: NodeKey,
  ) -> (LinkId, Binding) {
    let object = observer.object_id();
    let weak: Weak<O> = Arc::downgrade(observer);
    let weak: Weak<dyn BadgeObserver> = weak;

    if let Some(&id) = self.by_object.get(&object) {
      let from = self.links.get(id).map(|l| l.key);
      if from == Some(key) {
        if let Some(link) = self.links.get_mut(id) {
          link.observer = weak;
        }
        return (id, Binding::Unchanged);
      }
      self.unlink(id);
      if let Some(link) = self.links.get_mut(id) {
        link.observer = weak;
        path.clone_into(&mut link.path);
        link.key = key;
      }
      self.thread(id, key);
      let binding = from.map_or(Binding::Created, |from| Binding::Moved { from });
      return (id, binding);
    }

    let id = self.links.insert(ObserverLink {
      object,
      observer: weak,
      path: path.to_owned(),
      key,
      next: None,
      chain: Chain::Detached,
    });
    self.by_object.insert(object, id);
    self.thread(id, key);
    (id, Binding::Created)
  }

  /// Remove `object`'s link if it is bound to `key`.
  pub(crate) fn unbind(&mut self, object: ObjectId, key: NodeKey) -> bool {
    let Some(&id) = self.by_object.get(&object) else {
      return false;
    };
    if self.links.get(id).map(|l| l.key) != Some(key) {
      return false;
    }
    self.release(id);
    true
  }

  /// Remove every link bound to `key`. Returns how many were removed.
  ///
  /// Links are first moved from the dispatch chain onto a batch chain, then
  /// the batch is released in one pass.
  pub(crate) fn unbind_all(&mut self, key: NodeKey) -> usize {
    let matching: Vec<LinkId> = self
      .by_object
      .values()
      .copied()
      .filter(|id| self.links.get(*id).is_some_and(|l| l.key == key))
      .collect();

    let mut batch: Option<LinkId> = None;
    for id in matching {
      self.unlink(id);
      if let Some(link) = self.links.get_mut(id) {
        link.next = batch;
        link.chain = Chain::Batch;
        batch = Some(id);
      }
    }

    let mut removed = 0;
    while let Some(id) = batch {
      let Some(link) = self.links.remove(id) else {
        break;
      };
      debug_assert_eq!(link.chain, Chain::Batch);
      self.by_object.remove(&link.object);
      batch = link.next;
      removed += 1;
    }
    removed
  }

  /// Remove every link. Returns how many were removed.
  pub(crate) fn clear(&mut self) -> usize {
    let removed = self.links.len();
    self.links.clear();
    self.heads.clear();
    self.by_object.clear();
    removed
  }

  /// Deliver to a single link (registration). Prunes it if stale.
  pub(crate) fn deliver_to(&mut self, id: LinkId, visible: bool) {
    let delivered = self.links.get(id).is_some_and(|l| l.deliver(visible));
    if !delivered {
      self.prune(id);
    }
  }

  /// Multicast `visible` to every link chained under `key`, pruning stale ones.
  pub(crate) fn dispatch(&mut self, key: NodeKey, visible: bool) {
    let mut prev: Option<LinkId> = None;
    let mut cursor = self.heads.get(&key).copied();
    while let Some(id) = cursor {
      let Some(link) = self.links.get(id) else {
        break;
      };
      let next = link.next;
      if link.deliver(visible) {
        prev = Some(id);
      } else {
        // Splice out in place; `prev` stays where it is.
        match prev.and_then(|p| self.links.get_mut(p)) {
          Some(prev_link) => prev_link.next = next,
          None => self.set_head(key, next),
        }
        self.drop_link(id);
      }
      cursor = next;
    }
  }

  /// Re-deliver to every link using `visible_of(key)`, pruning stale ones.
  pub(crate) fn reconcile(&mut self, visible_of: impl Fn(NodeKey) -> bool) -> usize {
    let mut stale = Vec::new();
    let mut delivered = 0;
    for (id, link) in &self.links {
      if link.deliver(visible_of(link.key)) {
        delivered += 1;
      } else {
        stale.push(id);
      }
    }
    for id in stale {
      self.prune(id);
    }
    delivered
  }

  /// Dispatch chain of `key`, in traversal order.
  #[cfg(test)]
  pub(crate) fn chain(&self, key: NodeKey) -> Vec<ObjectId> {
    let mut out = Vec::new();
    let mut cursor = self.heads.get(&key).copied();
    while let Some(link) = cursor.and_then(|id| self.links.get(id)) {
      out.push(link.object);
      cursor = link.next;
    }
    out
  }

  fn prune(&mut self, id: LinkId) {
    if let Some(link) = self.links.get(id) {
      log::warn!(
        "Pruning stale observer {} bound to {:?}",
        link.object,
        link.path
      );
    }
    self.release(id);
  }

  fn release(&mut self, id: LinkId) {
    self.unlink(id);
    self.drop_link(id);
  }

  fn drop_link(&mut self, id: LinkId) {
    if let Some(link) = self.links.remove(id) {
      self.by_object.remove(&link.object);
    }
  }

  /// Thread a detached link into `key`'s dispatch chain, right after the head.
  fn thread(&mut self, id: LinkId, key: NodeKey) {
    let chain = self.links.get(id).map(|l| l.chain);
    debug_assert_eq!(chain, Some(Chain::Detached), "link threaded twice");
    if chain != Some(Chain::Detached) {
      log::error!("Observer link threaded while still chained ({chain:?}). Unlinking first.");
      self.unlink(id);
    }

    let after_head = if let Some(head) = self.heads.get(&key).copied() {
      let next = self.links.get(head).and_then(|h| h.next);
      if let Some(head_link) = self.links.get_mut(head) {
        head_link.next = Some(id);
      }
      next
    } else {
      self.heads.insert(key, id);
      None
    };
    if let Some(link) = self.links.get_mut(id) {
      link.next = after_head;
      link.chain = Chain::Dispatch(key);
    }
  }

  /// Detach a link from whatever dispatch chain it is in.
  fn unlink(&mut self, id: LinkId) {
    let Some(link) = self.links.get(id) else {
      return;
    };
    let (chain, next) = (link.chain, link.next);
    if let Chain::Dispatch(key) = chain {
      if self.heads.get(&key) == Some(&id) {
        self.set_head(key, next);
      } else {
        let mut cursor = self.heads.get(&key).copied();
        while let Some(c) = cursor {
          let Some(c_link) = self.links.get_mut(c) else {
            break;
          };
          if c_link.next == Some(id) {
            c_link.next = next;
            break;
          }
          cursor = c_link.next;
        }
      }
    }
    if let Some(link) = self.links.get_mut(id) {
      link.next = None;
      link.chain = Chain::Detached;
    }
  }

  fn set_head(&mut self, key: NodeKey, head: Option<LinkId>) {
    match head {
      Some(id) => {
        self.heads.insert(key, id);
      }
      None => {
        self.heads.remove(&key);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use parking_lot::Mutex;

  struct Recorder {
    id: ObjectId,
    seen: Mutex<Vec<bool>>,
  }

  impl Recorder {
    fn new() -> Arc<Self> {
      Arc::new(Self {
        id: ObjectId::new(),
        seen: Mutex::new(Vec::new()),
      })
    }

    fn seen(&self) -> Vec<bool> {
      self.seen.lock().clone()
    }
  }

  impl BadgeObserver for Recorder {
    fn object_id(&self) -> ObjectId {
      self.id
    }

    fn on_visibility_changed(&self, _path: &str, _key: NodeKey, visible: bool) {
      self.seen.lock().push(visible);
    }
  }

  const K1: NodeKey = NodeKey(1);
  const K2: NodeKey = NodeKey(2);

  #[test]
  fn bind_threads_after_head() {
    let mut links = ObserverLinks::new();
    let (a, b, c) = (Recorder::new(), Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "p", K1);
    links.bind(&c, "p", K1);
    // Head stays first; later links go right after it.
    assert_eq!(links.chain(K1), vec![a.id, c.id, b.id]);
  }

  #[test]
  fn rebind_moves_without_duplicating() {
    let mut links = ObserverLinks::new();
    let a = Recorder::new();
    let (first, binding) = links.bind(&a, "p1", K1);
    assert_eq!(binding, Binding::Created);
    let (second, binding) = links.bind(&a, "p2", K2);
    assert_eq!(binding, Binding::Moved { from: K1 });
    assert_eq!(first, second);
    assert_eq!(links.len(), 1);
    assert!(links.chain(K1).is_empty());
    assert_eq!(links.chain(K2), vec![a.id]);
    assert_eq!(links.bound_path(a.id), Some("p2"));
  }

  #[test]
  fn rebind_same_key_is_unchanged() {
    let mut links = ObserverLinks::new();
    let a = Recorder::new();
    links.bind(&a, "p", K1);
    let (_, binding) = links.bind(&a, "p", K1);
    assert_eq!(binding, Binding::Unchanged);
    assert_eq!(links.chain(K1), vec![a.id]);
  }

  #[test]
  fn unbind_requires_matching_key() {
    let mut links = ObserverLinks::new();
    let (a, b) = (Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "p", K1);
    assert!(!links.unbind(a.id, K2));
    assert!(links.unbind(a.id, K1));
    assert!(!links.unbind(a.id, K1));
    assert_eq!(links.chain(K1), vec![b.id]);
  }

  #[test]
  fn unbind_middle_keeps_chain_intact() {
    let mut links = ObserverLinks::new();
    let (a, b, c) = (Recorder::new(), Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "p", K1);
    links.bind(&c, "p", K1);
    assert!(links.unbind(c.id, K1));
    assert_eq!(links.chain(K1), vec![a.id, b.id]);
  }

  #[test]
  fn unbind_all_uses_batch_and_leaves_other_keys() {
    let mut links = ObserverLinks::new();
    let (a, b, c) = (Recorder::new(), Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "p", K1);
    links.bind(&c, "q", K2);
    assert_eq!(links.unbind_all(K1), 2);
    assert!(links.chain(K1).is_empty());
    assert_eq!(links.chain(K2), vec![c.id]);
    assert_eq!(links.len(), 1);
    assert_eq!(links.bound_path(a.id), None);
    // Removed identities can bind again.
    links.bind(&a, "q", K2);
    assert_eq!(links.len(), 2);
  }

  #[test]
  fn dispatch_delivers_to_chain_only() {
    let mut links = ObserverLinks::new();
    let (a, b) = (Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "q", K2);
    links.dispatch(K1, true);
    assert_eq!(a.seen(), vec![true]);
    assert!(b.seen().is_empty());
  }

  #[test]
  fn dispatch_prunes_dropped_observers() {
    let mut links = ObserverLinks::new();
    let (a, b, c) = (Recorder::new(), Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "p", K1);
    links.bind(&c, "p", K1);
    let (a_id, c_id) = (a.id, c.id);
    drop(a);
    drop(c);
    links.dispatch(K1, true);
    assert_eq!(b.seen(), vec![true]);
    assert_eq!(links.chain(K1), vec![b.id]);
    assert_eq!(links.bound_path(a_id), None);
    assert_eq!(links.bound_path(c_id), None);
    assert_eq!(links.len(), 1);
  }

  #[test]
  fn reconcile_delivers_everyone_and_prunes() {
    let mut links = ObserverLinks::new();
    let (a, b) = (Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "q", K2);
    drop(b);
    let delivered = links.reconcile(|key| key == K1);
    assert_eq!(delivered, 1);
    assert_eq!(a.seen(), vec![true]);
    assert_eq!(links.len(), 1);
    assert!(links.chain(K2).is_empty());
  }

  #[test]
  fn clear_removes_all() {
    let mut links = ObserverLinks::new();
    let (a, b) = (Recorder::new(), Recorder::new());
    links.bind(&a, "p", K1);
    links.bind(&b, "q", K2);
    assert_eq!(links.clear(), 2);
    assert_eq!(links.len(), 0);
    assert!(links.chain(K1).is_empty());
  }
}
