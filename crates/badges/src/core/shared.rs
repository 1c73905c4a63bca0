/*!
Thread-safe handle for hosts that reach the engine from several threads.

All operations are serialized behind one mutex. Observers run while the lock
is held, so an observer callback must never call back into the same handle.
*/

use parking_lot::Mutex;
use std::sync::Arc;

use super::Badges;

/// Shared, serialized access to a `Badges` engine.
///
/// Clone is cheap (Arc bump) - share freely across threads.
#[derive(Clone)]
pub struct SharedBadges {
  state: Arc<Mutex<Badges>>,
}

impl std::fmt::Debug for SharedBadges {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SharedBadges").finish_non_exhaustive()
  }
}

impl From<Badges> for SharedBadges {
  fn from(badges: Badges) -> Self {
    Self::new(badges)
  }
}

impl SharedBadges {
  /// Wrap an engine.
  pub fn new(badges: Badges) -> Self {
    Self {
      state: Arc::new(Mutex::new(badges)),
    }
  }

  /// Read state. Never block on other work inside the closure.
  #[inline]
  pub fn read<R>(&self, f: impl FnOnce(&Badges) -> R) -> R {
    f(&self.state.lock())
  }

  /// Write state. Never block on other work inside the closure.
  #[inline]
  pub fn write<R>(&self, f: impl FnOnce(&mut Badges) -> R) -> R {
    f(&mut self.state.lock())
  }

  /// See [`Badges::set_as`].
  pub fn set_as(&self, path: &str, visible: bool, caller: &str) {
    self.write(|b| b.set_as(path, visible, caller));
  }

  /// See [`Badges::is_visible`].
  pub fn is_visible(&self, path: &str) -> bool {
    self.read(|b| b.is_visible(path))
  }

  /// See [`Badges::update_objects`].
  pub fn update_objects(&self) -> usize {
    self.write(Badges::update_objects)
  }
}
