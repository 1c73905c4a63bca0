/*!
Badges - hierarchical attention indicators.

Locations form a tree addressed by slash-delimited paths. A badge at a path is
visible when some caller holds it on (or a propagating child is visible) and
it is neither erased nor forced hidden. Visual objects bind to a path and are
told whenever that answer changes.

```
use badges::{BadgeObserver, Badges, NodeKey, ObjectId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct RedDot {
  id: ObjectId,
  shown: AtomicBool,
}

impl BadgeObserver for RedDot {
  fn object_id(&self) -> ObjectId {
    self.id
  }
  fn on_visibility_changed(&self, _path: &str, _key: NodeKey, visible: bool) {
    self.shown.store(visible, Ordering::Relaxed);
  }
}

let dot = || Arc::new(RedDot { id: ObjectId::new(), shown: AtomicBool::new(false) });
let (social, union, star) = (dot(), dot(), dot());

let mut badges = Badges::new();
badges.register_object("Social", &social);
badges.register_object("Social/Union", &union);
badges.register_object("Social/Union/Star", &star);

// Showing the leaf lights the whole chain.
badges.set("Social/Union/Star", true);
assert!(social.shown.load(Ordering::Relaxed));
assert!(union.shown.load(Ordering::Relaxed));
assert!(star.shown.load(Ordering::Relaxed));

// Several callers: the parent keeps its own signal.
badges.set_as("Social/Union", true, "guild");
badges.set("Social/Union/Star", false);
assert!(!star.shown.load(Ordering::Relaxed));
assert!(union.shown.load(Ordering::Relaxed));
assert!(social.shown.load(Ordering::Relaxed));

// Once per UI tick, as a safety net.
badges.update_objects();
```
*/

mod config;
mod core;
mod observer;
pub mod path;

mod types;
pub use types::*;

pub use crate::config::{BadgesConfig, NodeDeclaration, DEFAULT_CALLER};
pub use crate::core::{Badges, BadgesBuilder, PathHasher, PathValidator, SharedBadges};
pub use crate::observer::BadgeObserver;
