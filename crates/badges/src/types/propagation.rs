/*! Parent-propagation policy of a node. */

use serde::{Deserialize, Serialize};

/// How a node's visibility transitions affect its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
  /// Transitions never touch the parent's child contribution.
  Isolated,

  /// Transitions adjust the parent's child contribution.
  #[default]
  Propagate,

  /// Like `Propagate`, and erasing this node also erases every ancestor.
  PropagateAndForceErase,
}

impl Propagation {
  /// Whether visibility transitions reach the parent.
  pub const fn propagates(self) -> bool {
    !matches!(self, Self::Isolated)
  }

  /// Whether an erase on this node cascades to its ancestors.
  pub const fn forces_erase(self) -> bool {
    matches!(self, Self::PropagateAndForceErase)
  }
}

impl From<bool> for Propagation {
  fn from(propagate: bool) -> Self {
    if propagate {
      Self::Propagate
    } else {
      Self::Isolated
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_propagates() {
    assert_eq!(Propagation::default(), Propagation::Propagate);
    assert!(Propagation::default().propagates());
  }

  #[test]
  fn from_bool() {
    assert_eq!(Propagation::from(true), Propagation::Propagate);
    assert_eq!(Propagation::from(false), Propagation::Isolated);
  }

  #[test]
  fn force_erase_also_propagates() {
    let mode = Propagation::PropagateAndForceErase;
    assert!(mode.propagates());
    assert!(mode.forces_erase());
    assert!(!Propagation::Propagate.forces_erase());
  }

  #[test]
  fn serde_names() {
    let json = serde_json::to_string(&Propagation::PropagateAndForceErase).unwrap();
    assert_eq!(json, "\"propagate_and_force_erase\"");
    let mode: Propagation = serde_json::from_str("\"isolated\"").unwrap();
    assert_eq!(mode, Propagation::Isolated);
  }
}
