/*!
Core badge engine - owns the node tree and the observer links.

# Module Structure

- `mod.rs` - `Badges` struct, construction, builder
- `store/` - `NodeStore` (path-keyed nodes, ancestor-chain creation)
- `observers.rs` - `ObserverLinks` (intrusive dispatch chains)
- `signals.rs` - show/hide/clear/erase, queries, change propagation
- `bindings.rs` - register/remove/update bound observers
- `shared.rs` - `SharedBadges` for hosts that call from several threads
*/

mod bindings;
mod observers;
mod shared;
mod signals;
mod store;

pub use shared::SharedBadges;
pub use store::{PathHasher, PathValidator};

use crate::config::{BadgesConfig, NodeDeclaration, DEFAULT_CALLER};
use crate::path;
use crate::types::{BadgeError, BadgeResult, NodeKey, Propagation};
use observers::ObserverLinks;
use store::NodeStore;

/// Badge engine: a tree of notification nodes plus the observers bound to them.
///
/// Single-threaded; every operation runs to completion before returning.
/// Wrap in [`SharedBadges`] to call from several threads.
pub struct Badges {
  pub(crate) store: NodeStore,
  pub(crate) observers: ObserverLinks,
  validator: PathValidator,
  default_caller: String,
}

impl std::fmt::Debug for Badges {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Badges")
      .field("nodes", &self.store.len())
      .field("observers", &self.observers.len())
      .field("default_caller", &self.default_caller)
      .finish_non_exhaustive()
  }
}

impl Default for Badges {
  fn default() -> Self {
    Self::new()
  }
}

/// Builder for configuring a `Badges` engine.
///
/// # Example
///
/// ```
/// use badges::{Badges, Propagation};
///
/// let badges = Badges::builder()
///     .default_caller("system")
///     .declare("Social", Propagation::Isolated)
///     .build()
///     .unwrap();
/// assert!(badges.node("Social").is_some());
/// ```
#[derive(Debug, Clone)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct BadgesBuilder {
  hasher: PathHasher,
  validator: PathValidator,
  default_caller: String,
  declarations: Vec<NodeDeclaration>,
}

impl Default for BadgesBuilder {
  fn default() -> Self {
    Self {
      hasher: path::hash,
      validator: path::is_valid,
      default_caller: DEFAULT_CALLER.to_owned(),
      declarations: Vec::new(),
    }
  }
}

impl BadgesBuilder {
  /// Path hash function. Must be collision-free over every path you use.
  pub fn hasher(mut self, hasher: PathHasher) -> Self {
    self.hasher = hasher;
    self
  }

  /// Path validity check. Default: rejects empty and whitespace-only paths.
  pub fn validator(mut self, validator: PathValidator) -> Self {
    self.validator = validator;
    self
  }

  /// Caller name used by [`Badges::set`]. Empty resets to the built-in default.
  pub fn default_caller(mut self, caller: impl Into<String>) -> Self {
    let caller = caller.into();
    self.default_caller = if caller.is_empty() {
      DEFAULT_CALLER.to_owned()
    } else {
      caller
    };
    self
  }

  /// Create `path` at build time with a fixed propagation policy.
  pub fn declare(mut self, path: impl Into<String>, propagation: Propagation) -> Self {
    self.declarations.push(NodeDeclaration {
      path: path.into(),
      propagation,
    });
    self
  }

  /// Apply a loaded configuration on top of this builder.
  pub fn config(self, config: &BadgesConfig) -> Self {
    let builder = self.default_caller(config.default_caller.clone());
    config
      .nodes
      .iter()
      .fold(builder, |b, node| b.declare(node.path.clone(), node.propagation))
  }

  /// Build the engine, creating every declared node.
  ///
  /// Fails if a declared path is invalid or has a malformed prefix.
  pub fn build(self) -> BadgeResult<Badges> {
    for decl in &self.declarations {
      path::check(&decl.path)?;
      let invalid = std::iter::once(decl.path.as_str())
        .chain(path::ancestors(&decl.path))
        .find(|p| !(self.validator)(p));
      if let Some(invalid) = invalid {
        return Err(BadgeError::InvalidPath(invalid.to_owned()));
      }
    }

    let mut badges = Badges {
      store: NodeStore::new(self.hasher, self.validator),
      observers: ObserverLinks::new(),
      validator: self.validator,
      default_caller: self.default_caller,
    };
    for decl in &self.declarations {
      badges.declare(&decl.path, decl.propagation);
    }
    Ok(badges)
  }
}

impl Badges {
  /// Create an engine with the default hasher, validator and caller.
  pub fn new() -> Self {
    Self {
      store: NodeStore::new(path::hash, path::is_valid),
      observers: ObserverLinks::new(),
      validator: path::is_valid,
      default_caller: DEFAULT_CALLER.to_owned(),
    }
  }

  /// Create a builder for configuring a new engine.
  pub fn builder() -> BadgesBuilder {
    BadgesBuilder::default()
  }

  /// Create an engine from a loaded configuration.
  pub fn from_config(config: &BadgesConfig) -> BadgeResult<Self> {
    Self::builder().config(config).build()
  }

  /// Key of `path` under the default hasher.
  pub fn hash_of(path: &str) -> NodeKey {
    path::hash(path)
  }

  /// Key of `path` under this engine's hasher.
  pub fn key_of(&self, path: &str) -> NodeKey {
    self.store.key_of(path)
  }

  /// Caller name used by [`Badges::set`].
  pub fn default_caller(&self) -> &str {
    &self.default_caller
  }

  fn accepts(&self, path: &str) -> bool {
    let valid = (self.validator)(path);
    if !valid {
      log::debug!("Ignoring invalid path {path:?}");
    }
    valid
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_declares_nodes() {
    let badges = Badges::builder()
      .declare("a/b", Propagation::Isolated)
      .build()
      .unwrap();
    assert_eq!(badges.node("a/b").unwrap().propagation, Propagation::Isolated);
    // Ancestors are auto-created with the default policy.
    assert_eq!(badges.node("a").unwrap().propagation, Propagation::Propagate);
  }

  #[test]
  fn builder_rejects_malformed_declaration() {
    let err = Badges::builder()
      .declare("/a", Propagation::Propagate)
      .build()
      .unwrap_err();
    assert!(matches!(err, BadgeError::MalformedPath(_)));
  }

  #[test]
  fn builder_rejects_invalid_declaration() {
    let err = Badges::builder()
      .declare("  ", Propagation::Propagate)
      .build()
      .unwrap_err();
    assert!(matches!(err, BadgeError::InvalidPath(_)));
  }

  #[test]
  fn builder_rejects_invalid_ancestor() {
    let err = Badges::builder()
      .declare(" /b", Propagation::Propagate)
      .build()
      .unwrap_err();
    assert!(matches!(err, BadgeError::InvalidPath(p) if p == " "));
  }

  #[test]
  fn empty_default_caller_falls_back() {
    let badges = Badges::builder().default_caller("").build().unwrap();
    assert_eq!(badges.default_caller(), DEFAULT_CALLER);
  }

  #[test]
  fn custom_validator_is_used() {
    fn no_spaces(path: &str) -> bool {
      !path.is_empty() && !path.contains(' ')
    }
    let mut badges = Badges::builder().validator(no_spaces).build().unwrap();
    badges.set("a b", true);
    assert!(badges.node("a b").is_none());
    badges.set("ab", true);
    assert!(badges.is_visible("ab"));
  }

  #[test]
  fn custom_hasher_is_used() {
    fn length_hash(path: &str) -> NodeKey {
      NodeKey(path.len() as u64)
    }
    let badges = Badges::builder().hasher(length_hash).build().unwrap();
    assert_eq!(badges.key_of("abc"), NodeKey(3));
    assert_eq!(Badges::hash_of("abc"), path::hash("abc"));
  }

  #[test]
  fn from_config_applies_caller_and_nodes() {
    let config = BadgesConfig {
      default_caller: "sys".to_owned(),
      nodes: vec![NodeDeclaration {
        path: "x/y".to_owned(),
        propagation: Propagation::PropagateAndForceErase,
      }],
    };
    let badges = Badges::from_config(&config).unwrap();
    assert_eq!(badges.default_caller(), "sys");
    assert_eq!(
      badges.node("x/y").unwrap().propagation,
      Propagation::PropagateAndForceErase
    );
  }
}
