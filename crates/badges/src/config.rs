/*!
Declarative engine configuration.

A host can fix propagation policies up front instead of calling
`Badges::declare` at startup:

```
use badges::{Badges, BadgesConfig, Propagation};

let config = BadgesConfig::from_json(r#"{
  "default_caller": "system",
  "nodes": [
    { "path": "Social", "propagation": "isolated" },
    { "path": "Mail/Inbox", "propagation": "propagate_and_force_erase" }
  ]
}"#).unwrap();

let badges = Badges::from_config(&config).unwrap();
assert_eq!(badges.node("Social").unwrap().propagation, Propagation::Isolated);
```
*/

use serde::{Deserialize, Serialize};

use crate::types::{BadgeResult, Propagation};

/// Caller name used when none (or an empty one) is given.
pub const DEFAULT_CALLER: &str = "__default_caller__";

/// Engine configuration, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgesConfig {
  /// Caller name for `Badges::set`. Empty means [`DEFAULT_CALLER`].
  pub default_caller: String,
  /// Nodes created with a fixed propagation policy at build time.
  pub nodes: Vec<NodeDeclaration>,
}

/// One node declared up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDeclaration {
  /// Node path; ancestors are created as needed.
  pub path: String,
  /// Policy fixed for this node. Defaults to `propagate`.
  #[serde(default)]
  pub propagation: Propagation,
}

impl BadgesConfig {
  /// Parse a JSON configuration.
  pub fn from_json(json: &str) -> BadgeResult<Self> {
    Ok(serde_json::from_str(json)?)
  }
}
