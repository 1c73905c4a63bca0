/*! Error types for badge tree operations. */

/// Errors surfaced by the fallible parts of the crate (paths, configuration).
///
/// Tree and observer operations never return these; they degrade to no-ops.
#[derive(Debug, thiserror::Error)]
pub enum BadgeError {
  #[error("Invalid path: {0:?}")]
  InvalidPath(String),

  #[error("Malformed path (leading separator): {0:?}")]
  MalformedPath(String),

  #[error("Invalid configuration: {0}")]
  Config(#[from] serde_json::Error),
}

/// Result type for badge operations.
pub type BadgeResult<T> = Result<T, BadgeError>;
