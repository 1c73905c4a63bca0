/*! Core types for the badge tree. */

#![allow(missing_docs)]

mod error;
mod ids;
mod node_info;
mod propagation;

pub use error::{BadgeError, BadgeResult};
pub use ids::{NodeKey, ObjectId};
pub use node_info::NodeInfo;
pub use propagation::Propagation;
