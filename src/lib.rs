//! # spark-vdom
//!
//! Minimal reactive UI framework for Rust.
//!
//! An app keeps a state value, renders an abstract tree from it with a view
//! function, and keeps a persistent native tree in sync by applying only the
//! changes between the previous and the next abstract tree.
//!
//! ## Architecture
//!
//! ```text
//! action -> state -> view -> next tree
//!     -> (end of turn) -> reconcile(previous, next) -> native tree
//! ```
//!
//! Any number of actions dispatched in one turn produce one reconciliation
//! pass. Matching is positional: no keys, no lifecycle hooks, one synchronous
//! pass per cycle.
//!
//! ## Modules
//!
//! - [`node`] - Abstract tree (elements, leaves, attributes, handlers)
//! - [`native`] - Native tree capability surface and the in-memory host tree
//! - [`diff`] - Change classification for one tree position
//! - [`reconcile`] - Positional reconciliation
//! - [`scheduler`] - App, actions and coalesced rendering
//! - [`host`] - Terminal host (crossterm)
//! - [`config`] - Mount configuration

pub mod config;
pub mod diff;
pub mod error;
pub mod host;
pub mod native;
pub mod node;
pub mod reconcile;
pub mod scheduler;

// Re-export commonly used items
pub use config::{MountConfig, RenderMode};
pub use diff::{classify, ChangeKind};
pub use error::{Error, Result};
pub use native::{materialize, MemoryTree, Mutation, NativeTree, NodeId};
pub use node::{handler, text, AbstractNode, AttributeValue, Event, EventHandler, LeafValue};
pub use reconcile::{reconcile, Patched};
pub use scheduler::{ActionMap, ActionValue, Actions, App, RenderCycle, TaskQueue};
