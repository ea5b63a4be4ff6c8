//! Error types.
//!
//! The reconciler itself has no recoverable error paths. Errors here come
//! from startup (mount lookup, config) and from the outer surfaces
//! (named actions, terminal I/O).

use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the framework.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured mount key resolves to nothing in the native tree.
    #[error("mount point `{key}` not found")]
    MissingMountPoint { key: String },

    /// Named dispatch of an action that was never registered.
    #[error("unknown action `{name}`")]
    UnknownAction { name: String },

    /// Config file could not be parsed.
    #[error("invalid config: {0}")]
    Config(String),

    /// Terminal I/O
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
