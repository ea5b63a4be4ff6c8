//! Tree Node Model - Abstract UI tree description.
//!
//! This module provides:
//! - [`AbstractNode`] - Element or leaf, one per tree position
//! - [`AttributeValue`] - Plain string attribute or event handler
//! - [`h`] / [`text`] / [`h!`](crate::h) - Construction helpers
//!
//! # Conventions
//!
//! Attribute names beginning with `on` are event handlers. The `value`
//! attribute is special-cased by the diff so form-like nodes keep their
//! native state across passes.

mod builder;
mod types;

pub use builder::{h, text};
pub use types::*;
