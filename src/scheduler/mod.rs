//! Render Scheduler - Actions, view resolution and coalesced rendering.
//!
//! This module provides:
//! - [`App`] - Owns state, native tree and the [`RenderCycle`]
//! - [`Actions`] - Handle that wraps state mutations
//! - [`ActionMap`] - Named actions for [`Actions::call`]
//! - [`TaskQueue`] - The deferred-work primitive renders are queued on
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::{h, App, MemoryTree, MountConfig, node::handler};
//!
//! struct Counter { count: i64 }
//!
//! let app = App::builder(MemoryTree::with_container("app"), Counter { count: 0 }, |s, actions| {
//!     let inc = actions.clone();
//!     h!("div", {},
//!         h!("span", {}, s.count),
//!         h!("button", { "onclick" => handler(move |_| inc.dispatch(|s| s.count += 1)) }, "+"),
//!     )
//! })
//! .mount(&MountConfig::default())?;
//!
//! app.flush(); // first render
//! app.actions().dispatch(|s| s.count += 1);
//! app.actions().dispatch(|s| s.count += 1);
//! app.flush(); // one pass for both
//! ```

mod actions;
mod app;
mod queue;

pub use actions::{Action, ActionMap, ActionValue, Actions};
pub use app::{App, AppBuilder, RenderCycle, View};
pub use queue::{Task, TaskQueue};
