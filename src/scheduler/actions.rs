//! Actions - Wrapped state mutations.
//!
//! Every action runs against the app state and is followed by a view
//! re-evaluation and a scheduled render. [`Actions`] is the handle view
//! functions capture into event handlers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};

// =============================================================================
// Action Values
// =============================================================================

/// Argument or return value of a named action.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ActionValue {
    #[default]
    Unit,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ActionValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ActionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ActionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<()> for ActionValue {
    fn from(_: ()) -> Self {
        ActionValue::Unit
    }
}

impl From<bool> for ActionValue {
    fn from(value: bool) -> Self {
        ActionValue::Bool(value)
    }
}

impl From<f64> for ActionValue {
    fn from(value: f64) -> Self {
        ActionValue::Number(value)
    }
}

impl From<i64> for ActionValue {
    fn from(value: i64) -> Self {
        ActionValue::Number(value as f64)
    }
}

impl From<i32> for ActionValue {
    fn from(value: i32) -> Self {
        ActionValue::Number(value as f64)
    }
}

impl From<&str> for ActionValue {
    fn from(value: &str) -> Self {
        ActionValue::Text(value.to_string())
    }
}

impl From<String> for ActionValue {
    fn from(value: String) -> Self {
        ActionValue::Text(value)
    }
}

// =============================================================================
// Action Map
// =============================================================================

/// A named action: mutates state from arguments, may return a value.
pub type Action<S> = Rc<dyn Fn(&mut S, &[ActionValue]) -> ActionValue>;

/// Application-authored mapping from action name to action.
pub struct ActionMap<S> {
    actions: BTreeMap<String, Action<S>>,
}

impl<S: 'static> ActionMap<S> {
    pub fn new() -> Self {
        Self {
            actions: BTreeMap::new(),
        }
    }

    /// Register an action under `name`, replacing any previous one.
    pub fn insert<R: Into<ActionValue>>(
        &mut self,
        name: impl Into<String>,
        action: impl Fn(&mut S, &[ActionValue]) -> R + 'static,
    ) {
        let wrapped: Action<S> =
            Rc::new(move |state: &mut S, args: &[ActionValue]| -> ActionValue {
                action(state, args).into()
            });
        self.actions.insert(name.into(), wrapped);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<R: Into<ActionValue>>(
        mut self,
        name: impl Into<String>,
        action: impl Fn(&mut S, &[ActionValue]) -> R + 'static,
    ) -> Self {
        self.insert(name, action);
        self
    }

    pub fn get(&self, name: &str) -> Option<Action<S>> {
        self.actions.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<S: 'static> Default for ActionMap<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for ActionMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}

// =============================================================================
// Dispatch Handle
// =============================================================================

/// What an [`Actions`] handle needs from the running app.
pub(crate) trait Dispatch<S> {
    fn state(&self) -> &RefCell<S>;
    fn action(&self, name: &str) -> Option<Action<S>>;
    fn resolve_node(&self);
}

/// Cloneable handle that runs actions against the app state.
///
/// Holds the app weakly: handlers stored in the app's own trees capture it,
/// so a strong reference would keep the app alive forever.
///
/// Actions must not dispatch other actions while running; the state is
/// mutably borrowed for the duration of the call.
pub struct Actions<S> {
    core: Weak<dyn Dispatch<S>>,
}

impl<S> Clone for Actions<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<S> fmt::Debug for Actions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actions")
            .field("attached", &(self.core.strong_count() > 0))
            .finish()
    }
}

impl<S: 'static> Actions<S> {
    pub(crate) fn new(core: Weak<dyn Dispatch<S>>) -> Self {
        Self { core }
    }

    fn core(&self) -> Rc<dyn Dispatch<S>> {
        match self.core.upgrade() {
            Some(core) => core,
            None => panic!("action dispatched after its app was dropped"),
        }
    }

    /// Run `action` on the state, re-resolve the view and schedule a render.
    ///
    /// Returns the action's value unchanged. A panicking action unwinds
    /// before the view is resolved, so nothing is rendered for it.
    pub fn dispatch<R>(&self, action: impl FnOnce(&mut S) -> R) -> R {
        let core = self.core();
        let value = {
            let mut state = core.state().borrow_mut();
            action(&mut *state)
        };
        core.resolve_node();
        value
    }

    /// Like [`dispatch`](Self::dispatch) for fallible actions.
    ///
    /// On `Err` the error is handed back untouched and no render is
    /// scheduled. Whatever the action changed before failing stays changed.
    pub fn try_dispatch<R, E>(
        &self,
        action: impl FnOnce(&mut S) -> std::result::Result<R, E>,
    ) -> std::result::Result<R, E> {
        let core = self.core();
        let value = {
            let mut state = core.state().borrow_mut();
            action(&mut *state)
        }?;
        core.resolve_node();
        Ok(value)
    }

    /// Dispatch a named action from the app's [`ActionMap`].
    pub fn call(&self, name: &str, args: &[ActionValue]) -> Result<ActionValue> {
        let action = self.core().action(name).ok_or_else(|| Error::UnknownAction {
            name: name.to_string(),
        })?;
        Ok(self.dispatch(|state| action(state, args)))
    }

    /// True while the app is alive.
    pub fn is_attached(&self) -> bool {
        self.core.strong_count() > 0
    }
}
