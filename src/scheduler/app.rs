//! App - State owner and render scheduler.
//!
//! # Flow
//!
//! ```text
//! action -> state mutated -> resolve_node (view -> next tree) -> schedule_render
//!                                                                     |
//!                            (end of turn: queue drained)             v
//!                                        render: reconcile(previous, next)
//! ```
//!
//! `schedule_render` only defers a render when none is pending, so any number
//! of actions dispatched within one turn produce a single reconciliation pass
//! reflecting the state after the last of them.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};
use tracing::{debug, trace, warn};

use crate::config::MountConfig;
use crate::error::{Error, Result};
use crate::native::{materialize, MemoryTree, NativeTree, NodeId};
use crate::node::{AbstractNode, Event};
use crate::reconcile::{reconcile, Patched};

use super::actions::{Action, ActionMap, Actions, Dispatch};
use super::queue::TaskQueue;

/// View function: state and actions in, abstract tree out.
pub type View<S> = Box<dyn Fn(&S, &Actions<S>) -> AbstractNode>;

// =============================================================================
// Render Cycle
// =============================================================================

/// Previous/next tree pair plus the coalescing flag.
#[derive(Debug, Default)]
pub struct RenderCycle {
    /// Tree the native tree currently reflects.
    pub previous: Option<Rc<AbstractNode>>,
    /// Latest tree produced by the view.
    pub next: Option<Rc<AbstractNode>>,
    /// A render is queued and has not run yet.
    pub pending: bool,
}

// =============================================================================
// Runtime
// =============================================================================

struct Runtime<S, T: NativeTree> {
    state: RefCell<S>,
    view: View<S>,
    actions: Actions<S>,
    action_map: ActionMap<S>,
    cycle: RefCell<RenderCycle>,
    tree: RefCell<T>,
    root: T::Node,
    queue: TaskQueue,
    passes: Signal<u64>,
    this: Weak<Runtime<S, T>>,
}

impl<S: 'static, T: NativeTree + 'static> Runtime<S, T> {
    fn schedule_render(&self) {
        {
            let mut cycle = self.cycle.borrow_mut();
            if cycle.pending {
                trace!("render already pending, coalescing");
                return;
            }
            cycle.pending = true;
        }
        trace!("render scheduled");
        let this = self.this.clone();
        self.queue.defer(move || {
            if let Some(runtime) = this.upgrade() {
                runtime.render();
            }
        });
    }

    fn render(&self) {
        let (previous, next) = {
            let cycle = self.cycle.borrow();
            (cycle.previous.clone(), cycle.next.clone())
        };
        let Some(next) = next else {
            warn!("render ran without a resolved tree");
            self.cycle.borrow_mut().pending = false;
            return;
        };

        let patched = {
            let mut tree = self.tree.borrow_mut();
            match previous.as_deref() {
                None => {
                    let native = materialize(&mut *tree, &next);
                    tree.append_child(self.root, native);
                    Patched::APPENDED
                }
                Some(previous) => reconcile(&mut *tree, self.root, Some(previous), Some(&*next), 0),
            }
        };

        {
            let mut cycle = self.cycle.borrow_mut();
            cycle.previous = Some(next);
            cycle.pending = false;
        }

        let pass = self.passes.get() + 1;
        debug!(pass, ?patched, "reconciliation pass complete");
        self.passes.set(pass);
    }
}

impl<S: 'static, T: NativeTree + 'static> Dispatch<S> for Runtime<S, T> {
    fn state(&self) -> &RefCell<S> {
        &self.state
    }

    fn action(&self, name: &str) -> Option<Action<S>> {
        self.action_map.get(name)
    }

    fn resolve_node(&self) {
        let next = {
            let state = self.state.borrow();
            (self.view)(&state, &self.actions)
        };
        self.cycle.borrow_mut().next = Some(Rc::new(next));
        self.schedule_render();
    }
}

// =============================================================================
// App
// =============================================================================

/// A mounted application.
///
/// Owns the state, the native tree and the render cycle. Cloning yields
/// another handle to the same app.
pub struct App<S, T: NativeTree = MemoryTree> {
    runtime: Rc<Runtime<S, T>>,
}

impl<S, T: NativeTree> Clone for App<S, T> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
        }
    }
}

impl<S, T: NativeTree> fmt::Debug for App<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("root", &self.runtime.root)
            .field("cycle", &self.runtime.cycle.borrow())
            .finish()
    }
}

impl<S: 'static, T: NativeTree + 'static> App<S, T> {
    /// Start building an app over `tree` with initial `state` and `view`.
    pub fn builder(
        tree: T,
        state: S,
        view: impl Fn(&S, &Actions<S>) -> AbstractNode + 'static,
    ) -> AppBuilder<S, T> {
        AppBuilder {
            tree,
            state,
            view: Box::new(view),
            actions: ActionMap::new(),
            queue: None,
        }
    }

    /// Handle for dispatching actions outside the view.
    pub fn actions(&self) -> Actions<S> {
        self.runtime.actions.clone()
    }

    /// Queue the app defers renders onto.
    pub fn queue(&self) -> &TaskQueue {
        &self.runtime.queue
    }

    /// Drain the task queue, running any pending render.
    pub fn flush(&self) -> usize {
        self.runtime.queue.run_until_idle()
    }

    pub fn state(&self) -> Ref<'_, S> {
        self.runtime.state.borrow()
    }

    pub fn cycle(&self) -> Ref<'_, RenderCycle> {
        self.runtime.cycle.borrow()
    }

    pub fn is_pending(&self) -> bool {
        self.runtime.cycle.borrow().pending
    }

    /// Mount container in the native tree.
    pub fn root(&self) -> T::Node {
        self.runtime.root
    }

    /// Read-only access to the native tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.runtime.tree.borrow())
    }

    /// Mutable access to the native tree, for host setup.
    ///
    /// Changes made here are invisible to the reconciler, which assumes the
    /// native tree still matches the previous abstract tree.
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.runtime.tree.borrow_mut())
    }

    /// Number of completed reconciliation passes.
    pub fn passes(&self) -> u64 {
        self.runtime.passes.get()
    }

    /// Signal bumped after every completed pass.
    pub fn pass_signal(&self) -> Signal<u64> {
        self.runtime.passes.clone()
    }
}

impl<S: 'static> App<S, MemoryTree> {
    /// Fire `event` at `node`'s listener. Returns false when none is registered.
    ///
    /// The handler runs with the tree unborrowed, so it may dispatch actions.
    pub fn fire(&self, node: NodeId, event: &Event) -> bool {
        let handler = self.with_tree(|tree| tree.listener(node, &event.name));
        match handler {
            Some(handler) => {
                handler.call(event);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects the mount configuration of an [`App`].
pub struct AppBuilder<S, T> {
    tree: T,
    state: S,
    view: View<S>,
    actions: ActionMap<S>,
    queue: Option<TaskQueue>,
}

impl<S: 'static, T: NativeTree + 'static> AppBuilder<S, T> {
    /// Named actions reachable through [`Actions::call`].
    pub fn actions(mut self, actions: ActionMap<S>) -> Self {
        self.actions = actions;
        self
    }

    /// Share a task queue with other apps or the host loop.
    pub fn queue(mut self, queue: TaskQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Resolve the mount point, resolve the first tree and schedule the
    /// initial render.
    pub fn mount(self, config: &MountConfig) -> Result<App<S, T>> {
        let Some(root) = self.tree.lookup(&config.mount) else {
            warn!(mount = %config.mount, "mount point not found");
            return Err(Error::MissingMountPoint {
                key: config.mount.clone(),
            });
        };

        let AppBuilder {
            tree,
            state,
            view,
            actions,
            queue,
        } = self;

        let runtime = Rc::new_cyclic(|this: &Weak<Runtime<S, T>>| {
            let core: Weak<dyn Dispatch<S>> = this.clone();
            Runtime {
                state: RefCell::new(state),
                view,
                actions: Actions::new(core),
                action_map: actions,
                cycle: RefCell::new(RenderCycle::default()),
                tree: RefCell::new(tree),
                root,
                queue: queue.unwrap_or_default(),
                passes: signal(0),
                this: this.clone(),
            }
        });
        debug!(mount = %config.mount, "app mounted");

        runtime.resolve_node();
        Ok(App { runtime })
    }
}

// =============================================================================
// Tests
// =============================================================================
