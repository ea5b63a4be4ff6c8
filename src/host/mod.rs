//! Terminal Host - Run an app against a terminal.
//!
//! The host owns the turn loop: it polls one key, turns it into events fired
//! at the native tree, then drains the task queue. A single effect bound to
//! the app's pass signal repaints after every reconciliation pass.
//!
//! # Example
//!
//! ```ignore
//! let app = App::builder(MemoryTree::with_container("app"), state, view).mount(&config)?;
//! spark_vdom::host::run(&app, &config)?;
//! ```

mod input;
mod present;

pub use input::{command_for, key_name, poll_command, HostCommand};
pub use present::{layout_lines, present, Line};

use std::cell::Cell;
use std::io::{self, stdout};
use std::rc::Rc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use spark_signals::effect;
use tracing::debug;

use crate::config::{MountConfig, RenderMode};
use crate::error::Result;
use crate::native::{MemoryTree, NodeId};
use crate::node::Event;
use crate::scheduler::App;

// =============================================================================
// Terminal Guard
// =============================================================================

/// Restores the terminal when dropped, including on error paths.
struct TerminalGuard {
    mode: RenderMode,
}

impl TerminalGuard {
    fn enter(mode: RenderMode) -> io::Result<Self> {
        enable_raw_mode()?;
        if mode == RenderMode::Fullscreen {
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }
        Ok(Self { mode })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best effort
        if self.mode == RenderMode::Fullscreen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
        }
        let _ = disable_raw_mode();
    }
}

// =============================================================================
// Focus
// =============================================================================

/// Next focus target among clickable nodes, wrapping around.
pub fn cycle_focus(targets: &[NodeId], current: Option<NodeId>, forward: bool) -> Option<NodeId> {
    if targets.is_empty() {
        return None;
    }
    let position = current.and_then(|c| targets.iter().position(|&t| t == c));
    let index = match (position, forward) {
        (None, true) => 0,
        (None, false) => targets.len() - 1,
        (Some(i), true) => (i + 1) % targets.len(),
        (Some(i), false) => (i + targets.len() - 1) % targets.len(),
    };
    Some(targets[index])
}

/// Apply one host command to the app. Returns false when the loop should stop.
///
/// Focus is only honoured while the node still listens for clicks; native
/// ids are recycled, so a focused node replaced by a pass is dropped.
pub fn handle_command<S: 'static>(
    app: &App<S, MemoryTree>,
    focus: &Cell<Option<NodeId>>,
    command: HostCommand,
) -> bool {
    match command {
        HostCommand::Quit => return false,
        HostCommand::FocusNext | HostCommand::FocusPrevious => {
            let targets = app.with_tree(|tree| tree.listening(app.root(), "click"));
            let forward = command == HostCommand::FocusNext;
            focus.set(cycle_focus(&targets, focus.get(), forward));
        }
        HostCommand::Activate => {
            let Some(node) = focus.get() else {
                return true;
            };
            let targets = app.with_tree(|tree| tree.listening(app.root(), "click"));
            if targets.contains(&node) {
                app.fire(node, &Event::new("click"));
            } else {
                debug!(?node, "focused node is gone");
                focus.set(None);
            }
        }
        HostCommand::Key(key) => {
            let targets = app.with_tree(|tree| tree.listening(app.root(), "keydown"));
            for node in targets {
                app.fire(node, &Event::with_value("keydown", key.clone()));
            }
        }
        HostCommand::Ignore => {}
    }
    true
}

// =============================================================================
// Run Loop
// =============================================================================

/// Run `app` on the terminal until a quit key is pressed.
pub fn run<S: 'static>(app: &App<S, MemoryTree>, config: &MountConfig) -> Result<()> {
    // Nothing reads the mutation log here; keep it from growing every pass.
    app.with_tree_mut(|tree| tree.set_recording(false));

    let _guard = TerminalGuard::enter(config.render_mode)?;
    let origin_row = match config.render_mode {
        RenderMode::Fullscreen => 0,
        RenderMode::Inline => crossterm::cursor::position().map(|(_, row)| row).unwrap_or(0),
    };

    let focus = Rc::new(Cell::new(None));
    let passes = app.pass_signal();
    let paint_app = app.clone();
    let paint_focus = focus.clone();

    // The ONE paint effect: re-runs whenever a pass completes.
    let stop = effect(move || {
        let pass = passes.get();
        let lines = paint_app.with_tree(|tree| layout_lines(tree, paint_app.root()));
        debug!(pass, lines = lines.len(), "repainting");
        let _ = present(&mut stdout(), &lines, paint_focus.get(), origin_row);
    });

    app.flush();
    let tick = Duration::from_millis(config.tick_ms);
    loop {
        let Some(command) = poll_command(tick)? else {
            continue;
        };
        let refocus = matches!(command, HostCommand::FocusNext | HostCommand::FocusPrevious);
        if !handle_command(app, &focus, command) {
            break;
        }
        app.flush();
        if refocus {
            let lines = app.with_tree(|tree| layout_lines(tree, app.root()));
            present(&mut stdout(), &lines, focus.get(), origin_row)?;
        }
    }

    stop();
    Ok(())
}
