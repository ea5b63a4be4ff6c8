//! Counter Example - Coalesced rendering on a terminal
//!
//! Tab to focus a button, Enter to press it, `+`/`-` keys work anywhere,
//! q or Esc to quit.
//!
//! Run with: cargo run --example counter
//! Logs: RUST_LOG=spark_vdom=debug cargo run --example counter 2> counter.log

use spark_vdom::node::handler;
use spark_vdom::{
    h, host, AbstractNode, ActionMap, ActionValue, Actions, App, MemoryTree, MountConfig,
    RenderMode,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Counter {
    count: i64,
}

fn view(state: &Counter, actions: &Actions<Counter>) -> AbstractNode {
    let inc = actions.clone();
    let dec = actions.clone();
    let keys = actions.clone();
    h!("div", { "class" => "counter", "onkeydown" => handler(move |e| {
            let step = match e.value.as_deref() {
                Some("+") => 1,
                Some("-") => -1,
                _ => return,
            };
            if let Err(err) = keys.call("add", &[ActionValue::from(step)]) {
                warn!(%err, "key action failed");
            }
        }) },
        h!("h1", {}, "spark-vdom counter"),
        h!("p", {}, "Count: ", state.count),
        h!("button", { "onclick" => handler(move |_| inc.dispatch(|s| s.count += 1)) }, "+"),
        h!("button", { "onclick" => handler(move |_| dec.dispatch(|s| s.count -= 1)) }, "-"),
    )
}

fn main() -> spark_vdom::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = MountConfig::new("app").with_render_mode(RenderMode::Fullscreen);
    let actions = ActionMap::new().with("add", |s: &mut Counter, args: &[ActionValue]| {
        s.count += args.first().and_then(ActionValue::as_number).unwrap_or(0.0) as i64;
        s.count
    });

    let app = App::builder(MemoryTree::with_container("app"), Counter::default(), view)
        .actions(actions)
        .mount(&config)?;

    host::run(&app, &config)?;
    println!("Final count: {}", app.state().count);
    Ok(())
}
