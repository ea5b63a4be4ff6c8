//! Present - Draw a MemoryTree as terminal lines.
//!
//! Layout is deliberately plain: every text node gets its own line indented
//! by depth, and clickable elements collapse into a single `[ label ]` line.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{Clear, ClearType};

use crate::native::{MemoryTree, NativeData, NodeId};

/// One drawn line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub depth: usize,
    pub text: String,
    /// Node this line activates, for clickable lines.
    pub target: Option<NodeId>,
}

/// Flatten the subtree under `root` into lines.
pub fn layout_lines(tree: &MemoryTree, root: NodeId) -> Vec<Line> {
    let mut lines = Vec::new();
    collect(tree, root, 0, &mut lines);
    lines
}

fn collect(tree: &MemoryTree, id: NodeId, depth: usize, lines: &mut Vec<Line>) {
    match tree.data(id) {
        Some(NativeData::Text(text)) => {
            if !text.is_empty() {
                lines.push(Line {
                    depth,
                    text: text.clone(),
                    target: None,
                });
            }
        }
        Some(NativeData::Element { listeners, children, .. }) => {
            if listeners.contains_key("click") {
                lines.push(Line {
                    depth,
                    text: format!("[ {} ]", tree.text_content(id)),
                    target: Some(id),
                });
                return;
            }
            if let Some(value) = tree.value(id) {
                lines.push(Line {
                    depth,
                    text: format!("> {value}"),
                    target: None,
                });
            }
            for &child in children {
                collect(tree, child, depth + 1, lines);
            }
        }
        None => {}
    }
}

/// Write `lines` to `out`, highlighting the focused target.
pub fn present(
    out: &mut impl Write,
    lines: &[Line],
    focused: Option<NodeId>,
    origin_row: u16,
) -> io::Result<()> {
    queue!(out, MoveTo(0, origin_row), Clear(ClearType::FromCursorDown))?;
    for (row, line) in lines.iter().enumerate() {
        let indent = "  ".repeat(line.depth.saturating_sub(1));
        queue!(out, MoveTo(0, origin_row.saturating_add(row as u16)), Print(&indent))?;
        if line.target.is_some() && line.target == focused {
            queue!(
                out,
                SetAttribute(Attribute::Reverse),
                Print(&line.text),
                SetAttribute(Attribute::Reset)
            )?;
        } else {
            queue!(out, Print(&line.text))?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h;
    use crate::native::{materialize, NativeTree};
    use crate::node::handler;

    #[test]
    fn test_layout_lines() {
        let mut tree = MemoryTree::with_container("app");
        let root = tree.lookup("app").unwrap();
        let view = h!("div", {},
            h!("p", {}, "Count: ", 3),
            h!("input", { "value" => "abc" }),
            h!("button", { "onclick" => handler(|_| {}) }, "+"),
        );
        let node = materialize(&mut tree, &view);
        tree.append_child(root, node);

        let lines = layout_lines(&tree, root);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Count: ", "3", "> abc", "[ + ]"]);
        assert_eq!(lines[3].target, tree.listening(root, "click").first().copied());
        assert_eq!(lines[0].depth, 3);
    }

    #[test]
    fn test_present_writes_text() {
        let lines = vec![
            Line { depth: 1, text: "hello".into(), target: None },
            Line { depth: 2, text: "[ go ]".into(), target: None },
        ];
        let mut out = Vec::new();
        present(&mut out, &lines, None, 0).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("hello"));
        assert!(written.contains("  [ go ]"));
    }
}
