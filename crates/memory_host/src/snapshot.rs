use crate::{MemoryHost, NodeKind};
use core_types::NodeId;
use reconciler::TEXT_VALUE;
use std::fmt::{self, Write};

/// Deterministic text rendering of a host subtree for test comparisons.
///
/// One line per node, indented two spaces per depth:
/// - the container renders as `#container`;
/// - elements render as `<tag name="value" @event>` with properties in name
///   order followed by subscribed events in subscription order;
/// - text nodes render as their quoted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSnapshot {
    lines: Vec<String>,
}

impl HostSnapshot {
    pub fn new(host: &MemoryHost, root: NodeId) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(host, root, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for HostSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

fn walk_snapshot(host: &MemoryHost, node: NodeId, depth: usize, out: &mut Vec<String>) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(depth.saturating_mul(INDENT_STEP));
    let Some(record) = host.record(node) else {
        let _ = write!(&mut line, "#missing {}", node.0);
        out.push(line);
        return;
    };
    match &record.kind {
        NodeKind::Container => line.push_str("#container"),
        NodeKind::Text => {
            let value = record
                .properties
                .get(TEXT_VALUE)
                .map(ToString::to_string)
                .unwrap_or_default();
            let _ = write!(&mut line, "{value:?}");
        }
        NodeKind::Element { tag } => {
            line.push('<');
            line.push_str(tag);
            for (name, value) in &record.properties {
                let _ = write!(&mut line, " {name}={:?}", value.to_string());
            }
            for (event, _) in &record.listeners {
                let _ = write!(&mut line, " @{event}");
            }
            line.push('>');
        }
    }
    out.push(line);
    for &child in &record.children {
        walk_snapshot(host, child, depth + 1, out);
    }
}
