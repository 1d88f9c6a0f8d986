//! Commit phase.
//!
//! Commit is split in two steps. Planning walks the deletion list and then
//! the work-in-progress tree in pre-order, resolving every host parent and
//! producing an ordered list of host operations. Only if planning succeeds
//! are the operations applied, so an invariant violation discovered while
//! planning leaves the host untouched.
//!
//! Operation ordering:
//! - removals first, in deletion-list order;
//! - then, per fiber in pre-order, `Place` (initial properties, then append)
//!   or `Update` (property patch against the previous generation).

use crate::element::{PropValue, Props};
use crate::error::RenderError;
use crate::fiber::{Effect, FiberId};
use crate::host::{Host, event_name, is_event};
use crate::work_loop::Reconciler;
use core_types::Generation;

/// One fiber's effect as applied by a commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectRecord {
    pub label: String,
    pub effect: Effect,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub generation: Generation,
    /// Effects in application order.
    pub effects: Vec<EffectRecord>,
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
    /// Host property and subscription calls made while patching.
    pub property_mutations: usize,
}

impl CommitReport {
    pub fn count(&self, effect: Effect) -> usize {
        self.effects.iter().filter(|r| r.effect == effect).count()
    }
}

enum CommitOp<N> {
    Remove { parent: N, node: N },
    Patch { node: N, prev: Props, next: Props },
    Append { parent: N, node: N },
}

impl<H: Host> Reconciler<H> {
    pub(crate) fn commit_root(&mut self) -> Result<CommitReport, RenderError> {
        let Some(root) = self.wip_root else {
            return Ok(CommitReport::default());
        };
        let mut report = CommitReport {
            generation: self.generation.next(),
            ..CommitReport::default()
        };
        let ops = self.plan_commit(root, &mut report)?;

        for op in &ops {
            match op {
                CommitOp::Remove { parent, node } => self.host.remove_child(parent, node),
                CommitOp::Patch { node, prev, next } => {
                    report.property_mutations += update_properties(&mut self.host, node, prev, next);
                }
                CommitOp::Append { parent, node } => self.host.append_child(parent, node),
            }
        }

        let previous = self.current_root.replace(root);
        self.wip_root = None;
        self.deletions.clear();
        if let Some(previous) = previous {
            for id in self.arena.subtree(previous) {
                self.arena.remove(id);
            }
        }
        for id in std::mem::take(&mut self.wip_fibers) {
            let fiber = &mut self.arena[id];
            fiber.alternate = None;
            fiber.effect = Effect::None;
        }
        self.generation = report.generation;
        log::debug!(
            target: "reconciler.commit",
            "committed generation {}: {} placed, {} updated, {} deleted, {} host ops",
            report.generation.0,
            report.placements,
            report.updates,
            report.deletions,
            ops.len()
        );
        Ok(report)
    }

    fn plan_commit(
        &self,
        root: FiberId,
        report: &mut CommitReport,
    ) -> Result<Vec<CommitOp<H::Node>>, RenderError> {
        let mut ops = Vec::new();

        for &deleted in &self.deletions {
            let parent = self.host_parent(deleted)?;
            let mut nodes = Vec::new();
            self.collect_host_nodes(deleted, &mut nodes);
            for node in nodes {
                ops.push(CommitOp::Remove {
                    parent: parent.clone(),
                    node,
                });
            }
            report.deletions += 1;
            report.effects.push(EffectRecord {
                label: self.arena[deleted].tag.label(),
                effect: Effect::Delete,
            });
        }

        let mut stack: Vec<FiberId> = self.arena[root].child.into_iter().collect();
        while let Some(id) = stack.pop() {
            let fiber = &self.arena[id];
            if let Some(sibling) = fiber.sibling {
                stack.push(sibling);
            }
            if let Some(child) = fiber.child {
                stack.push(child);
            }
            match fiber.effect {
                Effect::Place => {
                    report.placements += 1;
                    if let Some(node) = &fiber.host_node {
                        let parent = self.host_parent(id)?;
                        ops.push(CommitOp::Patch {
                            node: node.clone(),
                            prev: Props::new(),
                            next: fiber.props.clone(),
                        });
                        ops.push(CommitOp::Append {
                            parent,
                            node: node.clone(),
                        });
                    }
                }
                Effect::Update => {
                    report.updates += 1;
                    if let Some(node) = &fiber.host_node {
                        let prev = fiber
                            .alternate
                            .and_then(|alt| self.arena.get(alt))
                            .map(|alt| alt.props.clone())
                            .unwrap_or_default();
                        ops.push(CommitOp::Patch {
                            node: node.clone(),
                            prev,
                            next: fiber.props.clone(),
                        });
                    }
                }
                // Deletions were planned above from the deletion list.
                Effect::Delete | Effect::None => continue,
            }
            report.effects.push(EffectRecord {
                label: fiber.tag.label(),
                effect: fiber.effect,
            });
        }
        Ok(ops)
    }

    /// Host node of the nearest ancestor that owns one. Component fibers own
    /// none and are skipped.
    fn host_parent(&self, id: FiberId) -> Result<H::Node, RenderError> {
        let mut cursor = self.arena[id].parent;
        while let Some(parent) = cursor {
            let fiber = &self.arena[parent];
            if let Some(node) = &fiber.host_node {
                return Ok(node.clone());
            }
            cursor = fiber.parent;
        }
        Err(RenderError::MissingHostParent { fiber: id })
    }

    /// Topmost host nodes at or below `id`, looking through component fibers.
    fn collect_host_nodes(&self, id: FiberId, out: &mut Vec<H::Node>) {
        let fiber = &self.arena[id];
        if let Some(node) = &fiber.host_node {
            out.push(node.clone());
            return;
        }
        for child in self.arena.children(id) {
            self.collect_host_nodes(child, out);
        }
    }
}

/// Patches `node` from `prev` to `next`, returning the number of host calls.
///
/// Handlers that disappeared or changed are unsubscribed before new ones are
/// subscribed; plain properties absent from `next` are cleared before new or
/// changed ones are set.
pub(crate) fn update_properties<H: Host>(
    host: &mut H,
    node: &H::Node,
    prev: &Props,
    next: &Props,
) -> usize {
    let mut calls = 0;

    for (name, value) in prev.iter().filter(|(name, _)| is_event(name)) {
        if next.get(name) == Some(value) {
            continue;
        }
        if let PropValue::Handler(handler) = value {
            host.unsubscribe(node, &event_name(name), handler);
            calls += 1;
        }
    }

    for (name, value) in next.iter().filter(|(name, _)| is_event(name)) {
        if prev.get(name) == Some(value) {
            continue;
        }
        match value {
            PropValue::Handler(handler) => {
                host.subscribe(node, &event_name(name), handler);
                calls += 1;
            }
            other => log::warn!(
                target: "reconciler.commit",
                "event property {name} holds {other}, not a handler; ignored"
            ),
        }
    }

    for (name, _) in prev.iter().filter(|(name, _)| !is_event(name)) {
        if !next.contains(name) {
            host.clear_property(node, name);
            calls += 1;
        }
    }

    for (name, value) in next.iter().filter(|(name, _)| !is_event(name)) {
        if prev.get(name) != Some(value) {
            host.set_property(node, name, value);
            calls += 1;
        }
    }

    calls
}
