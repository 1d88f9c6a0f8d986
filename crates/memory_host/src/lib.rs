//! In-memory host tree.
//!
//! Implements the reconciler's host capability set over an arena of node
//! records and logs every call in order, so tests can assert exactly which
//! host mutations a commit performed and when.
//!
//! Invariants:
//! - `NodeId::INVALID` is never handed out; the container is created first.
//! - A node has at most one parent; appends must not create cycles.
//! - Removing a child detaches it (and its subtree) but keeps its record, so
//!   a detached node can still be inspected.
//!
//! The capability set is infallible, so contract breaches are recorded as
//! [`HostViolation`]s instead of being returned.

mod snapshot;

pub use crate::snapshot::HostSnapshot;

use core_types::NodeId;
use reconciler::{Event, EventHandler, Host, PropValue, TEXT_VALUE};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HostViolation {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("{child:?} already has a parent")]
    AlreadyAttached { child: NodeId },
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("{0:?} cannot have children")]
    InvalidParent(NodeId),
    #[error("no {event:?} subscription on {node:?} matches the handler")]
    UnknownSubscription { node: NodeId, event: String },
}

/// One host capability call, in the order the reconciler made it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCall {
    CreateNode { node: NodeId, tag: String },
    CreateText { node: NodeId },
    SetProperty { node: NodeId, name: String, value: String },
    ClearProperty { node: NodeId, name: String },
    Subscribe { node: NodeId, event: String },
    Unsubscribe { node: NodeId, event: String },
    AppendChild { parent: NodeId, child: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
}

impl HostCall {
    /// Creation of detached nodes is not observable; everything else is.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, HostCall::CreateNode { .. } | HostCall::CreateText { .. })
    }
}

#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Container,
    Element { tag: Arc<str> },
    Text,
}

pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) properties: BTreeMap<String, PropValue>,
    pub(crate) listeners: Vec<(String, EventHandler)>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeRecord {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Container | NodeKind::Element { .. })
    }
}

pub struct MemoryHost {
    nodes: Vec<NodeRecord>,
    container: NodeId,
    calls: Vec<HostCall>,
    violations: Vec<HostViolation>,
}

impl MemoryHost {
    pub fn new() -> Self {
        let mut host = Self {
            nodes: Vec::new(),
            container: NodeId::INVALID,
            calls: Vec::new(),
            violations: Vec::new(),
        };
        host.container = host.insert(NodeKind::Container);
        host
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn violations(&self) -> &[HostViolation] {
        &self.violations
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.record(node)?.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        self.record(node)
            .is_some_and(|r| matches!(r.kind, NodeKind::Text))
    }

    pub fn property(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        self.record(node)?.properties.get(name)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.record(node).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.record(node)?.parent
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.record(node)
            .map(|r| r.listeners.iter().filter(|(e, _)| e == event).count())
            .unwrap_or(0)
    }

    /// Attached element nodes with `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.container];
        while let Some(node) = stack.pop() {
            if self.tag(node) == Some(tag) {
                out.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn find(&self, tag: &str) -> Option<NodeId> {
        self.find_all(tag).into_iter().next()
    }

    /// Concatenated text of all text nodes below `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.is_text(current) {
                if let Some(value) = self.property(current, TEXT_VALUE) {
                    out.push_str(&value.to_string());
                }
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Invokes every handler subscribed to `event` on `node`, returning how
    /// many ran. Handlers are cloned out first so they may freely request
    /// state updates.
    pub fn dispatch(&self, node: NodeId, event: Event) -> usize {
        let handlers: Vec<EventHandler> = match self.record(node) {
            Some(record) => record
                .listeners
                .iter()
                .filter(|(name, _)| **name == *event.name)
                .map(|(_, handler)| handler.clone())
                .collect(),
            None => Vec::new(),
        };
        log::trace!(
            target: "memory_host",
            "dispatch {} on {node:?} to {} handlers",
            event.name,
            handlers.len()
        );
        for handler in &handlers {
            handler.call(&event);
        }
        handlers.len()
    }

    pub fn click(&self, node: NodeId) -> usize {
        self.dispatch(node, Event::new("click"))
    }

    pub fn snapshot(&self, node: NodeId) -> HostSnapshot {
        HostSnapshot::new(self, node)
    }

    pub(crate) fn record(&self, node: NodeId) -> Option<&NodeRecord> {
        let index = (node.0 as usize).checked_sub(1)?;
        self.nodes.get(index)
    }

    fn record_mut(&mut self, node: NodeId) -> Option<&mut NodeRecord> {
        let index = (node.0 as usize).checked_sub(1)?;
        self.nodes.get_mut(index)
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeRecord::new(kind));
        NodeId(self.nodes.len() as u32)
    }

    fn log_call(&mut self, call: HostCall) {
        log::trace!(target: "memory_host", "{call:?}");
        self.calls.push(call);
    }

    fn violation(&mut self, violation: HostViolation) {
        log::error!(target: "memory_host", "host contract violation: {violation}");
        self.violations.push(violation);
    }

    fn live(&mut self, node: NodeId) -> bool {
        if self.record(node).is_some() {
            return true;
        }
        self.violation(HostViolation::UnknownNode(node));
        false
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MemoryHost {
    type Node = NodeId;

    fn create_node(&mut self, tag: &str) -> NodeId {
        let node = self.insert(NodeKind::Element {
            tag: Arc::from(tag),
        });
        self.log_call(HostCall::CreateNode {
            node,
            tag: tag.to_string(),
        });
        node
    }

    fn create_text_node(&mut self) -> NodeId {
        let node = self.insert(NodeKind::Text);
        self.log_call(HostCall::CreateText { node });
        node
    }

    fn set_property(&mut self, node: &NodeId, name: &str, value: &PropValue) {
        self.log_call(HostCall::SetProperty {
            node: *node,
            name: name.to_string(),
            value: value.to_string(),
        });
        if let Some(record) = self.record_mut(*node) {
            record.properties.insert(name.to_string(), value.clone());
        } else {
            self.violation(HostViolation::UnknownNode(*node));
        }
    }

    fn clear_property(&mut self, node: &NodeId, name: &str) {
        self.log_call(HostCall::ClearProperty {
            node: *node,
            name: name.to_string(),
        });
        if let Some(record) = self.record_mut(*node) {
            record.properties.remove(name);
        } else {
            self.violation(HostViolation::UnknownNode(*node));
        }
    }

    fn subscribe(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        self.log_call(HostCall::Subscribe {
            node: *node,
            event: event.to_string(),
        });
        if let Some(record) = self.record_mut(*node) {
            record.listeners.push((event.to_string(), handler.clone()));
        } else {
            self.violation(HostViolation::UnknownNode(*node));
        }
    }

    fn unsubscribe(&mut self, node: &NodeId, event: &str, handler: &EventHandler) {
        self.log_call(HostCall::Unsubscribe {
            node: *node,
            event: event.to_string(),
        });
        if !self.live(*node) {
            return;
        }
        let removed = self.record_mut(*node).is_some_and(|record| {
            match record
                .listeners
                .iter()
                .position(|(name, h)| name == event && h.ptr_eq(handler))
            {
                Some(pos) => {
                    record.listeners.remove(pos);
                    true
                }
                None => false,
            }
        });
        if !removed {
            self.violation(HostViolation::UnknownSubscription {
                node: *node,
                event: event.to_string(),
            });
        }
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        let (parent, child) = (*parent, *child);
        self.log_call(HostCall::AppendChild { parent, child });
        if !self.live(parent) || !self.live(child) {
            return;
        }
        if self.record(parent).is_some_and(|r| !r.allows_children()) {
            self.violation(HostViolation::InvalidParent(parent));
            return;
        }
        if self.parent(child).is_some() {
            self.violation(HostViolation::AlreadyAttached { child });
            return;
        }
        if self.is_ancestor(child, parent) {
            self.violation(HostViolation::CycleDetected { parent, child });
            return;
        }
        if let Some(record) = self.record_mut(parent) {
            record.children.push(child);
        }
        if let Some(record) = self.record_mut(child) {
            record.parent = Some(parent);
        }
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        let (parent, child) = (*parent, *child);
        self.log_call(HostCall::RemoveChild { parent, child });
        if !self.live(parent) || !self.live(child) {
            return;
        }
        if self.parent(child) != Some(parent) {
            self.violation(HostViolation::NotAChild { parent, child });
            return;
        }
        if let Some(record) = self.record_mut(parent) {
            record.children.retain(|c| *c != child);
        }
        if let Some(record) = self.record_mut(child) {
            record.parent = None;
        }
    }
}
