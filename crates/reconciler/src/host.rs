//! Capabilities the reconciler requires from its host environment.

use crate::element::{EventHandler, PropValue};
use std::fmt::Debug;
use std::time::Duration;

/// A tree-shaped UI surface the commit phase writes into.
///
/// All operations are synchronous. Nodes handed out by `create_node` /
/// `create_text_node` are detached until `append_child` attaches them.
pub trait Host {
    type Node: Clone + Debug;

    fn create_node(&mut self, tag: &str) -> Self::Node;

    fn create_text_node(&mut self) -> Self::Node;

    fn set_property(&mut self, node: &Self::Node, name: &str, value: &PropValue);

    fn clear_property(&mut self, node: &Self::Node, name: &str);

    fn subscribe(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    fn unsubscribe(&mut self, node: &Self::Node, event: &str, handler: &EventHandler);

    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);

    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
}

/// Remaining budget of a host-granted time slice.
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

/// A deadline that never runs out. Used for synchronous flushes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDeadline;

impl Deadline for NoDeadline {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

pub type IdleCallback = Box<dyn FnOnce(&dyn Deadline)>;

/// Host primitive for requesting a future time slice.
///
/// Contract:
/// - Each scheduled callback runs at most once, with the deadline of the slice
///   it was granted.
/// - Callbacks are never invoked concurrently or reentrantly; a callback may
///   schedule its successor while it runs.
pub trait IdleScheduler {
    fn schedule_work(&self, callback: IdleCallback);
}

/// Properties named `on*` are event subscriptions, everything else is a
/// plain property.
pub fn is_event(name: &str) -> bool {
    name.starts_with("on")
}

/// `onClick` -> `click`.
pub fn event_name(prop: &str) -> String {
    prop.strip_prefix("on").unwrap_or(prop).to_ascii_lowercase()
}
