//! Positional child diffing.
//!
//! The old children (reached through `parent.alternate.child` and `sibling`)
//! and the new element sequence are walked in lockstep. At each position:
//! - same type: an `Update` fiber reusing the old host node, `alternate` set;
//! - new element without a same-type old fiber: a `Place` fiber;
//! - old fiber without a same-type element: the old fiber is tagged `Delete`
//!   and queued for commit.
//!
//! A type change at one position therefore yields both a `Delete` and a
//! `Place`. Matching is by position only, so reordered children are not
//! recognized as moves.
//!
//! Invalid elements are dropped before matching and occupy no position: the
//! valid siblings after them line up with the old chain as if the invalid
//! element had never been written.

use crate::element::{Element, ElementType};
use crate::error::ElementError;
use crate::fiber::{Effect, Fiber, FiberId};
use crate::host::Host;
use crate::work_loop::Reconciler;

impl<H: Host> Reconciler<H> {
    pub(crate) fn reconcile_children(
        &mut self,
        wip: FiberId,
        elements: &[Element],
        errors: &mut Vec<ElementError>,
    ) {
        let elements: Vec<&Element> = elements
            .iter()
            .filter(|element| match validate_element(element) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!(target: "reconciler.reconcile", "skipping element: {err}");
                    errors.push(err);
                    false
                }
            })
            .collect();

        let mut old = self.arena[wip]
            .alternate
            .and_then(|alt| self.arena.get(alt))
            .and_then(|alt| alt.child);
        let mut previous: Option<FiberId> = None;
        let mut index = 0;
        self.arena[wip].child = None;

        while index < elements.len() || old.is_some() {
            let element = elements.get(index).copied();
            let mut emitted = None;

            match (old, element) {
                (Some(old_id), Some(element)) if self.arena[old_id].tag.matches(element.ty()) => {
                    let host_node = self.arena[old_id].host_node.clone();
                    let id = self.alloc(Fiber::from_element(
                        element,
                        wip,
                        Effect::Update,
                        host_node,
                        Some(old_id),
                    ));
                    self.arena[old_id].alternate = Some(id);
                    emitted = Some(id);
                }
                _ => {
                    if let Some(element) = element {
                        emitted =
                            Some(self.alloc(Fiber::from_element(element, wip, Effect::Place, None, None)));
                    }
                    if let Some(old_id) = old {
                        self.arena[old_id].effect = Effect::Delete;
                        self.deletions.push(old_id);
                    }
                }
            }

            if let Some(old_id) = old {
                old = self.arena[old_id].sibling;
            }
            if let Some(id) = emitted {
                match previous {
                    None => self.arena[wip].child = Some(id),
                    Some(prev) => self.arena[prev].sibling = Some(id),
                }
                previous = Some(id);
            }
            index += 1;
        }
    }
}

/// Rejects host tags that no host could create a node for.
fn validate_element(element: &Element) -> Result<(), ElementError> {
    let ElementType::Host(tag) = element.ty() else {
        return Ok(());
    };
    let reason = match tag.chars().next() {
        None => Some("tag is empty"),
        Some(first) if !first.is_ascii_alphabetic() => Some("tag must start with an ASCII letter"),
        Some(_) => tag
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
            .then_some("tag contains characters outside [A-Za-z0-9-_:.]"),
    };
    match reason {
        Some(reason) => Err(ElementError::InvalidElementType {
            tag: tag.clone(),
            reason,
        }),
        None => Ok(()),
    }
}
