//! Fiber records and the arena that owns them.
//!
//! Structural links (`parent`, `child`, `sibling`) and the cross-generation
//! `alternate` link are arena indices, never owning references. A node's
//! children form a singly linked list starting at `child` and chained through
//! `sibling`.

use crate::element::{Component, Element, ElementType, Props};
use crate::hooks::HookCellRef;
use slab::Slab;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(usize);

/// Host action required for a fiber. Only meaningful between the start of a
/// render pass and the end of its commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Effect {
    #[default]
    None,
    Place,
    Update,
    Delete,
}

#[derive(Clone, Debug)]
pub(crate) enum FiberTag {
    /// Synthetic root wrapping the container node.
    Root,
    Host(Arc<str>),
    Text,
    Component(Component),
}

impl FiberTag {
    pub(crate) fn from_element_type(ty: &ElementType) -> Self {
        match ty {
            ElementType::Host(tag) => FiberTag::Host(Arc::clone(tag)),
            ElementType::Text => FiberTag::Text,
            ElementType::Component(c) => FiberTag::Component(c.clone()),
        }
    }

    pub(crate) fn matches(&self, ty: &ElementType) -> bool {
        match (self, ty) {
            (FiberTag::Host(a), ElementType::Host(b)) => a == b,
            (FiberTag::Text, ElementType::Text) => true,
            (FiberTag::Component(a), ElementType::Component(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn label(&self) -> String {
        match self {
            FiberTag::Root => "#root".to_string(),
            FiberTag::Host(tag) => tag.to_string(),
            FiberTag::Text => "#text".to_string(),
            FiberTag::Component(c) => format!("<{}>", c.name()),
        }
    }
}

pub(crate) struct Fiber<N> {
    pub(crate) tag: FiberTag,
    pub(crate) props: Props,
    /// Elements this fiber renders as children. Filled from the element for
    /// host/text fibers and from the render result for components.
    pub(crate) pending_children: Vec<Element>,
    pub(crate) host_node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) child: Option<FiberId>,
    pub(crate) sibling: Option<FiberId>,
    pub(crate) alternate: Option<FiberId>,
    pub(crate) effect: Effect,
    pub(crate) hooks: Vec<HookCellRef>,
}

impl<N> Fiber<N> {
    pub(crate) fn root(container: N, children: Vec<Element>, alternate: Option<FiberId>) -> Self {
        Self {
            tag: FiberTag::Root,
            props: Props::new(),
            pending_children: children,
            host_node: Some(container),
            parent: None,
            child: None,
            sibling: None,
            alternate,
            effect: Effect::None,
            hooks: Vec::new(),
        }
    }

    pub(crate) fn from_element(
        element: &Element,
        parent: FiberId,
        effect: Effect,
        host_node: Option<N>,
        alternate: Option<FiberId>,
    ) -> Self {
        Self {
            tag: FiberTag::from_element_type(element.ty()),
            props: element.props().clone(),
            pending_children: element.element_children().to_vec(),
            host_node,
            parent: Some(parent),
            child: None,
            sibling: None,
            alternate,
            effect,
            hooks: Vec::new(),
        }
    }
}

pub(crate) struct FiberArena<N> {
    slots: Slab<Fiber<N>>,
}

impl<N> FiberArena<N> {
    pub(crate) fn new() -> Self {
        Self { slots: Slab::new() }
    }

    pub(crate) fn insert(&mut self, fiber: Fiber<N>) -> FiberId {
        FiberId(self.slots.insert(fiber))
    }

    pub(crate) fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.slots.get(id.0)
    }

    pub(crate) fn remove(&mut self, id: FiberId) -> Option<Fiber<N>> {
        self.slots.try_remove(id.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Ids of `root` and its whole subtree in pre-order.
    pub(crate) fn subtree(&self, root: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(fiber) = self.get(id) else {
                continue;
            };
            out.push(id);
            // Children are pushed in reverse so the first child pops first.
            let mut children = Vec::new();
            let mut next = fiber.child;
            while let Some(child) = next {
                children.push(child);
                next = self.get(child).and_then(|c| c.sibling);
            }
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Children of `id` in sibling order.
    pub(crate) fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut next = self.get(id).and_then(|f| f.child);
        while let Some(child) = next {
            out.push(child);
            next = self.get(child).and_then(|c| c.sibling);
        }
        out
    }
}

impl<N> Index<FiberId> for FiberArena<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Fiber<N> {
        &self.slots[id.0]
    }
}

impl<N> IndexMut<FiberId> for FiberArena<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber<N> {
        &mut self.slots[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(arena: &mut FiberArena<u32>, parent: FiberId, tag: &str) -> FiberId {
        let el = Element::host(tag);
        let id = arena.insert(Fiber::from_element(&el, parent, Effect::Place, None, None));
        match arena.children(parent).last().copied() {
            Some(last) => arena[last].sibling = Some(id),
            None => arena[parent].child = Some(id),
        }
        id
    }

    #[test]
    fn subtree_is_pre_order() {
        let mut arena = FiberArena::new();
        let root = arena.insert(Fiber::root(0u32, Vec::new(), None));
        let a = link(&mut arena, root, "a");
        let a1 = link(&mut arena, a, "a1");
        let b = link(&mut arena, root, "b");
        assert_eq!(arena.subtree(root), vec![root, a, a1, b]);
        assert_eq!(arena.children(root), vec![a, b]);
        assert_eq!(arena[a1].parent, Some(a));
    }

    #[test]
    fn removed_fibers_are_gone() {
        let mut arena: FiberArena<u32> = FiberArena::new();
        let root = arena.insert(Fiber::root(0, Vec::new(), None));
        assert!(arena.remove(root).is_some());
        assert!(arena.get(root).is_none());
        assert_eq!(arena.len(), 0);
        assert!(arena.remove(root).is_none());
    }

    #[test]
    fn tag_matching_is_type_equality() {
        let tag = FiberTag::from_element_type(Element::host("div").ty());
        assert!(tag.matches(Element::host("div").ty()));
        assert!(!tag.matches(Element::host("span").ty()));
        assert!(!tag.matches(Element::text("div").ty()));
        assert!(FiberTag::Text.matches(Element::text("a").ty()));
    }
}
