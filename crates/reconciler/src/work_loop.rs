//! Resumable work loop.
//!
//! Contract:
//! - At most one generation is in flight. `render` is rejected while one is.
//! - A unit of work is one fiber: ensure its host node, reconcile its
//!   children, then pick the next fiber in strict pre-order.
//! - The loop yields only between units, so suspension is lossless: the next
//!   slice resumes from `next_unit`.
//! - Commit runs only once `next_unit` is exhausted, in the same slice.
//! - An update request discards the in-flight generation and starts a new one
//!   diffed against the last committed tree. Its root children are those of
//!   the latest accepted `render` that has not committed yet, else those of
//!   the committed root.
//! - Only restarts caused by update requests made while a component was
//!   rendering count towards `max_uncommitted_restarts`.

use crate::commit::CommitReport;
use crate::config::ReconcilerConfig;
use crate::debug::FiberShape;
use crate::element::Element;
use crate::error::{ElementError, RenderError};
use crate::fiber::{Effect, Fiber, FiberArena, FiberId, FiberTag};
use crate::hooks::{Hooks, UpdateSignal};
use crate::host::{Deadline, Host, NoDeadline};
use core_types::Generation;
use std::rc::Rc;

/// Outcome of one host-granted slice.
#[derive(Debug, Default)]
pub struct SliceReport {
    /// Units of work performed in this slice.
    pub units: usize,
    /// Set when the slice finished a generation and committed it.
    pub committed: Option<CommitReport>,
    /// Elements skipped because they could not be reconciled.
    pub element_errors: Vec<ElementError>,
}

pub struct Reconciler<H: Host> {
    pub(crate) host: H,
    pub(crate) container: H::Node,
    pub(crate) config: ReconcilerConfig,
    pub(crate) arena: FiberArena<H::Node>,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) wip_root: Option<FiberId>,
    pub(crate) next_unit: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    /// Fibers allocated by the in-flight generation.
    pub(crate) wip_fibers: Vec<FiberId>,
    /// Children of an accepted `render` call that has not committed yet.
    requested_children: Option<Vec<Element>>,
    signal: Rc<UpdateSignal>,
    pub(crate) generation: Generation,
    /// Consecutive restarts caused by updates requested during render.
    restarts: u32,
    /// A component requested an update while rendering in this generation.
    requested_during_render: bool,
}

impl<H: Host> Reconciler<H> {
    pub fn new(host: H, container: H::Node, config: ReconcilerConfig) -> Self {
        Self {
            host,
            container,
            config,
            arena: FiberArena::new(),
            current_root: None,
            wip_root: None,
            next_unit: None,
            deletions: Vec::new(),
            wip_fibers: Vec::new(),
            requested_children: None,
            signal: Rc::new(UpdateSignal::default()),
            generation: Generation::INITIAL,
            restarts: 0,
            requested_during_render: false,
        }
    }

    /// Starts a generation rendering `element` into the container, diffed
    /// against the committed tree if there is one.
    ///
    /// A pending update request is absorbed: the new generation re-reads the
    /// committed hook cells, so queued state transforms still apply.
    pub fn render(&mut self, element: Element) -> Result<(), RenderError> {
        if self.wip_root.is_some() {
            return Err(RenderError::GenerationInFlight);
        }
        self.signal.take();
        let children = vec![element];
        self.requested_children = Some(children.clone());
        self.begin_generation(children);
        Ok(())
    }

    /// Processes units of work until the deadline says to yield or the
    /// generation is complete, committing in the latter case.
    ///
    /// At least one unit is performed when work is pending, so a slice always
    /// makes progress. Any error discards the in-flight generation. Update
    /// requests that arrived from outside the aborted pass stay pending.
    pub fn work_loop(&mut self, deadline: &dyn Deadline) -> Result<SliceReport, RenderError> {
        let result = self.run_slice(deadline);
        if let Err(err) = &result {
            log::error!(target: "reconciler.work_loop", "render pass aborted: {err}");
            self.abandon_generation();
            if matches!(err, RenderError::UpdateLoop { .. }) {
                self.signal.take();
            }
            self.requested_children = None;
            self.restarts = 0;
        }
        result
    }

    /// Renders and commits everything pending without yielding.
    pub fn flush_sync(&mut self) -> Result<SliceReport, RenderError> {
        self.work_loop(&NoDeadline)
    }

    pub fn has_pending_work(&self) -> bool {
        self.next_unit.is_some() || self.wip_root.is_some() || self.signal.is_pending()
    }

    pub fn is_idle(&self) -> bool {
        !self.has_pending_work()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Total update requests made by setters created by this reconciler.
    pub fn update_requests(&self) -> u64 {
        self.signal.requests()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn container(&self) -> &H::Node {
        &self.container
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Live fibers across both generations.
    pub fn fiber_count(&self) -> usize {
        self.arena.len()
    }

    /// Shape of the committed fiber tree below the synthetic root.
    pub fn current_shape(&self) -> Vec<FiberShape> {
        match self.current_root {
            Some(root) => self
                .arena
                .children(root)
                .into_iter()
                .map(|child| FiberShape::of_fiber(&self.arena, child))
                .collect(),
            None => Vec::new(),
        }
    }

    fn run_slice(&mut self, deadline: &dyn Deadline) -> Result<SliceReport, RenderError> {
        let mut report = SliceReport::default();
        self.poll_updates()?;
        let threshold = self.config.yield_threshold();
        while let Some(unit) = self.next_unit {
            self.next_unit = self.perform_unit_of_work(unit, &mut report.element_errors);
            report.units += 1;
            self.poll_updates()?;
            if deadline.time_remaining() < threshold {
                log::trace!(
                    target: "reconciler.work_loop",
                    "yielding after {} units; pending={}",
                    report.units,
                    self.next_unit.is_some()
                );
                break;
            }
        }
        if self.next_unit.is_none() && self.wip_root.is_some() {
            report.committed = Some(self.commit_root()?);
            self.requested_children = None;
            self.restarts = 0;
        }
        Ok(report)
    }

    fn poll_updates(&mut self) -> Result<(), RenderError> {
        if !self.signal.take() {
            return Ok(());
        }
        if self.wip_root.is_some() {
            if self.requested_during_render {
                self.restarts = self.restarts.saturating_add(1);
                if self.restarts > self.config.max_uncommitted_restarts {
                    return Err(RenderError::UpdateLoop {
                        restarts: self.restarts,
                    });
                }
            } else {
                self.restarts = 0;
            }
            log::debug!(
                target: "reconciler.work_loop",
                "update request restarts in-flight generation (render-time restarts {})",
                self.restarts
            );
            self.abandon_generation();
        }
        let children = match (&self.requested_children, self.current_root) {
            (Some(children), _) => children.clone(),
            (None, Some(root)) => self.arena[root].pending_children.clone(),
            (None, None) => {
                log::debug!(target: "reconciler.work_loop", "update request before first render; ignored");
                return Ok(());
            }
        };
        self.begin_generation(children);
        Ok(())
    }

    fn begin_generation(&mut self, children: Vec<Element>) {
        // Bookkeeping left on the committed tree by an abandoned pass is stale.
        if let Some(current) = self.current_root {
            for id in self.arena.subtree(current) {
                let fiber = &mut self.arena[id];
                fiber.effect = Effect::None;
                fiber.alternate = None;
            }
        }
        let root = self.arena.insert(Fiber::root(
            self.container.clone(),
            children,
            self.current_root,
        ));
        if let Some(current) = self.current_root {
            self.arena[current].alternate = Some(root);
        }
        self.wip_root = Some(root);
        self.next_unit = Some(root);
        self.deletions.clear();
        self.wip_fibers.clear();
        self.wip_fibers.push(root);
        self.requested_during_render = false;
        log::trace!(target: "reconciler.work_loop", "generation started at {root:?}");
    }

    fn abandon_generation(&mut self) {
        for id in self.wip_fibers.drain(..) {
            self.arena.remove(id);
        }
        self.wip_root = None;
        self.next_unit = None;
        self.deletions.clear();
    }

    pub(crate) fn alloc(&mut self, fiber: Fiber<H::Node>) -> FiberId {
        let id = self.arena.insert(fiber);
        self.wip_fibers.push(id);
        id
    }

    fn perform_unit_of_work(
        &mut self,
        unit: FiberId,
        errors: &mut Vec<ElementError>,
    ) -> Option<FiberId> {
        let tag = self.arena[unit].tag.clone();
        log::trace!(target: "reconciler.work_loop", "unit {unit:?} {}", tag.label());
        match tag {
            FiberTag::Root => {
                let children = self.arena[unit].pending_children.clone();
                self.reconcile_children(unit, &children, errors);
            }
            FiberTag::Host(name) => {
                if self.arena[unit].host_node.is_none() {
                    let node = self.host.create_node(&name);
                    self.arena[unit].host_node = Some(node);
                }
                let children = self.arena[unit].pending_children.clone();
                self.reconcile_children(unit, &children, errors);
            }
            FiberTag::Text => {
                if self.arena[unit].host_node.is_none() {
                    let node = self.host.create_text_node();
                    self.arena[unit].host_node = Some(node);
                }
            }
            FiberTag::Component(component) => {
                let previous = self
                    .arena[unit]
                    .alternate
                    .and_then(|alt| self.arena.get(alt))
                    .map(|alt| alt.hooks.clone())
                    .unwrap_or_default();
                let mut current = Vec::with_capacity(previous.len());
                let props = self.arena[unit].props.clone();
                let requests = self.signal.requests();
                let rendered = {
                    let mut hooks =
                        Hooks::new(&previous, &mut current, &self.signal, component.name());
                    component.invoke(&mut hooks, &props)
                };
                if self.signal.requests() != requests {
                    log::warn!(
                        target: "reconciler.work_loop",
                        "{} requested an update while rendering",
                        component.name()
                    );
                    self.requested_during_render = true;
                }
                let fiber = &mut self.arena[unit];
                fiber.hooks = current;
                fiber.pending_children = vec![rendered];
                let children = fiber.pending_children.clone();
                self.reconcile_children(unit, &children, errors);
            }
        }
        self.next_fiber(unit)
    }

    /// Depth-first successor: the first child, else the sibling of the
    /// nearest ancestor (or self) that has one.
    fn next_fiber(&self, unit: FiberId) -> Option<FiberId> {
        if let Some(child) = self.arena[unit].child {
            return Some(child);
        }
        let mut cursor = Some(unit);
        while let Some(id) = cursor {
            let fiber = &self.arena[id];
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            cursor = fiber.parent;
        }
        None
    }
}
