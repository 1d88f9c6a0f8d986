//! Per-fiber state cells for function components.
//!
//! Each `use_state` call site owns the cell at its call-order index. A cell
//! survives across generations by being re-read from the committed fiber's
//! cell at the same index: the stored state has every queued transform
//! replayed over it, in enqueue order, and the result seeds a fresh cell on
//! the work-in-progress fiber.
//!
//! Calling a setter while the component that created it is rendering
//! requests a new pass that re-renders that same component, which calls the
//! setter again. The reconciler does not prevent this; it stops the loop once
//! `ReconcilerConfig::max_uncommitted_restarts` is exceeded.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

pub(crate) type HookCellRef = Rc<RefCell<HookCell>>;

pub(crate) struct HookCell {
    state: Box<dyn Any>,
    /// Each entry is an `Rc<dyn Fn(T) -> T>` for the cell's `T`.
    queue: Vec<Box<dyn Any>>,
}

impl HookCell {
    fn new<T: 'static>(state: T) -> Self {
        Self {
            state: Box::new(state),
            queue: Vec::new(),
        }
    }

    /// Stored state with the queue replayed over it. `None` if the cell was
    /// created for a different type.
    fn resolve<T: Clone + 'static>(&self) -> Option<T> {
        let mut state = self.state.downcast_ref::<T>()?.clone();
        for update in &self.queue {
            let update = update.downcast_ref::<Rc<dyn Fn(T) -> T>>()?;
            state = update(state);
        }
        Some(state)
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }
}

/// Set by setters, drained by the work loop.
#[derive(Debug, Default)]
pub(crate) struct UpdateSignal {
    pending: Cell<bool>,
    requests: Cell<u64>,
}

impl UpdateSignal {
    fn request(&self) {
        self.pending.set(true);
        self.requests.set(self.requests.get().saturating_add(1));
    }

    pub(crate) fn take(&self) -> bool {
        self.pending.replace(false)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub(crate) fn requests(&self) -> u64 {
        self.requests.get()
    }
}

/// Hook access for one component invocation. The call-order index starts at
/// zero for every invocation.
pub struct Hooks<'a> {
    previous: &'a [HookCellRef],
    current: &'a mut Vec<HookCellRef>,
    index: usize,
    signal: &'a Rc<UpdateSignal>,
    component: &'static str,
}

impl<'a> Hooks<'a> {
    pub(crate) fn new(
        previous: &'a [HookCellRef],
        current: &'a mut Vec<HookCellRef>,
        signal: &'a Rc<UpdateSignal>,
        component: &'static str,
    ) -> Self {
        Self {
            previous,
            current,
            index: 0,
            signal,
            component,
        }
    }

    /// Returns the state for this call site and a setter bound to it.
    ///
    /// `initial` is used when the component has no committed counterpart, or
    /// when the committed cell at this index holds a different type (hooks
    /// called in a different order than last render).
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, SetState<T>) {
        let resolved = match self.previous.get(self.index) {
            Some(previous) => {
                let resolved = previous.borrow().resolve::<T>();
                match resolved {
                    Some(state) => state,
                    None => {
                        log::warn!(
                            target: "reconciler.hooks",
                            "{}: hook {} changed type between renders; using initial state",
                            self.component,
                            self.index
                        );
                        initial
                    }
                }
            }
            None => initial,
        };
        let cell = Rc::new(RefCell::new(HookCell::new(resolved.clone())));
        self.current.push(Rc::clone(&cell));
        self.index += 1;
        let setter = SetState {
            cell,
            signal: Rc::downgrade(self.signal),
            _marker: PhantomData,
        };
        (resolved, setter)
    }
}

/// Queues state transforms for one hook cell.
pub struct SetState<T> {
    cell: HookCellRef,
    signal: Weak<UpdateSignal>,
    _marker: PhantomData<fn(T) -> T>,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            signal: Weak::clone(&self.signal),
            _marker: PhantomData,
        }
    }
}

impl<T: 'static> SetState<T> {
    /// Queues `update` and requests a new render pass rooted at the last
    /// committed tree. Transforms queued before the next pass compose in call
    /// order.
    pub fn update(&self, update: impl Fn(T) -> T + 'static) {
        let update: Rc<dyn Fn(T) -> T> = Rc::new(update);
        self.cell.borrow_mut().queue.push(Box::new(update));
        match self.signal.upgrade() {
            Some(signal) => signal.request(),
            None => log::debug!(
                target: "reconciler.hooks",
                "state update after the reconciler was dropped; ignored"
            ),
        }
    }

    pub fn set(&self, value: T)
    where
        T: Clone,
    {
        self.update(move |_| value.clone());
    }
}
