//! Frame-paced scheduling for driving a reconciler without a real event loop.
//!
//! [`IdleLoop`] is a single-threaded stand-in for a host's idle-callback
//! primitive: callbacks queue up and are granted one slice each, with a
//! deadline derived from the frame budget. Callbacks scheduled while a slice
//! runs wait for the next one.

mod deadline;

pub use crate::deadline::{FrameDeadline, ManualDeadline, StepDeadline};

use core_types::SliceId;
use reconciler::{Deadline, IdleCallback, IdleScheduler};
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FrameConfig {
    /// Length of one frame; each `run_frame` grants a slice of this budget.
    pub frame_budget_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_budget_ms: 16, // ~60Hz
        }
    }
}

impl FrameConfig {
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }
}

#[derive(Default)]
pub struct IdleLoop {
    queue: RefCell<VecDeque<IdleCallback>>,
    config: FrameConfig,
    slices: Cell<SliceId>,
}

impl IdleLoop {
    pub fn new(config: FrameConfig) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            config,
            slices: Cell::new(0),
        }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Callbacks waiting for a slice.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Slices granted so far.
    pub fn slices(&self) -> SliceId {
        self.slices.get()
    }

    /// Grants one slice to every callback queued before this call, in FIFO
    /// order, all sharing `deadline`. Returns false if nothing was queued.
    pub fn run_slice(&self, deadline: &dyn Deadline) -> bool {
        let batch = self.queue.borrow().len();
        if batch == 0 {
            return false;
        }
        let slice = self.slices.get() + 1;
        self.slices.set(slice);
        log::trace!(target: "platform.idle", "slice {slice}: {batch} callbacks");
        for _ in 0..batch {
            let next = self.queue.borrow_mut().pop_front();
            let Some(callback) = next else {
                break;
            };
            callback(deadline);
        }
        true
    }

    /// Runs one slice bounded by the configured frame budget.
    pub fn run_frame(&self) -> bool {
        let deadline = FrameDeadline::start(self.config.frame_budget());
        self.run_slice(&deadline)
    }
}

impl IdleScheduler for IdleLoop {
    fn schedule_work(&self, callback: IdleCallback) {
        self.queue.borrow_mut().push_back(callback);
    }
}
