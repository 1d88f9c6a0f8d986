use reconciler::Deadline;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Wall-clock budget measured from when the slice started.
#[derive(Clone, Copy, Debug)]
pub struct FrameDeadline {
    started: Instant,
    budget: Duration,
}

impl FrameDeadline {
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }
}

impl Deadline for FrameDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }
}

/// Fixed remaining time, for deterministic tests.
#[derive(Clone, Copy, Debug)]
pub struct ManualDeadline(pub Duration);

impl Deadline for ManualDeadline {
    fn time_remaining(&self) -> Duration {
        self.0
    }
}

/// Runs out after a fixed number of queries.
///
/// The work loop queries the deadline once after every unit of work, so
/// `StepDeadline::new(n)` lets a slice perform exactly `n` units (at least
/// one).
#[derive(Debug)]
pub struct StepDeadline {
    limit: usize,
    queries: Cell<usize>,
}

impl StepDeadline {
    pub fn new(units: usize) -> Self {
        Self {
            limit: units,
            queries: Cell::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.get()
    }
}

impl Deadline for StepDeadline {
    fn time_remaining(&self) -> Duration {
        let queries = self.queries.get() + 1;
        self.queries.set(queries);
        if queries >= self.limit {
            Duration::ZERO
        } else {
            Duration::MAX
        }
    }
}
