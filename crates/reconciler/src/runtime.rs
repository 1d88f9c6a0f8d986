//! Binds a reconciler to a host scheduling primitive.
//!
//! Every granted slice runs one `work_loop` and then requests the next
//! slice, so the loop never terminates on its own. Errors cannot propagate
//! out of a host callback; the most recent one is kept until taken.

use crate::error::RenderError;
use crate::host::{Deadline, Host, IdleScheduler};
use crate::work_loop::Reconciler;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct Runtime<H: Host> {
    reconciler: Rc<RefCell<Reconciler<H>>>,
    last_error: Rc<RefCell<Option<RenderError>>>,
    commits: Rc<Cell<u64>>,
}

impl<H: Host> Clone for Runtime<H> {
    fn clone(&self) -> Self {
        Self {
            reconciler: Rc::clone(&self.reconciler),
            last_error: Rc::clone(&self.last_error),
            commits: Rc::clone(&self.commits),
        }
    }
}

impl<H: Host> Runtime<H> {
    pub fn reconciler(&self) -> &Rc<RefCell<Reconciler<H>>> {
        &self.reconciler
    }

    pub fn take_error(&self) -> Option<RenderError> {
        self.last_error.borrow_mut().take()
    }

    /// Commits performed by slices this runtime ran.
    pub fn commits(&self) -> u64 {
        self.commits.get()
    }

    pub fn is_idle(&self) -> bool {
        self.reconciler.borrow().is_idle()
    }

    fn run(&self, deadline: &dyn Deadline) {
        let result = self.reconciler.borrow_mut().work_loop(deadline);
        match result {
            Ok(report) => {
                if report.committed.is_some() {
                    self.commits.set(self.commits.get() + 1);
                }
            }
            Err(err) => {
                *self.last_error.borrow_mut() = Some(err);
            }
        }
    }
}

/// Arms `reconciler` on `scheduler`; from then on each slice the scheduler
/// grants runs the work loop once and re-arms.
pub fn drive<H, S>(reconciler: Rc<RefCell<Reconciler<H>>>, scheduler: Rc<S>) -> Runtime<H>
where
    H: Host + 'static,
    S: IdleScheduler + 'static,
{
    let runtime = Runtime {
        reconciler,
        last_error: Rc::new(RefCell::new(None)),
        commits: Rc::new(Cell::new(0)),
    };
    arm(runtime.clone(), scheduler);
    runtime
}

fn arm<H, S>(runtime: Runtime<H>, scheduler: Rc<S>)
where
    H: Host + 'static,
    S: IdleScheduler + 'static,
{
    let next = Rc::clone(&scheduler);
    scheduler.schedule_work(Box::new(move |deadline: &dyn Deadline| {
        runtime.run(deadline);
        arm(runtime, next);
    }));
}
