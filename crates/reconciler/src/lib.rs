//! Fiber-based incremental reconciler.
//!
//! A render pass walks a work-in-progress fiber tree one unit at a time,
//! diffing each fiber's new children against the committed tree by position
//! and type, and tags every fiber with an [`Effect`]. Work can be suspended
//! between units whenever the host-provided [`Deadline`] runs short. Once the
//! pass has no units left, the commit phase applies every effect to the
//! [`Host`] in a single uninterrupted pass and promotes the work-in-progress
//! tree to current.
//!
//! Function components keep per-instance state through [`Hooks::use_state`];
//! update requests are queued on the hook cell and schedule a fresh pass
//! rooted at the last committed tree.

mod commit;
pub mod config;
pub mod debug;
pub mod element;
pub mod error;
mod fiber;
pub mod hooks;
pub mod host;
mod reconcile;
pub mod runtime;
mod work_loop;

pub use crate::commit::{CommitReport, EffectRecord};
pub use crate::config::ReconcilerConfig;
pub use crate::debug::FiberShape;
pub use crate::element::{
    Child, Component, Element, ElementType, Event, EventHandler, PropValue, Props, TEXT_VALUE,
    create_element,
};
pub use crate::error::{ElementError, RenderError};
pub use crate::fiber::{Effect, FiberId};
pub use crate::hooks::{Hooks, SetState};
pub use crate::host::{Deadline, Host, IdleCallback, IdleScheduler, NoDeadline, event_name, is_event};
pub use crate::runtime::{Runtime, drive};
pub use crate::work_loop::{Reconciler, SliceReport};
