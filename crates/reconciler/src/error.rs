use crate::fiber::FiberId;
use std::sync::Arc;
use thiserror::Error;

/// Fatal for the in-flight generation. The generation is discarded without
/// committing; the host keeps showing the last committed tree.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("fiber {fiber:?} has no ancestor owning a host node")]
    MissingHostParent { fiber: FiberId },
    #[error("a render pass is already in flight; wait for it to commit")]
    GenerationInFlight,
    #[error("{restarts} render passes restarted by update requests without committing")]
    UpdateLoop { restarts: u32 },
}

/// Reported per element; siblings keep reconciling.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ElementError {
    #[error("invalid element type {tag:?}: {reason}")]
    InvalidElementType { tag: Arc<str>, reason: &'static str },
}
