pub type SliceId = u64;

/// Handle of a node owned by the in-memory host tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Reserved sentinel; never handed out by a host.
    pub const INVALID: NodeId = NodeId(0);
}

/// Monotonic commit counter. Each successful commit advances it by one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_advances_monotonically() {
        let g = Generation::INITIAL;
        assert_eq!(g.next(), Generation(1));
        assert!(g.next().next() > g.next());
        assert_eq!(Generation(u64::MAX).next(), Generation(u64::MAX));
    }
}
