use serde::Deserialize;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Yield to the host once less than this many microseconds remain in the
    /// current slice.
    pub yield_threshold_us: u64,
    /// Upper bound on consecutive restarts caused by updates requested while
    /// a component was rendering. Exceeding it aborts the generation with
    /// `RenderError::UpdateLoop`. Restarts from host events are not counted.
    pub max_uncommitted_restarts: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            yield_threshold_us: 1_000,
            max_uncommitted_restarts: 64,
        }
    }
}

impl ReconcilerConfig {
    pub fn yield_threshold(&self) -> Duration {
        Duration::from_micros(self.yield_threshold_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_idle_callback_budget() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.yield_threshold(), Duration::from_millis(1));
        assert_eq!(config.max_uncommitted_restarts, 64);
    }
}
