use serde::{Deserialize, Serialize};

/// Configuration for an orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Simulated time between two runs of the faction controls. 0 runs them
    /// after every step.
    pub control_interval: u64,
    /// Re-queue actors whose decision made no reschedule request, after their
    /// action delay. Off means such actors never act again.
    pub auto_reschedule: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_events: 0,
            control_interval: 10,
            auto_reschedule: false,
        }
    }
}

impl SimConfig {
    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set how often faction controls run.
    pub fn with_control_interval(mut self, interval: u64) -> Self {
        self.control_interval = interval;
        self
    }

    /// Enable or disable automatic rescheduling.
    pub fn with_auto_reschedule(mut self, enabled: bool) -> Self {
        self.auto_reschedule = enabled;
        self
    }
}
