use dk_core::SimTime;

/// Tracks simulated time and the number of steps taken.
///
/// Time only moves forward: it jumps to the action time of each actor the
/// orchestrator pops.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now: SimTime,
    steps: u64,
}

impl SimClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `time` and count one step. Returns the time elapsed since
    /// the previous step; a time earlier than now leaves the clock where it
    /// is.
    pub fn advance_to(&mut self, time: SimTime) -> u64 {
        let elapsed = time.since(self.now);
        if time > self.now {
            self.now = time;
        }
        self.steps += 1;
        elapsed
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new();
        assert_eq!(clock.now(), SimTime::ZERO);
        assert_eq!(clock.steps(), 0);
    }

    #[test]
    fn advance_reports_elapsed() {
        let mut clock = SimClock::new();
        assert_eq!(clock.advance_to(SimTime(3)), 3);
        assert_eq!(clock.advance_to(SimTime(3)), 0);
        assert_eq!(clock.advance_to(SimTime(10)), 7);
        assert_eq!(clock.now(), SimTime(10));
        assert_eq!(clock.steps(), 3);
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = SimClock::new();
        clock.advance_to(SimTime(8));
        assert_eq!(clock.advance_to(SimTime(2)), 0);
        assert_eq!(clock.now(), SimTime(8));
    }
}
