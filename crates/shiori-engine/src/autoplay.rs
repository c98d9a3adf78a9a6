use std::time::{Duration, Instant};

/// Drift-corrected autoplay timer.
///
/// The host polls [`AutoPlay::is_due`] and, when due, asks the engine to
/// advance. Each firing schedules the next one relative to when it was
/// expected, not when it actually ran, so slow frames do not accumulate.
#[derive(Debug, Clone)]
pub struct AutoPlay {
    interval: Duration,
    expected: Option<Instant>,
}

impl AutoPlay {
    /// A stopped timer firing every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            expected: None,
        }
    }

    /// Time between steps.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the step interval. Takes effect from the next reschedule.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Arm the timer; the first firing is one interval from `now`.
    pub fn start(&mut self, now: Instant) {
        self.expected = Some(now + self.interval);
    }

    /// Disarm the timer.
    pub fn stop(&mut self) {
        self.expected = None;
    }

    /// Whether the timer is armed.
    pub fn is_active(&self) -> bool {
        self.expected.is_some()
    }

    /// Whether the armed timer should fire at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.expected.is_some_and(|expected| now >= expected)
    }

    /// Time left until the next firing, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.expected
            .map(|expected| expected.saturating_duration_since(now))
    }

    /// Record a firing at `now` and return the delay until the next one:
    /// `interval - drift`, never negative.
    ///
    /// If the timer fell more than a whole interval behind it restarts from
    /// `now` instead of firing repeatedly to catch up.
    pub fn reschedule(&mut self, now: Instant) -> Duration {
        let Some(expected) = self.expected else {
            return self.interval;
        };
        let drift = now.saturating_duration_since(expected);
        if drift > self.interval {
            self.expected = Some(now + self.interval);
            return self.interval;
        }
        self.expected = Some(expected + self.interval);
        self.interval.saturating_sub(drift)
    }

    /// Push the next firing one interval past `now` without counting drift.
    pub fn postpone(&mut self, now: Instant) {
        if self.expected.is_some() {
            self.expected = Some(now + self.interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn inactive_until_started() {
        let now = Instant::now();
        let auto = AutoPlay::new(SECOND);
        assert!(!auto.is_active());
        assert!(!auto.is_due(now + SECOND * 10));
        assert_eq!(auto.remaining(now), None);
    }

    #[test]
    fn due_after_interval() {
        let now = Instant::now();
        let mut auto = AutoPlay::new(SECOND);
        auto.start(now);
        assert!(!auto.is_due(now));
        assert!(auto.is_due(now + SECOND));
        assert_eq!(auto.remaining(now), Some(SECOND));
    }

    #[test]
    fn reschedule_subtracts_drift() {
        let now = Instant::now();
        let mut auto = AutoPlay::new(SECOND);
        auto.start(now);

        let late = now + SECOND + Duration::from_millis(200);
        let delay = auto.reschedule(late);
        assert_eq!(delay, Duration::from_millis(800));
        assert!(auto.is_due(now + SECOND * 2));
        assert!(!auto.is_due(now + SECOND * 2 - Duration::from_millis(1)));
    }

    #[test]
    fn reschedule_restarts_when_far_behind() {
        let now = Instant::now();
        let mut auto = AutoPlay::new(SECOND);
        auto.start(now);

        let very_late = now + SECOND * 5;
        assert_eq!(auto.reschedule(very_late), SECOND);
        assert!(!auto.is_due(very_late));
        assert!(auto.is_due(very_late + SECOND));
    }

    #[test]
    fn postpone_keeps_timer_armed() {
        let now = Instant::now();
        let mut auto = AutoPlay::new(SECOND);
        auto.start(now);
        auto.postpone(now + SECOND);
        assert!(auto.is_active());
        assert!(!auto.is_due(now + SECOND));
        assert!(auto.is_due(now + SECOND * 2));

        auto.stop();
        auto.postpone(now);
        assert!(!auto.is_active());
    }
}
