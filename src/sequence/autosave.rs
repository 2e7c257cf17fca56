//! Interval-based auto-save, polled from the UI loop.

use std::time::{Duration, Instant};

use crate::config::AutoSaveConfig;

pub struct AutoSaveTimer {
    enabled: bool,
    interval: Duration,
    last_attempt: Instant,
    /// Message of the most recent failed attempt
    last_error: Option<String>,
}

impl AutoSaveTimer {
    pub fn new(config: &AutoSaveConfig) -> Self {
        Self::with_interval(config.enabled, Duration::from_secs(config.interval_secs))
    }

    pub fn with_interval(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            last_attempt: Instant::now(),
            last_error: None,
        }
    }

    /// Time for an attempt: enabled, interval elapsed, unsaved edits, and
    /// no save already running
    pub fn should_save(&self, is_modified: bool, save_pending: bool) -> bool {
        self.enabled && is_modified && !save_pending && self.last_attempt.elapsed() >= self.interval
    }

    /// Record the outcome of an attempt and restart the interval.
    ///
    /// Failures do not stop the timer.
    pub fn record_attempt(&mut self, error: Option<String>) {
        self.last_attempt = Instant::now();
        self.last_error = error;
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn time_until_next(&self) -> Duration {
        self.interval.saturating_sub(self.last_attempt.elapsed())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.last_attempt = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_for_modification() {
        let timer = AutoSaveTimer::with_interval(true, Duration::ZERO);
        assert!(!timer.should_save(false, false));
        assert!(timer.should_save(true, false));
    }

    #[test]
    fn test_skips_while_pending() {
        let timer = AutoSaveTimer::with_interval(true, Duration::ZERO);
        assert!(!timer.should_save(true, true));
    }

    #[test]
    fn test_respects_interval() {
        let timer = AutoSaveTimer::with_interval(true, Duration::from_secs(3600));
        assert!(!timer.should_save(true, false));
        assert!(timer.time_until_next() > Duration::from_secs(3500));
    }

    #[test]
    fn test_disabled_never_fires() {
        let timer = AutoSaveTimer::with_interval(false, Duration::ZERO);
        assert!(!timer.should_save(true, false));
    }

    #[test]
    fn test_failure_keeps_timer_running() {
        let mut timer = AutoSaveTimer::with_interval(true, Duration::ZERO);
        timer.record_attempt(Some("HTTP 500".to_string()));
        assert_eq!(timer.last_error(), Some("HTTP 500"));
        assert!(timer.should_save(true, false));

        timer.record_attempt(None);
        assert_eq!(timer.last_error(), None);
    }
}
