//! Hooks into the retry loop

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Notified of every attempt the executor makes
///
/// A failed attempt is always reported before the executor sleeps.
pub trait RetryObserver: Send + Sync {
    /// `attempt` is 1-based
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// The attempt failed and another follows after `delay`
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration);

    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// The last permitted attempt failed
    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display, _delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Display) {}
}

/// Logs each failed attempt as a warning naming the operation
///
/// Exhaustion is logged at error level; a success that needed retries at
/// debug level.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        warn!(
            "{} failed (attempt {}), retrying in {}s: {}",
            self.operation,
            attempt,
            delay.as_secs_f32(),
            error
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            debug!(
                "{} succeeded on attempt {} after {:.1}s",
                self.operation,
                attempt,
                total_duration.as_secs_f32()
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        error!(
            "{} gave up after {} attempts: {}",
            self.operation, attempts, final_error
        );
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Display) {
        (**self).on_exhausted(attempts, final_error)
    }
}

/// Counts events and records announced delays
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct StatsObserver {
    events: std::sync::Mutex<Vec<Event>>,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Start,
    Failed(Duration),
    Success,
    Exhausted,
}

#[cfg(test)]
impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self, wanted: fn(&Event) -> bool) -> u32 {
        self.events.lock().unwrap().iter().filter(|e| wanted(e)).count() as u32
    }

    pub fn attempt_starts(&self) -> u32 {
        self.count(|e| *e == Event::Start)
    }

    /// Failures that were followed by a retry
    pub fn failures(&self) -> u32 {
        self.count(|e| matches!(e, Event::Failed(_)))
    }

    pub fn successes(&self) -> u32 {
        self.count(|e| *e == Event::Success)
    }

    pub fn exhaustions(&self) -> u32 {
        self.count(|e| *e == Event::Exhausted)
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                Event::Failed(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.push(Event::Start);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display, delay: Duration) {
        self.push(Event::Failed(delay));
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.push(Event::Success);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Display) {
        self.push(Event::Exhausted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_observer_counts() {
        let observer = StatsObserver::new();

        observer.on_attempt_start(1, 3);
        observer.on_attempt_failed(1, &"boom", Duration::from_millis(100));
        observer.on_attempt_start(2, 3);
        observer.on_success(2, Duration::from_millis(150));

        assert_eq!(observer.attempt_starts(), 2);
        assert_eq!(observer.failures(), 1);
        assert_eq!(observer.successes(), 1);
        assert_eq!(observer.exhaustions(), 0);
        assert_eq!(observer.delays(), vec![Duration::from_millis(100)]);
    }

    #[test]
    fn test_tracing_observer_names_operation() {
        assert_eq!(TracingObserver::new("helm init").operation(), "helm init");
    }
}
