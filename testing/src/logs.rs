//! In-memory capture of `tracing` events for assertions.
//!
//! The capture is installed as the thread's default subscriber, which also
//! covers tasks spawned on a current-thread runtime such as the one
//! `#[tokio::test]` builds.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{
    field::{Field, Visit},
    subscriber::DefaultGuard,
    Event, Level, Subscriber,
};
use tracing_subscriber::{
    layer::{Context, SubscriberExt},
    Layer,
};

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// The event's message.
    pub message: String,
    /// Other fields, rendered with their `Debug`/`Display` form.
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Rendered value of `name`, if the event carried it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Shared buffer of captured events.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Snapshot of every event so far.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events at `level` whose message is `message`.
    #[must_use]
    pub fn count(&self, level: Level, message: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.level == level && event.message == message)
            .count()
    }

    /// Whether any event at `level` has the message `message`.
    #[must_use]
    pub fn contains(&self, level: Level, message: &str) -> bool {
        self.count(level, message) > 0
    }

    fn push(&self, event: CapturedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut captured = CapturedEvent {
            level: *event.metadata().level(),
            message: String::new(),
            fields: Vec::new(),
        };
        event.record(&mut FieldVisitor(&mut captured));
        self.logs.push(captured);
    }
}

struct FieldVisitor<'a>(&'a mut CapturedEvent);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.message = format!("{value:?}");
        } else {
            self.0
                .fields
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }
}

/// Capture every event on this thread until the guard is dropped.
///
/// # Example
///
/// ```
/// use redis_session_testing::logs::capture_logs;
/// use tracing::Level;
///
/// let (logs, _guard) = capture_logs();
/// tracing::warn!(session_id = "abc", "Something odd");
///
/// assert!(logs.contains(Level::WARN, "Something odd"));
/// ```
#[must_use]
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer { logs: logs.clone() });
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_level_message_and_fields() {
        let (logs, guard) = capture_logs();
        tracing::error!(session_id = %"abc", attempts = 2, "Failed to save session");
        drop(guard);
        tracing::error!("After the guard");

        let events = logs.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::ERROR);
        assert_eq!(events[0].message, "Failed to save session");
        assert_eq!(events[0].field("session_id"), Some("abc"));
        assert_eq!(events[0].field("attempts"), Some("2"));
    }
}
