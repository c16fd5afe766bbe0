//! Tracing capture for asserting on emitted logs.
//!
//! Installs a thread-local subscriber, so pair it with current-thread
//! `#[tokio::test]`s: events from other threads are not seen.
#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// One recorded event.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// True if `needle` is in the message or any field value.
    fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle) || self.fields.iter().any(|(_, v)| v.contains(needle))
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Events = Arc<Mutex<Vec<CapturedEvent>>>;

/// Records every event while alive.
pub struct TestLogCapture {
    events: Events,
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestLogCapture {
    pub fn start() -> Self {
        let events = Events::default();
        let subscriber = tracing_subscriber::registry().with(Recorder {
            events: Arc::clone(&events),
        });
        Self {
            events,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.events.lock().unwrap()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().clone()
    }

    /// Number of events whose message contains `needle`.
    pub fn count(&self, needle: &str) -> usize {
        self.lock()
            .iter()
            .filter(|e| e.message.contains(needle))
            .count()
    }

    /// Events at `level` whose message contains `needle`.
    pub fn find(&self, level: Level, needle: &str) -> Vec<CapturedEvent> {
        self.lock()
            .iter()
            .filter(|e| e.level == level && e.message.contains(needle))
            .cloned()
            .collect()
    }

    pub fn assert_logged_at(&self, level: Level, needle: &str) {
        let found = self.find(level, needle);
        assert!(
            !found.is_empty(),
            "no {level} event containing {needle:?}; got: {:#?}",
            self.messages()
        );
    }

    pub fn assert_no_errors(&self) {
        let errors: Vec<_> = self
            .lock()
            .iter()
            .filter(|e| e.level == Level::ERROR)
            .cloned()
            .collect();
        assert!(errors.is_empty(), "unexpected error events: {errors:#?}");
    }

    /// `needle` appears in no message and no field value.
    pub fn assert_never_logged(&self, needle: &str) {
        let leaked: Vec<_> = self
            .lock()
            .iter()
            .filter(|e| e.mentions(needle))
            .cloned()
            .collect();
        assert!(leaked.is_empty(), "{needle:?} found in logs: {leaked:#?}");
    }

    fn messages(&self) -> Vec<String> {
        self.lock()
            .iter()
            .map(|e| format!("{} {}", e.level, e.message))
            .collect()
    }
}

struct Recorder {
    events: Events,
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let metadata = event.metadata();
        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *metadata.level(),
                target: metadata.target().to_string(),
                message: fields.message,
                fields: fields.rest,
            });
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    rest: Vec<(String, String)>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.rest.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }
}
