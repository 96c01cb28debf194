//! # Lifecycle events
//!
//! A small in-process hub. Producers call [`EventPublisher::publish`], which never
//! fails and never blocks on listeners; listeners registered by topic pattern are
//! awaited on a spawned task and their errors are only logged.
//!
//! Patterns:
//! - `"asset.created"` exact topic
//! - `"asset.*"` every topic under a prefix
//! - `"*"` everything

use std::future::Future;
use std::pin::Pin;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static LISTENER_ID: AtomicU64 = AtomicU64::new(1);

fn next_listener_id() -> ListenerId {
    ListenerId(LISTENER_ID.fetch_add(1, Ordering::Relaxed))
}

/// What listeners receive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub topic: String,
    pub payload: Value,
    pub emitted_at: DateTime<Utc>,
}

impl LifecycleEvent {
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }
}

pub type EventFut = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// Listener signature (async).
pub type EventListener = Arc<dyn Fn(Arc<LifecycleEvent>) -> EventFut + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicPattern {
    Any,
    Prefix(String),
    Exact(String),
}

impl TopicPattern {
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern == "*" {
            TopicPattern::Any
        } else if let Some(prefix) = pattern.strip_suffix(".*") {
            TopicPattern::Prefix(format!("{prefix}."))
        } else {
            TopicPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, topic: &str) -> bool {
        match self {
            TopicPattern::Any => true,
            TopicPattern::Prefix(p) => topic.starts_with(p.as_str()),
            TopicPattern::Exact(t) => t == topic,
        }
    }
}

/// Fire-and-forget notification seam used by the services.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, payload: Value);
}

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    pattern: TopicPattern,
    listener: EventListener,
    once: bool,
}

/// Emission never holds the lock across `.await`:
/// 1) snapshot matching listeners and drop `once` entries (sync, write-lock)
/// 2) await listeners (no lock held)
#[derive(Default)]
pub struct EventHub {
    listeners: RwLock<Vec<ListenerEntry>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F, Fut>(&self, pattern: &str, listener: F) -> ListenerId
    where
        F: Fn(Arc<LifecycleEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.register(pattern, listener, false)
    }

    /// Feathers-ish: once(...)
    pub fn once<F, Fut>(&self, pattern: &str, listener: F) -> ListenerId
    where
        F: Fn(Arc<LifecycleEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.register(pattern, listener, true)
    }

    fn register<F, Fut>(&self, pattern: &str, listener: F, once: bool) -> ListenerId
    where
        F: Fn(Arc<LifecycleEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let id = next_listener_id();
        let listener: EventListener = Arc::new(move |event| Box::pin(listener(event)));
        self.listeners.write().push(ListenerEntry {
            id,
            pattern: TopicPattern::parse(pattern),
            listener,
            once,
        });
        id
    }

    /// removeListener/off
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|e| e.id != id);
        before != listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    fn snapshot(&self, topic: &str) -> Vec<EventListener> {
        let mut listeners = self.listeners.write();
        let to_call = listeners
            .iter()
            .filter(|e| e.pattern.matches(topic))
            .map(|e| e.listener.clone())
            .collect::<Vec<_>>();
        listeners.retain(|e| !(e.once && e.pattern.matches(topic)));
        to_call
    }

    /// Deliver an event and wait for every matching listener. Returns how many
    /// listeners completed without error.
    pub async fn emit(&self, event: LifecycleEvent) -> usize {
        let listeners = self.snapshot(&event.topic);
        dispatch(listeners, Arc::new(event)).await
    }
}

async fn dispatch(listeners: Vec<EventListener>, event: Arc<LifecycleEvent>) -> usize {
    let mut delivered = 0;
    for listener in listeners {
        match listener(event.clone()).await {
            Ok(()) => delivered += 1,
            Err(err) => {
                tracing::warn!(topic = %event.topic, error = %err, "event listener failed");
            }
        }
    }
    delivered
}

impl EventPublisher for EventHub {
    fn publish(&self, topic: &str, payload: Value) {
        let listeners = self.snapshot(topic);
        if listeners.is_empty() {
            return;
        }
        let event = Arc::new(LifecycleEvent::new(topic, payload));
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(dispatch(listeners, event));
            }
            Err(_) => {
                tracing::warn!(topic = %topic, "no async runtime, dropping event");
            }
        }
    }
}
