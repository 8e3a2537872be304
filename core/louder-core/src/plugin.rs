//! Long-lived event subscriber for agent runtimes that stream session events.
//!
//! | Event type                            | Signal   |
//! |---------------------------------------|----------|
//! | `session.updated`, `message.updated`  | activity |
//! | `session.idle`                        | idle     |
//! | `session.error`                       | error    |
//! | `session.progress`                    | progress |
//!
//! Anything else is ignored.

use crate::config::{load_config, LouderConfig, DEFAULT_LISTENER_DELAY};
use crate::debouncer::{SessionDebouncer, SessionSignal, SessionState};
use crate::notifier::{FeedbackEmitter, Notifier};
use crate::platform::Platform;
use futures::future::{self, BoxFuture, FutureExt};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Option<Value>,
}

impl PluginEvent {
    pub fn signal(&self) -> Option<SessionSignal> {
        match self.kind.as_str() {
            "session.updated" | "message.updated" => Some(SessionSignal::Activity),
            "session.idle" => Some(SessionSignal::Idle),
            "session.error" => Some(SessionSignal::Error),
            "session.progress" => Some(SessionSignal::Progress),
            _ => None,
        }
    }

    /// `sessionID`, else `info.id`, else `info.sessionID`.
    pub fn session_id(&self) -> Option<&str> {
        let properties = self.properties.as_ref()?.as_object()?;

        if let Some(id) = properties.get("sessionID").and_then(Value::as_str) {
            return Some(id);
        }

        let info = properties.get("info")?.as_object()?;
        info.get("id")
            .and_then(Value::as_str)
            .or_else(|| info.get("sessionID").and_then(Value::as_str))
    }
}

pub struct EventPlugin {
    debouncer: SessionDebouncer,
}

impl EventPlugin {
    /// Loads config for `directory` and wires up the debounced notifier.
    pub fn new(directory: &Path, emitter: Arc<dyn FeedbackEmitter>) -> Self {
        Self::with_config(load_config(directory), emitter, Platform::detect())
    }

    pub fn with_config(
        config: LouderConfig,
        emitter: Arc<dyn FeedbackEmitter>,
        platform: Platform,
    ) -> Self {
        let delay = config.delay_or(DEFAULT_LISTENER_DELAY);
        let notifier = Notifier::new(config.notifier_config(delay, platform), emitter);
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Event plugin ready");
        Self {
            debouncer: SessionDebouncer::new(config, notifier),
        }
    }

    /// Classifies `event` now and returns the feedback future to drive.
    pub fn dispatch(&self, event: &PluginEvent) -> BoxFuture<'static, ()> {
        let Some(signal) = event.signal() else {
            tracing::debug!(kind = %event.kind, "Ignoring event");
            return future::ready(()).boxed();
        };
        self.debouncer.handle_event(event.session_id(), signal)
    }

    pub fn session_state(&self, session_id: &str) -> SessionState {
        self.debouncer.session_state(session_id)
    }
}
