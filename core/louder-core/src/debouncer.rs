//! Per-session suppression of redundant or stale notifications.
//!
//! Each session moves through three derived states:
//!
//! ```text
//! Idle ──activity──▶ Active ──terminal (stale)──▶ Idle
//!   │                  ▲
//!   └──terminal──▶ Notified ──activity──┘
//! ```
//!
//! At most one notification fires per episode: a session that was notified is
//! ignored until activity resets it, and a terminal signal that races in right
//! after activity is swallowed instead of notifying.

use crate::config::{FeedbackEvent, LouderConfig};
use crate::notifier::Notifier;
use crate::registry::{ActivityRegistry, DEFAULT_CAPACITY};
use futures::future::{self, BoxFuture, FutureExt};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle signal for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSignal {
    Activity,
    Idle,
    Error,
    Progress,
}

impl SessionSignal {
    /// The configurable event behind a terminal signal; `None` for activity.
    pub fn feedback_event(self) -> Option<FeedbackEvent> {
        match self {
            SessionSignal::Activity => None,
            SessionSignal::Idle => Some(FeedbackEvent::Idle),
            SessionSignal::Error => Some(FeedbackEvent::Error),
            SessionSignal::Progress => Some(FeedbackEvent::Progress),
        }
    }
}

/// Derived from registry membership; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Notified,
}

pub struct SessionDebouncer {
    config: LouderConfig,
    notifier: Notifier,
    active: Mutex<ActivityRegistry>,
    notified: Mutex<ActivityRegistry>,
}

impl SessionDebouncer {
    pub fn new(config: LouderConfig, notifier: Notifier) -> Self {
        Self::with_capacity(config, notifier, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(config: LouderConfig, notifier: Notifier, capacity: usize) -> Self {
        Self {
            config,
            notifier,
            active: Mutex::new(ActivityRegistry::new(capacity)),
            notified: Mutex::new(ActivityRegistry::new(capacity)),
        }
    }

    /// Applies `signal` to the session and returns the feedback to await, if any.
    ///
    /// All bookkeeping happens before this returns; the future only carries
    /// the (possibly delayed) emission. Missing session ids are ignored.
    pub fn handle_event(
        &self,
        session_id: Option<&str>,
        signal: SessionSignal,
    ) -> BoxFuture<'static, ()> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            tracing::debug!(?signal, "Ignoring event without session id");
            return future::ready(()).boxed();
        };

        match signal.feedback_event() {
            None => {
                self.mark_activity(session_id);
                future::ready(()).boxed()
            }
            Some(event) => self.handle_terminal(session_id, event),
        }
    }

    fn mark_activity(&self, session_id: &str) {
        lock(&self.active).add(session_id);
        self.notifier.cancel();
        lock(&self.notified).delete(session_id);
        tracing::debug!(session_id, "Session activity");
    }

    fn handle_terminal(&self, session_id: &str, event: FeedbackEvent) -> BoxFuture<'static, ()> {
        if lock(&self.notified).has(session_id) {
            tracing::debug!(session_id, event = event.as_str(), "Already notified");
            return future::ready(()).boxed();
        }

        let Some(overrides) = self.config.event_feedback(event) else {
            tracing::debug!(session_id, event = event.as_str(), "Feedback disabled for event");
            return future::ready(()).boxed();
        };

        if lock(&self.active).delete(session_id) {
            tracing::debug!(session_id, event = event.as_str(), "Stale terminal event");
            return future::ready(()).boxed();
        }

        lock(&self.notified).add(session_id);
        tracing::debug!(session_id, event = event.as_str(), "Scheduling feedback");
        self.notifier.trigger(overrides)
    }

    pub fn session_state(&self, session_id: &str) -> SessionState {
        if lock(&self.notified).has(session_id) {
            SessionState::Notified
        } else if lock(&self.active).has(session_id) {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.notifier.is_pending()
    }
}

fn lock(registry: &Mutex<ActivityRegistry>) -> MutexGuard<'_, ActivityRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackSetting;
    use crate::notifier::testing::{Emitted, RecordingEmitter};
    use crate::notifier::NotifierConfig;
    use crate::sound::SoundType;
    use std::sync::Arc;
    use std::time::Duration;

    const DELAY: Duration = Duration::from_millis(1500);

    fn debouncer(config: LouderConfig) -> (SessionDebouncer, Arc<RecordingEmitter>) {
        let emitter = Arc::new(RecordingEmitter::default());
        let notifier = Notifier::new(
            NotifierConfig {
                delay: DELAY,
                ..NotifierConfig::default()
            },
            emitter.clone(),
        );
        (SessionDebouncer::new(config, notifier), emitter)
    }

    #[tokio::test(start_paused = true)]
    async fn activity_then_idle_inside_window_stays_silent() {
        let (debouncer, emitter) = debouncer(LouderConfig::default());

        debouncer.handle_event(Some("s1"), SessionSignal::Activity).await;
        assert_eq!(debouncer.session_state("s1"), SessionState::Active);

        debouncer.handle_event(Some("s1"), SessionSignal::Idle).await;
        tokio::time::sleep(DELAY * 2).await;

        assert!(emitter.emitted().is_empty());
        assert_eq!(debouncer.session_state("s1"), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_without_activity_notifies_once() {
        let (debouncer, emitter) = debouncer(LouderConfig::default());

        debouncer.handle_event(Some("s1"), SessionSignal::Idle).await;
        assert_eq!(debouncer.session_state("s1"), SessionState::Notified);
        debouncer.handle_event(Some("s1"), SessionSignal::Idle).await;

        assert_eq!(emitter.emitted(), vec![Emitted::Sound(SoundType::Reminder)]);
    }

    #[tokio::test(start_paused = true)]
    async fn error_while_active_is_ignored_and_clears_active() {
        let (debouncer, emitter) = debouncer(LouderConfig::default());

        debouncer.handle_event(Some("s1"), SessionSignal::Activity).await;
        debouncer.handle_event(Some("s1"), SessionSignal::Error).await;

        assert!(emitter.emitted().is_empty());
        assert_eq!(debouncer.session_state("s1"), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_cancels_pending_feedback_and_rearms() {
        let (debouncer, emitter) = debouncer(LouderConfig::default());

        let pending = tokio::spawn(debouncer.handle_event(Some("s1"), SessionSignal::Idle));
        tokio::task::yield_now().await;
        assert!(debouncer.is_pending());

        debouncer.handle_event(Some("s1"), SessionSignal::Activity).await;
        pending.await.unwrap();
        assert!(emitter.emitted().is_empty());
        assert_eq!(debouncer.session_state("s1"), SessionState::Active);

        // Stale idle consumes the activity, the next one notifies.
        debouncer.handle_event(Some("s1"), SessionSignal::Idle).await;
        debouncer.handle_event(Some("s1"), SessionSignal::Idle).await;
        assert_eq!(emitter.emitted(), vec![Emitted::Sound(SoundType::Reminder)]);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_event_does_not_mark_notified() {
        let config: LouderConfig =
            serde_json::from_str(r#"{"events": {"progress": false}}"#).unwrap();
        let (debouncer, emitter) = debouncer(config);

        debouncer.handle_event(Some("s1"), SessionSignal::Progress).await;

        assert!(emitter.emitted().is_empty());
        assert_eq!(debouncer.session_state("s1"), SessionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn event_entry_selects_sound() {
        let config = LouderConfig {
            events: crate::config::EventConfigs {
                error: Some(FeedbackSetting::Named(SoundType::Warning)),
                ..Default::default()
            },
            ..LouderConfig::default()
        };
        let (debouncer, emitter) = debouncer(config);

        debouncer.handle_event(Some("s2"), SessionSignal::Error).await;

        assert_eq!(emitter.emitted(), vec![Emitted::Sound(SoundType::Warning)]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_session_id_is_ignored() {
        let (debouncer, emitter) = debouncer(LouderConfig::default());

        debouncer.handle_event(None, SessionSignal::Idle).await;
        debouncer.handle_event(Some(""), SessionSignal::Idle).await;

        assert!(emitter.emitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_are_tracked_independently() {
        let (debouncer, emitter) = debouncer(LouderConfig::default());

        debouncer.handle_event(Some("a"), SessionSignal::Activity).await;
        debouncer.handle_event(Some("b"), SessionSignal::Idle).await;

        assert_eq!(debouncer.session_state("a"), SessionState::Active);
        assert_eq!(debouncer.session_state("b"), SessionState::Notified);
        assert_eq!(emitter.emitted().len(), 1);
    }
}
