//! Cancelable delayed execution of a single feedback action.
//!
//! Every call to [`DebouncedTrigger::trigger`] registers itself immediately and
//! hands back a future that settles exactly once:
//!
//! - after the action ran (delay elapsed, or zero delay),
//! - as soon as [`DebouncedTrigger::cancel`] is called, or
//! - as soon as a newer `trigger` supersedes it.
//!
//! Only the newest registration can ever run the action. A generation counter
//! is bumped on every trigger and cancel and re-checked when the timer fires,
//! so a cancelled timer can never be resurrected.

use crate::error::Result;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

type Action<O> = Arc<dyn Fn(O) -> BoxFuture<'static, Result<()>> + Send + Sync>;

#[derive(Default)]
struct TriggerState {
    generation: u64,
    pending: Option<oneshot::Sender<()>>,
}

/// Runs `action` once per trigger, after `delay`, unless cancelled first.
pub struct DebouncedTrigger<O> {
    delay: Duration,
    action: Action<O>,
    state: Arc<Mutex<TriggerState>>,
}

impl<O: Send + 'static> DebouncedTrigger<O> {
    pub fn new<F, Fut>(delay: Duration, action: F) -> Self
    where
        F: Fn(O) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            delay,
            action: Arc::new(move |overrides| action(overrides).boxed()),
            state: Arc::new(Mutex::new(TriggerState::default())),
        }
    }

    /// Schedules the action with `overrides`.
    ///
    /// Registration happens before this returns, so calls made in order are
    /// honoured in order even if the returned futures are polled later.
    pub fn trigger(&self, overrides: O) -> BoxFuture<'static, ()> {
        let action = Arc::clone(&self.action);

        if self.delay.is_zero() {
            return run_action(action, overrides).boxed();
        }

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            if let Some(previous) = state.pending.replace(cancel_tx) {
                let _ = previous.send(());
                tracing::debug!("Pending feedback superseded");
            }
            state.generation
        };

        let deadline = Instant::now().checked_add(self.delay);
        let delay = self.delay;
        let state = Arc::clone(&self.state);

        async move {
            // Deadlines past the end of `Instant` are clamped by `sleep`.
            let timer = match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline),
                None => tokio::time::sleep(delay),
            };

            tokio::select! {
                _ = timer => {}
                _ = cancel_rx => return,
            }

            {
                let mut state = lock(&state);
                if state.generation != generation {
                    return;
                }
                state.pending = None;
            }

            tracing::debug!("Feedback delay elapsed");
            run_action(action, overrides).await;
        }
        .boxed()
    }

    /// Cancels the pending trigger, settling its future without running the action.
    ///
    /// No-op when nothing is pending. An action that already started keeps running.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        if let Some(pending) = state.pending.take() {
            state.generation += 1;
            let _ = pending.send(());
            tracing::debug!("Pending feedback cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

fn lock(state: &Mutex<TriggerState>) -> MutexGuard<'_, TriggerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_action<O>(action: Action<O>, overrides: O) {
    if let Err(err) = action(overrides).await {
        tracing::debug!(error = %err, "Feedback action failed");
    }
}
