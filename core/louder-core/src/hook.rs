//! One-shot handling of Claude Code hook events.
//!
//! Claude Code runs the hook binary once per event with a JSON payload on
//! stdin. Only two events produce feedback:
//!
//! ```text
//! Stop          → "stop" event, success sound
//! Notification  → "notification" event, info sound
//! anything else → ignored
//! ```

use crate::config::{load_config, FeedbackEvent, LouderConfig};
use crate::notifier::{FeedbackEmitter, Notifier};
use crate::platform::Platform;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Command registered in `~/.claude/settings.json`.
pub const HOOK_COMMAND: &str = "louder-hook handle";
pub const HOOK_TIMEOUT_MS: u64 = 5000;

/// Payload Claude Code writes to the hook's stdin.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub stop_hook_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Stop,
    Notification { notification_type: Option<String> },
    Unknown { event_name: String },
}

impl HookEvent {
    pub fn feedback_event(&self) -> Option<FeedbackEvent> {
        match self {
            HookEvent::Stop => Some(FeedbackEvent::Stop),
            HookEvent::Notification { .. } => Some(FeedbackEvent::Notification),
            HookEvent::Unknown { .. } => None,
        }
    }
}

impl HookInput {
    /// `None` when the payload carries no event name.
    pub fn to_event(&self) -> Option<HookEvent> {
        let name = self.hook_event_name.as_deref()?;
        Some(match name {
            "Stop" => HookEvent::Stop,
            "Notification" => HookEvent::Notification {
                notification_type: self.notification_type.clone(),
            },
            other => HookEvent::Unknown {
                event_name: other.to_string(),
            },
        })
    }

    /// Directory to start config discovery from: the payload's `cwd`, else ours.
    pub fn resolve_cwd(&self) -> Option<PathBuf> {
        self.cwd
            .as_deref()
            .filter(|cwd| !cwd.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
    }
}

/// Handles one hook payload. Returns whether feedback was triggered.
pub async fn handle_claude_hook(input: &HookInput, emitter: Arc<dyn FeedbackEmitter>) -> bool {
    let Some(event) = input.to_event() else {
        tracing::debug!("Skipping hook payload without event name");
        return false;
    };

    let Some(feedback_event) = event.feedback_event() else {
        tracing::debug!(?event, "Ignoring hook event");
        return false;
    };

    let config = match input.resolve_cwd() {
        Some(cwd) => load_config(&cwd),
        None => LouderConfig::default(),
    };

    notify_once(feedback_event, &config, emitter, Platform::detect()).await
}

/// Fires feedback for `event` immediately, honouring per-event suppression.
pub async fn notify_once(
    event: FeedbackEvent,
    config: &LouderConfig,
    emitter: Arc<dyn FeedbackEmitter>,
    platform: Platform,
) -> bool {
    let Some(overrides) = config.event_feedback(event) else {
        tracing::debug!(event = event.as_str(), "Feedback disabled for event");
        return false;
    };

    let notifier = Notifier::new(config.notifier_config(Duration::ZERO, platform), emitter);
    notifier.trigger(overrides).await;
    true
}

/// The `hooks` block to merge into `~/.claude/settings.json`.
pub fn hooks_settings() -> Value {
    let hook = json!({
        "type": "command",
        "command": HOOK_COMMAND,
        "timeout": HOOK_TIMEOUT_MS,
    });

    json!({
        "hooks": {
            "Stop": [
                { "hooks": [hook.clone()] }
            ],
            "Notification": [
                { "matcher": ".*", "hooks": [hook] }
            ],
        }
    })
}
