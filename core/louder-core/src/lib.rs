//! # louder-core
//!
//! Core library for Louder: sound, haptic, and banner feedback when a coding
//! agent session finishes, errors, or goes idle.
//!
//! ## Design Principles
//!
//! - **Best-effort**: Feedback never fails loudly. Every emitter reports `bool`.
//! - **Debounced**: At most one notification per session episode.
//! - **Single engine**: One haptic engine process per supervisor, shared by all callers.
//! - **Injected side effects**: Emission goes through [`FeedbackEmitter`] so the
//!   state machines can be driven without a speaker or a trackpad.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use louder_core::{EventPlugin, PluginEvent, SystemEmitter};
//! use std::sync::Arc;
//!
//! let plugin = EventPlugin::new(&cwd, Arc::new(SystemEmitter::detect()));
//! let event: PluginEvent = serde_json::from_str(line)?;
//! tokio::spawn(plugin.dispatch(&event));
//! ```

pub mod config;
pub mod debouncer;
pub mod error;
pub mod feedback;
pub mod haptic;
pub mod hook;
pub mod notification;
pub mod notifier;
pub mod platform;
pub mod plugin;
pub mod process;
pub mod registry;
pub mod sound;
pub mod trigger;

pub use config::{load_config, FeedbackEvent, LouderConfig};
pub use debouncer::{SessionDebouncer, SessionSignal, SessionState};
pub use error::{LouderError, Result};
pub use feedback::{Feedback, FeedbackOverrides, FeedbackSetting};
pub use haptic::{HapticCommand, HapticPlayer, HapticSupervisor, HapticType};
pub use hook::{handle_claude_hook, hooks_settings, HookEvent, HookInput};
pub use notification::Banner;
pub use notifier::{FeedbackEmitter, Notifier, NotifierConfig, SystemEmitter};
pub use platform::Platform;
pub use plugin::{EventPlugin, PluginEvent};
pub use registry::ActivityRegistry;
pub use sound::{SoundRequest, SoundType};
pub use trigger::DebouncedTrigger;
