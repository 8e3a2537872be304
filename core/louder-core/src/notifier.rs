//! The feedback action: sound, then haptics, then an optional banner.
//!
//! [`Notifier`] wraps the action in a [`DebouncedTrigger`] so callers choose
//! between firing immediately (zero delay) and a cancelable delay.

use crate::error::Result;
use crate::feedback::{Feedback, FeedbackOverrides, FeedbackSetting};
use crate::haptic::{HapticPlayer, HapticSupervisor, HapticType};
use crate::notification::{send_banner, Banner};
use crate::platform::Platform;
use crate::sound::{play_sound, SoundRequest, SoundType};
use crate::trigger::DebouncedTrigger;
use futures::future::{BoxFuture, FutureExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Sound used when `sound` is `true` and nothing more specific applies.
pub const DEFAULT_SOUND: SoundType = SoundType::Success;
pub const DEFAULT_HAPTIC: HapticType = HapticType::Success;

/// Side-effect seam for the three feedback channels.
///
/// Every method reports whether the feedback was actually produced.
pub trait FeedbackEmitter: Send + Sync {
    fn play_sound(&self, request: SoundRequest) -> BoxFuture<'_, bool>;
    fn play_haptic(&self, feedback: Feedback<HapticType>) -> BoxFuture<'_, bool>;
    fn show_banner(&self, banner: Banner, platform: Platform) -> BoxFuture<'_, bool>;
}

/// Emits through the host's audio player, the haptic engine, and `osascript`.
pub struct SystemEmitter {
    haptics: HapticPlayer,
}

impl SystemEmitter {
    pub fn new(supervisor: Arc<HapticSupervisor>, platform: Platform) -> Self {
        Self {
            haptics: HapticPlayer::new(supervisor, platform),
        }
    }

    /// Emitter for the current platform using the default engine locations.
    pub fn detect() -> Self {
        let supervisor = HapticSupervisor::with_defaults(crate::config::diagnostics_enabled());
        Self::new(Arc::new(supervisor), Platform::detect())
    }
}

impl FeedbackEmitter for SystemEmitter {
    fn play_sound(&self, request: SoundRequest) -> BoxFuture<'_, bool> {
        async move { play_sound(&request).await }.boxed()
    }

    fn play_haptic(&self, feedback: Feedback<HapticType>) -> BoxFuture<'_, bool> {
        self.haptics.play(feedback).boxed()
    }

    fn show_banner(&self, banner: Banner, platform: Platform) -> BoxFuture<'_, bool> {
        async move { send_banner(&banner, platform).await }.boxed()
    }
}

/// Base settings for a notifier; overrides are merged over these per trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    pub sound: FeedbackSetting<SoundType>,
    pub sound_path: Option<PathBuf>,
    pub haptic: FeedbackSetting<HapticType>,
    pub banner: Option<Banner>,
    pub delay: Duration,
    pub platform: Platform,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            sound: FeedbackSetting::DefaultType,
            sound_path: None,
            haptic: FeedbackSetting::Disabled,
            banner: None,
            delay: Duration::ZERO,
            platform: Platform::detect(),
        }
    }
}

pub struct Notifier {
    trigger: DebouncedTrigger<FeedbackOverrides>,
}

impl Notifier {
    pub fn new(config: NotifierConfig, emitter: Arc<dyn FeedbackEmitter>) -> Self {
        let delay = config.delay;
        let config = Arc::new(config);
        let trigger = DebouncedTrigger::new(delay, move |overrides: FeedbackOverrides| {
            let config = Arc::clone(&config);
            let emitter = Arc::clone(&emitter);
            async move { emit(&config, emitter.as_ref(), overrides).await }
        });
        Self { trigger }
    }

    /// Fires feedback with `overrides` merged over the base config.
    pub fn trigger(&self, overrides: FeedbackOverrides) -> BoxFuture<'static, ()> {
        self.trigger.trigger(overrides)
    }

    pub fn cancel(&self) {
        self.trigger.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.trigger.is_pending()
    }
}

async fn emit(
    config: &NotifierConfig,
    emitter: &dyn FeedbackEmitter,
    overrides: FeedbackOverrides,
) -> Result<()> {
    let sound = overrides.sound.unwrap_or(config.sound).resolve(DEFAULT_SOUND);
    let haptic = overrides.haptic.unwrap_or(config.haptic).resolve(DEFAULT_HAPTIC);

    if let Some(sound) = sound {
        let request = SoundRequest {
            sound_type: sound.kind,
            sound_path: config.sound_path.clone(),
            platform: config.platform,
        };
        let played = emitter.play_sound(request).await;
        tracing::debug!(sound = ?sound.kind, played, "Sound feedback");
    }

    if let Some(haptic) = haptic {
        let played = emitter.play_haptic(haptic).await;
        tracing::debug!(haptic = ?haptic.kind, played, "Haptic feedback");
    }

    if let Some(banner) = config.banner.clone() {
        let shown = emitter.show_banner(banner, config.platform).await;
        tracing::debug!(shown, "Banner feedback");
    }

    Ok(())
}
