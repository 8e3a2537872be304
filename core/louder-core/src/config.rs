//! Configuration discovery and loading.
//!
//! Two layers are merged, top-level key by key:
//!
//! 1. Global: `$LOUDER_CONFIG`, else `~/.louderrc.json`
//! 2. Local: the nearest directory (walking up from the session's cwd) holding
//!    `package.json` with a `louder` key, `.louderrc`, `.louderrc.json`,
//!    `.louderrc.toml`, or `louder.toml`
//!
//! A file that fails to parse is logged and ignored. Loading never fails.

use crate::error::{LouderError, Result};
use crate::feedback::{FeedbackOverrides, FeedbackSetting};
use crate::haptic::HapticType;
use crate::notification::{Banner, DEFAULT_MESSAGE, DEFAULT_TITLE};
use crate::notifier::NotifierConfig;
use crate::platform::Platform;
use crate::sound::SoundType;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const GLOBAL_CONFIG_ENV: &str = "LOUDER_CONFIG";
const GLOBAL_CONFIG_FILE: &str = ".louderrc.json";
const PACKAGE_JSON: &str = "package.json";
const PACKAGE_JSON_KEY: &str = "louder";
const LOCAL_CONFIG_FILES: [&str; 4] = [".louderrc", ".louderrc.json", ".louderrc.toml", "louder.toml"];

/// Delay used by the long-lived listener when config gives none.
pub const DEFAULT_LISTENER_DELAY: Duration = Duration::from_millis(1500);
/// Longest accepted `delay`; anything above is treated as invalid.
pub const MAX_DELAY: Duration = Duration::from_secs(60 * 60);

/// Events that can carry their own feedback selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackEvent {
    Stop,
    Notification,
    Idle,
    Error,
    Progress,
}

impl FeedbackEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackEvent::Stop => "stop",
            FeedbackEvent::Notification => "notification",
            FeedbackEvent::Idle => "idle",
            FeedbackEvent::Error => "error",
            FeedbackEvent::Progress => "progress",
        }
    }

    pub fn default_sound(self) -> SoundType {
        match self {
            FeedbackEvent::Stop => SoundType::Success,
            FeedbackEvent::Notification => SoundType::Info,
            FeedbackEvent::Idle => SoundType::Reminder,
            FeedbackEvent::Error => SoundType::Error,
            FeedbackEvent::Progress => SoundType::Progress,
        }
    }

    pub fn default_haptic(self) -> HapticType {
        match self {
            FeedbackEvent::Error => HapticType::Error,
            _ => HapticType::Success,
        }
    }
}

/// Per-event sound selection. Absent entries fall back to the global `sound`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EventConfigs {
    pub stop: Option<FeedbackSetting<SoundType>>,
    pub notification: Option<FeedbackSetting<SoundType>>,
    pub idle: Option<FeedbackSetting<SoundType>>,
    pub error: Option<FeedbackSetting<SoundType>>,
    pub progress: Option<FeedbackSetting<SoundType>>,
}

impl EventConfigs {
    pub fn get(&self, event: FeedbackEvent) -> Option<FeedbackSetting<SoundType>> {
        match event {
            FeedbackEvent::Stop => self.stop,
            FeedbackEvent::Notification => self.notification,
            FeedbackEvent::Idle => self.idle,
            FeedbackEvent::Error => self.error,
            FeedbackEvent::Progress => self.progress,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LouderConfig {
    pub title: Option<String>,
    pub message: Option<String>,
    pub subtitle: Option<String>,
    pub open: Option<String>,
    /// Show a desktop banner alongside sound and haptics.
    pub notification: bool,
    pub sound: FeedbackSetting<SoundType>,
    pub sound_path: Option<PathBuf>,
    pub haptic: FeedbackSetting<HapticType>,
    /// Milliseconds.
    pub delay: Option<f64>,
    pub events: EventConfigs,
}

impl Default for LouderConfig {
    fn default() -> Self {
        Self {
            title: None,
            message: None,
            subtitle: None,
            open: None,
            notification: false,
            sound: FeedbackSetting::DefaultType,
            sound_path: None,
            haptic: FeedbackSetting::Disabled,
            delay: None,
            events: EventConfigs::default(),
        }
    }
}

impl LouderConfig {
    /// Configured delay, or `default` when absent, negative, not finite, or
    /// longer than [`MAX_DELAY`].
    pub fn delay_or(&self, default: Duration) -> Duration {
        self.delay
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok())
            .filter(|delay| *delay <= MAX_DELAY)
            .unwrap_or(default)
    }

    /// Banner to show, when banners are enabled.
    pub fn banner(&self) -> Option<Banner> {
        if !self.notification {
            return None;
        }
        Some(Banner {
            title: self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            message: self
                .message
                .clone()
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            subtitle: self.subtitle.clone(),
            open: self.open.clone(),
        })
    }

    /// Resolves what `event` should emit, or `None` when it is suppressed.
    ///
    /// An event entry of `false` always suppresses. Otherwise the event entry
    /// (or the global `sound`) picks the sound, and the global `haptic` picks
    /// the haptic pattern; the event is suppressed only if nothing at all
    /// would be emitted.
    pub fn event_feedback(&self, event: FeedbackEvent) -> Option<FeedbackOverrides> {
        let entry = self.events.get(event);
        if matches!(entry, Some(FeedbackSetting::Disabled)) {
            return None;
        }

        let sound = entry.unwrap_or(self.sound).resolve(event.default_sound());
        let haptic = self.haptic.resolve(event.default_haptic());
        if sound.is_none() && haptic.is_none() && !self.notification {
            return None;
        }

        Some(FeedbackOverrides {
            sound: Some(sound.map(Into::into).unwrap_or(FeedbackSetting::Disabled)),
            haptic: Some(haptic.map(Into::into).unwrap_or(FeedbackSetting::Disabled)),
        })
    }

    /// Notifier settings for this config with the given delay.
    pub fn notifier_config(&self, delay: Duration, platform: Platform) -> NotifierConfig {
        NotifierConfig {
            sound: self.sound,
            sound_path: self.sound_path.clone(),
            haptic: self.haptic,
            banner: self.banner(),
            delay,
            platform,
        }
    }
}

/// Loads the merged config for a session rooted at `start_dir`.
pub fn load_config(start_dir: &Path) -> LouderConfig {
    load_config_with(start_dir, global_config_path().as_deref())
}

/// Like [`load_config`], with an explicit global config path.
pub fn load_config_with(start_dir: &Path, global: Option<&Path>) -> LouderConfig {
    let mut merged = Value::Object(Map::new());

    if let Some(path) = global.filter(|path| path.is_file()) {
        if let Some(value) = validated(path, read_config_file(path)) {
            merge_top_level(&mut merged, value);
        }
    }

    if let Some((path, loaded)) = find_local_config(start_dir) {
        tracing::debug!(path = %path.display(), "Using local config");
        if let Some(value) = validated(&path, loaded) {
            merge_top_level(&mut merged, value);
        }
    }

    serde_json::from_value(merged).unwrap_or_else(|err| {
        tracing::error!(error = %err, "Merged config invalid, using defaults");
        LouderConfig::default()
    })
}

pub fn global_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(GLOBAL_CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_FILE))
}

/// Whether the environment asks for diagnostic output.
pub fn diagnostics_enabled() -> bool {
    diagnostics_requested(
        std::env::var("DEBUG").ok().as_deref(),
        std::env::var("LOUDER_DEBUG").ok().as_deref(),
    )
}

fn diagnostics_requested(debug: Option<&str>, louder_debug: Option<&str>) -> bool {
    if matches!(debug, Some("louder") | Some("*")) {
        return true;
    }
    matches!(
        louder_debug.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

fn validated(path: &Path, loaded: Result<Value>) -> Option<Value> {
    let checked = loaded.and_then(|value| {
        serde_json::from_value::<LouderConfig>(value.clone())
            .map(|_| value)
            .map_err(|err| LouderError::ConfigMalformed {
                path: path.to_path_buf(),
                details: err.to_string(),
            })
    });
    match checked {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(error = %err, "Ignoring config file");
            None
        }
    }
}

fn merge_top_level(base: &mut Value, overlay: Value) {
    if let (Value::Object(base), Value::Object(overlay)) = (base, overlay) {
        for (key, value) in overlay {
            base.insert(key, value);
        }
    }
}

/// Finds the nearest config file at or above `start_dir`, stopping after home.
fn find_local_config(start_dir: &Path) -> Option<(PathBuf, Result<Value>)> {
    let home = dirs::home_dir();

    for dir in start_dir.ancestors() {
        let package = dir.join(PACKAGE_JSON);
        if package.is_file() {
            match read_package_json(&package) {
                Ok(Some(value)) => return Some((package, Ok(value))),
                Ok(None) => {}
                Err(err) => tracing::debug!(error = %err, "Skipping unreadable package.json"),
            }
        }

        for name in LOCAL_CONFIG_FILES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                let loaded = read_config_file(&candidate);
                return Some((candidate, loaded));
            }
        }

        if home.as_deref() == Some(dir) {
            break;
        }
    }
    None
}

fn read_package_json(path: &Path) -> Result<Option<Value>> {
    let content = fs_err::read_to_string(path)
        .map_err(|err| LouderError::io(format!("reading {}", path.display()), err))?;
    let mut package: Value =
        serde_json::from_str(&content).map_err(|source| LouderError::Json {
            context: path.display().to_string(),
            source,
        })?;
    Ok(package
        .as_object_mut()
        .and_then(|object| object.remove(PACKAGE_JSON_KEY)))
}

fn read_config_file(path: &Path) -> Result<Value> {
    let content = fs_err::read_to_string(path)
        .map_err(|err| LouderError::io(format!("reading {}", path.display()), err))?;
    parse_config_text(path, &content)
}

/// `.toml` files are TOML; everything else is JSON, with TOML accepted as a
/// fallback for the extensionless `.louderrc`.
fn parse_config_text(path: &Path, content: &str) -> Result<Value> {
    let malformed = |details: String| LouderError::ConfigMalformed {
        path: path.to_path_buf(),
        details,
    };

    if path.extension().is_some_and(|ext| ext == "toml") {
        return toml::from_str::<Value>(content).map_err(|err| malformed(err.to_string()));
    }

    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(value),
        Err(json_err) if path.extension().is_none() => toml::from_str::<Value>(content)
            .map_err(|toml_err| malformed(format!("{}; {}", json_err, toml_err))),
        Err(err) => Err(malformed(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs_err::write(&path, content).unwrap();
        path
    }

    fn parse(json: &str) -> LouderConfig {
        serde_json::from_str(json).expect("valid config")
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("{}");
        assert_eq!(config, LouderConfig::default());
        assert_eq!(config.sound, FeedbackSetting::DefaultType);
        assert_eq!(config.haptic, FeedbackSetting::Disabled);
    }

    #[test]
    fn full_config_parses() {
        let config = parse(
            r#"{
                "title": "Build",
                "notification": true,
                "sound": "warning",
                "soundPath": "/tmp/ding.wav",
                "haptic": {"type": "error", "intensity": 1.5},
                "delay": 250,
                "events": {"idle": false, "error": "warning"}
            }"#,
        );
        assert_eq!(config.title.as_deref(), Some("Build"));
        assert_eq!(config.sound, FeedbackSetting::Named(SoundType::Warning));
        assert_eq!(config.sound_path, Some(PathBuf::from("/tmp/ding.wav")));
        assert_eq!(
            config.haptic,
            FeedbackSetting::Explicit {
                kind: HapticType::Error,
                intensity: 1.5
            }
        );
        assert_eq!(config.events.idle, Some(FeedbackSetting::Disabled));
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), Duration::from_millis(250));
    }

    #[test]
    fn invalid_delay_falls_back() {
        let mut config = LouderConfig::default();
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), DEFAULT_LISTENER_DELAY);

        config.delay = Some(-5.0);
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), DEFAULT_LISTENER_DELAY);

        config.delay = Some(f64::NAN);
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), DEFAULT_LISTENER_DELAY);

        config.delay = Some(1e19);
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), DEFAULT_LISTENER_DELAY);

        config.delay = Some(0.0);
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), Duration::ZERO);
    }

    #[test]
    fn huge_delay_falls_back_to_default() {
        let config = parse(r#"{"delay": 1e22}"#);
        assert_eq!(config.delay_or(DEFAULT_LISTENER_DELAY), DEFAULT_LISTENER_DELAY);

        let at_limit = LouderConfig {
            delay: Some(MAX_DELAY.as_millis() as f64),
            ..LouderConfig::default()
        };
        assert_eq!(at_limit.delay_or(DEFAULT_LISTENER_DELAY), MAX_DELAY);
    }

    #[test]
    fn event_false_suppresses() {
        let config = parse(r#"{"events": {"idle": false}}"#);
        assert_eq!(config.event_feedback(FeedbackEvent::Idle), None);
        assert!(config.event_feedback(FeedbackEvent::Error).is_some());
    }

    #[test]
    fn event_defaults_apply_when_unset() {
        let config = LouderConfig::default();
        let overrides = config.event_feedback(FeedbackEvent::Idle).unwrap();
        assert_eq!(
            overrides.sound,
            Some(FeedbackSetting::Named(SoundType::Reminder))
        );
        assert_eq!(overrides.haptic, Some(FeedbackSetting::Disabled));
    }

    #[test]
    fn event_entry_beats_global_sound() {
        let config = parse(r#"{"sound": "info", "events": {"error": "warning"}}"#);
        let error = config.event_feedback(FeedbackEvent::Error).unwrap();
        assert_eq!(error.sound, Some(FeedbackSetting::Named(SoundType::Warning)));

        let idle = config.event_feedback(FeedbackEvent::Idle).unwrap();
        assert_eq!(idle.sound, Some(FeedbackSetting::Named(SoundType::Info)));
    }

    #[test]
    fn nothing_to_emit_suppresses() {
        let config = parse(r#"{"sound": false}"#);
        assert_eq!(config.event_feedback(FeedbackEvent::Stop), None);

        let haptic_only = parse(r#"{"sound": false, "haptic": true}"#);
        let overrides = haptic_only.event_feedback(FeedbackEvent::Error).unwrap();
        assert_eq!(overrides.sound, Some(FeedbackSetting::Disabled));
        assert_eq!(
            overrides.haptic,
            Some(FeedbackSetting::Named(HapticType::Error))
        );
    }

    #[test]
    fn banner_only_when_enabled() {
        assert_eq!(LouderConfig::default().banner(), None);

        let banner = parse(r#"{"notification": true, "subtitle": "api"}"#)
            .banner()
            .unwrap();
        assert_eq!(banner.title, DEFAULT_TITLE);
        assert_eq!(banner.message, DEFAULT_MESSAGE);
        assert_eq!(banner.subtitle.as_deref(), Some("api"));
    }

    #[test]
    fn discovers_config_in_parent_directory() {
        let root = TempDir::new().unwrap();
        write(root.path(), ".louderrc.json", r#"{"sound": "error"}"#);
        let nested = root.path().join("a/b");
        fs_err::create_dir_all(&nested).unwrap();

        let config = load_config_with(&nested, None);
        assert_eq!(config.sound, FeedbackSetting::Named(SoundType::Error));
    }

    #[test]
    fn package_json_key_is_used() {
        let root = TempDir::new().unwrap();
        write(
            root.path(),
            "package.json",
            r#"{"name": "app", "louder": {"delay": 10}}"#,
        );

        let config = load_config_with(root.path(), None);
        assert_eq!(config.delay, Some(10.0));
    }

    #[test]
    fn package_json_without_key_is_skipped() {
        let root = TempDir::new().unwrap();
        write(root.path(), "package.json", r#"{"name": "app"}"#);
        write(root.path(), "louder.toml", "sound = \"progress\"\n[events]\nstop = false\n");

        let config = load_config_with(root.path(), None);
        assert_eq!(config.sound, FeedbackSetting::Named(SoundType::Progress));
        assert_eq!(config.events.stop, Some(FeedbackSetting::Disabled));
    }

    #[test]
    fn extensionless_rc_accepts_toml() {
        let root = TempDir::new().unwrap();
        write(root.path(), ".louderrc", "haptic = \"success\"\n");

        let config = load_config_with(root.path(), None);
        assert_eq!(config.haptic, FeedbackSetting::Named(HapticType::Success));
    }

    #[test]
    fn local_keys_override_global() {
        let global_dir = TempDir::new().unwrap();
        let global = write(
            global_dir.path(),
            "global.json",
            r#"{"sound": "info", "notification": true}"#,
        );
        let project = TempDir::new().unwrap();
        write(project.path(), ".louderrc.json", r#"{"sound": "warning"}"#);

        let config = load_config_with(project.path(), Some(&global));
        assert_eq!(config.sound, FeedbackSetting::Named(SoundType::Warning));
        assert!(config.notification);
    }

    #[test]
    fn malformed_local_file_is_ignored() {
        let global_dir = TempDir::new().unwrap();
        let global = write(global_dir.path(), "global.json", r#"{"sound": "info"}"#);
        let project = TempDir::new().unwrap();
        write(project.path(), ".louderrc.json", "{ not json");

        let config = load_config_with(project.path(), Some(&global));
        assert_eq!(config.sound, FeedbackSetting::Named(SoundType::Info));
    }

    #[test]
    fn schema_violation_is_ignored() {
        let project = TempDir::new().unwrap();
        write(project.path(), ".louderrc.json", r#"{"sound": "kazoo"}"#);

        assert_eq!(load_config_with(project.path(), None), LouderConfig::default());
    }

    #[test]
    fn diagnostics_flags() {
        assert!(diagnostics_requested(Some("louder"), None));
        assert!(diagnostics_requested(Some("*"), None));
        assert!(diagnostics_requested(None, Some("TRUE")));
        assert!(diagnostics_requested(None, Some("1")));
        assert!(!diagnostics_requested(Some("other"), Some("0")));
        assert!(!diagnostics_requested(None, None));
    }
}
