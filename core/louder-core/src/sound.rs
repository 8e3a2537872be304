//! Sound playback through each platform's stock audio command.
//!
//! Playback is best-effort: a missing sound file, an unsupported platform,
//! or a failing player all come back as `false`.

use crate::platform::Platform;
use crate::process::{run_quiet, COMMAND_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Named sounds selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    Success,
    Info,
    Warning,
    Error,
    Progress,
    Reminder,
    Default,
    Silent,
}

/// A fully resolved sound request.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundRequest {
    pub sound_type: SoundType,
    /// Overrides the platform sound table when set.
    pub sound_path: Option<PathBuf>,
    pub platform: Platform,
}

fn macos_sound(sound_type: SoundType) -> &'static str {
    match sound_type {
        SoundType::Success | SoundType::Default => "/System/Library/Sounds/Glass.aiff",
        SoundType::Info => "/System/Library/Sounds/Blow.aiff",
        SoundType::Warning => "/System/Library/Sounds/Sosumi.aiff",
        SoundType::Error => "/System/Library/Sounds/Basso.aiff",
        SoundType::Progress => "/System/Library/Sounds/Tink.aiff",
        SoundType::Reminder => "/System/Library/Sounds/Ping.aiff",
        SoundType::Silent => "",
    }
}

fn linux_sound(sound_type: SoundType) -> &'static str {
    match sound_type {
        SoundType::Success | SoundType::Default => {
            "/usr/share/sounds/freedesktop/stereo/complete.oga"
        }
        SoundType::Info => "/usr/share/sounds/freedesktop/stereo/dialog-information.oga",
        SoundType::Warning => "/usr/share/sounds/freedesktop/stereo/dialog-warning.oga",
        SoundType::Error => "/usr/share/sounds/freedesktop/stereo/dialog-error.oga",
        SoundType::Progress => "/usr/share/sounds/freedesktop/stereo/message.oga",
        SoundType::Reminder => "/usr/share/sounds/freedesktop/stereo/bell.oga",
        SoundType::Silent => "",
    }
}

fn windows_sound(sound_type: SoundType) -> &'static str {
    match sound_type {
        SoundType::Success => r"C:\Windows\Media\tada.wav",
        SoundType::Info => r"C:\Windows\Media\Windows Background.wav",
        SoundType::Warning => r"C:\Windows\Media\Windows Exclamation.wav",
        SoundType::Error => r"C:\Windows\Media\Windows Critical Stop.wav",
        SoundType::Progress => r"C:\Windows\Media\Windows Notify System Generic.wav",
        SoundType::Reminder | SoundType::Default => r"C:\Windows\Media\notify.wav",
        SoundType::Silent => "",
    }
}

/// Returns the stock sound file for `sound_type`, if the platform has one.
pub fn sound_path_for(sound_type: SoundType, platform: Platform) -> Option<PathBuf> {
    let path = match platform {
        Platform::Darwin => macos_sound(sound_type),
        Platform::Linux => linux_sound(sound_type),
        Platform::Windows => windows_sound(sound_type),
        Platform::Unsupported => "",
    };
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Plays the requested sound and reports whether it was emitted.
pub async fn play_sound(request: &SoundRequest) -> bool {
    if request.sound_type == SoundType::Silent {
        return true;
    }
    if request.platform == Platform::Unsupported {
        return false;
    }

    let path = match request
        .sound_path
        .clone()
        .or_else(|| sound_path_for(request.sound_type, request.platform))
    {
        Some(path) => path,
        None => return false,
    };

    if !file_exists(&path).await {
        tracing::debug!(path = %path.display(), "Sound file missing");
        return false;
    }

    let path_str = path.to_string_lossy().into_owned();
    let result = match request.platform {
        Platform::Darwin => run_quiet("afplay", &[path_str.as_str()], COMMAND_TIMEOUT).await,
        Platform::Linux => match run_quiet("paplay", &[path_str.as_str()], COMMAND_TIMEOUT).await {
            Ok(()) => Ok(()),
            Err(_) => run_quiet("aplay", &[path_str.as_str()], COMMAND_TIMEOUT).await,
        },
        Platform::Windows => {
            let script = windows_play_script(&path_str);
            run_quiet("powershell", &["-Command", &script], COMMAND_TIMEOUT).await
        }
        Platform::Unsupported => return false,
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "Sound playback failed");
            false
        }
    }
}

fn windows_play_script(path: &str) -> String {
    format!(
        "(New-Object Media.SoundPlayer '{}').PlaySync()",
        path.replace('\'', "''")
    )
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
