//! Desktop notification banners.

use crate::platform::Platform;
use crate::process::{run_quiet, COMMAND_TIMEOUT};

pub const DEFAULT_TITLE: &str = "Louder";
pub const DEFAULT_MESSAGE: &str = "Claude Code is ready";

/// Text and click target for a desktop banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub title: String,
    pub message: String,
    pub subtitle: Option<String>,
    /// URL or path opened after the banner is shown.
    pub open: Option<String>,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            subtitle: None,
            open: None,
        }
    }
}

fn escape_for_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn applescript_for(banner: &Banner) -> String {
    let mut script = format!(
        "display notification \"{}\" with title \"{}\"",
        escape_for_applescript(&banner.message),
        escape_for_applescript(&banner.title)
    );
    if let Some(subtitle) = banner.subtitle.as_deref().filter(|s| !s.is_empty()) {
        script.push_str(&format!(
            " subtitle \"{}\"",
            escape_for_applescript(subtitle)
        ));
    }
    script
}

/// Shows `banner`. Only macOS is supported; other platforms return `false`.
pub async fn send_banner(banner: &Banner, platform: Platform) -> bool {
    if platform != Platform::Darwin {
        tracing::debug!(%platform, "Desktop notifications unsupported on this platform");
        return false;
    }

    let script = applescript_for(banner);
    if let Err(err) = run_quiet("osascript", &["-e", &script], COMMAND_TIMEOUT).await {
        tracing::debug!(error = %err, "Failed to show notification");
        return false;
    }

    if let Some(target) = banner.open.as_deref() {
        if let Err(err) = run_quiet("open", &[target], COMMAND_TIMEOUT).await {
            tracing::debug!(error = %err, target, "Failed to open notification target");
        }
    }

    true
}
