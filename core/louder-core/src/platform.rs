//! Operating environment detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The operating environments feedback emission knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Darwin,
    Linux,
    #[serde(rename = "win32")]
    Windows,
    Unsupported,
}

impl Platform {
    /// Returns the platform this binary was built for.
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Unsupported
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Windows => "win32",
            Platform::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_matches_build_target() {
        let platform = Platform::detect();
        if cfg!(target_os = "macos") {
            assert_eq!(platform, Platform::Darwin);
        } else if cfg!(target_os = "linux") {
            assert_eq!(platform, Platform::Linux);
        } else if cfg!(target_os = "windows") {
            assert_eq!(platform, Platform::Windows);
        } else {
            assert_eq!(platform, Platform::Unsupported);
        }
    }

    #[test]
    fn windows_serializes_as_win32() {
        let json = serde_json::to_string(&Platform::Windows).unwrap();
        assert_eq!(json, "\"win32\"");
        assert_eq!(Platform::Windows.to_string(), "win32");
    }
}
