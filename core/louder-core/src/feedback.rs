//! Feedback selection values as they appear in config, and their resolved form.
//!
//! Config accepts `false`, `true`, a type name, or `{ "type": ..., "intensity": ... }`
//! for both `sound` and `haptic`. Everything downstream works on the resolved
//! [`Feedback`] record instead of the raw shape.

use crate::haptic::HapticType;
use crate::sound::SoundType;
use serde::{Deserialize, Deserializer};

/// A configured feedback selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedbackSetting<T> {
    /// `false`: emit nothing.
    Disabled,
    /// `true` or absent: use the caller's default type.
    DefaultType,
    /// A type name.
    Named(T),
    /// A type with an explicit intensity.
    Explicit { kind: T, intensity: f64 },
}

impl<T> Default for FeedbackSetting<T> {
    fn default() -> Self {
        FeedbackSetting::DefaultType
    }
}

/// Canonical record produced by [`FeedbackSetting::resolve`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feedback<T> {
    pub kind: T,
    /// `None` means the emitter's own default intensity.
    pub intensity: Option<f64>,
}

impl<T: Copy> FeedbackSetting<T> {
    /// Resolves against `default`, returning `None` when disabled.
    ///
    /// A non-finite explicit intensity falls back to the emitter default.
    pub fn resolve(&self, default: T) -> Option<Feedback<T>> {
        match *self {
            FeedbackSetting::Disabled => None,
            FeedbackSetting::DefaultType => Some(Feedback {
                kind: default,
                intensity: None,
            }),
            FeedbackSetting::Named(kind) => Some(Feedback {
                kind,
                intensity: None,
            }),
            FeedbackSetting::Explicit { kind, intensity } => Some(Feedback {
                kind,
                intensity: intensity.is_finite().then_some(intensity),
            }),
        }
    }
}

impl<T> From<Feedback<T>> for FeedbackSetting<T> {
    fn from(feedback: Feedback<T>) -> Self {
        match feedback.intensity {
            Some(intensity) => FeedbackSetting::Explicit {
                kind: feedback.kind,
                intensity,
            },
            None => FeedbackSetting::Named(feedback.kind),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSetting<T> {
    Flag(bool),
    Named(T),
    Explicit {
        #[serde(rename = "type")]
        kind: T,
        #[serde(default)]
        intensity: Option<f64>,
    },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FeedbackSetting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSetting::<T>::deserialize(deserializer)? {
            RawSetting::Flag(false) => FeedbackSetting::Disabled,
            RawSetting::Flag(true) => FeedbackSetting::DefaultType,
            RawSetting::Named(kind) => FeedbackSetting::Named(kind),
            RawSetting::Explicit {
                kind,
                intensity: Some(intensity),
            } => FeedbackSetting::Explicit { kind, intensity },
            RawSetting::Explicit {
                kind,
                intensity: None,
            } => FeedbackSetting::Named(kind),
        })
    }
}

/// Per-call overrides merged over a notifier's config when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedbackOverrides {
    pub sound: Option<FeedbackSetting<SoundType>>,
    pub haptic: Option<FeedbackSetting<HapticType>>,
}
