//! Haptic feedback: pulse patterns and the player that feeds them to the engine.
//!
//! The engine is a native helper that owns the trackpad actuator. We only talk
//! to it through [`supervisor::HapticSupervisor`], one text line per pulse.

pub mod supervisor;

use crate::feedback::Feedback;
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
pub use supervisor::{
    default_actuator_candidates, ActuatorProcess, ActuatorSpawner, EngineHandle,
    HapticSupervisor, ProcessSpawner,
};

pub const MIN_INTENSITY: f64 = 0.0;
pub const MAX_INTENSITY: f64 = 2.0;
/// Substituted for intensities that are not finite.
pub const DEFAULT_INTENSITY: f64 = 2.0;

/// Named haptic patterns selectable from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticType {
    Success,
    Error,
}

/// One pulse sent to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticCommand {
    actuation_id: i32,
    intensity: f64,
}

impl HapticCommand {
    /// Builds a command with `intensity` clamped into the engine's range.
    pub fn new(actuation_id: i32, intensity: f64) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(MIN_INTENSITY, MAX_INTENSITY)
        } else {
            DEFAULT_INTENSITY
        };
        Self {
            actuation_id,
            intensity,
        }
    }

    pub fn actuation_id(&self) -> i32 {
        self.actuation_id
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    /// Wire form: `<actuationID>,<intensity>\n`.
    pub fn to_wire(&self) -> String {
        format!("{},{:.3}\n", self.actuation_id, self.intensity)
    }
}

/// A pulse followed by the pause before the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseStep {
    pub actuation_id: i32,
    pub intensity: f64,
    pub pause_after: Duration,
}

const fn step(actuation_id: i32, intensity: f64, pause_ms: u64) -> PulseStep {
    PulseStep {
        actuation_id,
        intensity,
        pause_after: Duration::from_millis(pause_ms),
    }
}

const SUCCESS_PATTERN: [PulseStep; 3] = [step(6, 0.8, 100), step(3, 1.0, 300), step(6, 1.0, 0)];
const ERROR_PATTERN: [PulseStep; 3] = [step(6, 0.5, 100), step(6, 1.0, 100), step(6, 0.5, 0)];

impl HapticType {
    pub fn pattern(self) -> &'static [PulseStep] {
        match self {
            HapticType::Success => &SUCCESS_PATTERN,
            HapticType::Error => &ERROR_PATTERN,
        }
    }

    /// Commands for this pattern with every step scaled by `scale`.
    pub fn commands(self, scale: Option<f64>) -> Vec<(HapticCommand, Duration)> {
        let scale = scale.filter(|s| s.is_finite()).unwrap_or(1.0);
        self.pattern()
            .iter()
            .map(|step| {
                (
                    HapticCommand::new(step.actuation_id, step.intensity * scale),
                    step.pause_after,
                )
            })
            .collect()
    }
}

/// Plays haptic patterns through a shared supervisor.
pub struct HapticPlayer {
    supervisor: Arc<HapticSupervisor>,
    platform: Platform,
}

impl HapticPlayer {
    pub fn new(supervisor: Arc<HapticSupervisor>, platform: Platform) -> Self {
        Self {
            supervisor,
            platform,
        }
    }

    /// Plays the full pattern. Stops at the first pulse the engine rejects.
    pub async fn play(&self, feedback: Feedback<HapticType>) -> bool {
        if self.platform != Platform::Darwin {
            tracing::debug!(platform = %self.platform, "Haptics unsupported on this platform");
            return false;
        }

        for (command, pause) in feedback.kind.commands(feedback.intensity) {
            if !self.supervisor.send_pulse(command).await {
                return false;
            }
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn intensity_is_clamped() {
        assert_eq!(HapticCommand::new(6, 3.5).intensity(), 2.0);
        assert_eq!(HapticCommand::new(6, -1.0).intensity(), 0.0);
        assert_eq!(HapticCommand::new(6, 1.25).intensity(), 1.25);
    }

    #[test]
    fn non_finite_intensity_uses_default() {
        assert_eq!(HapticCommand::new(6, f64::NAN).intensity(), DEFAULT_INTENSITY);
        assert_eq!(
            HapticCommand::new(6, f64::INFINITY).intensity(),
            DEFAULT_INTENSITY
        );
    }

    #[test]
    fn wire_format_is_two_fields_and_newline() {
        assert_eq!(HapticCommand::new(15, 1.0).to_wire(), "15,1.000\n");
        assert_eq!(HapticCommand::new(3, 9.0).to_wire(), "3,2.000\n");
    }

    #[test]
    fn success_pattern_shape() {
        let commands = HapticType::Success.commands(None);
        let ids: Vec<i32> = commands.iter().map(|(c, _)| c.actuation_id()).collect();
        assert_eq!(ids, vec![6, 3, 6]);
        assert_eq!(commands[0].1, Duration::from_millis(100));
        assert_eq!(commands[1].1, Duration::from_millis(300));
        assert!(commands[2].1.is_zero());
    }

    #[test]
    fn explicit_intensity_scales_and_clamps_every_step() {
        let commands = HapticType::Error.commands(Some(2.0));
        let intensities: Vec<f64> = commands.iter().map(|(c, _)| c.intensity()).collect();
        assert_eq!(intensities, vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn haptic_type_parses_lowercase() {
        let parsed: HapticType = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, HapticType::Error);
    }

    #[tokio::test]
    async fn player_is_a_no_op_off_macos() {
        let supervisor = Arc::new(HapticSupervisor::new(
            vec![PathBuf::from("/definitely/not/HapticEngine")],
            Arc::new(ProcessSpawner::new()),
        ));
        let player = HapticPlayer::new(supervisor.clone(), Platform::Linux);
        let played = player
            .play(Feedback {
                kind: HapticType::Success,
                intensity: None,
            })
            .await;

        assert!(!played);
        assert_eq!(supervisor.launch_count(), 0);
    }
}
