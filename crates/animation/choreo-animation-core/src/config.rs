//! Core configuration for choreo-animation-core.

use serde::{Deserialize, Serialize};

use crate::interp::TimingCurve;

/// Defaults applied by step builders and the lifecycle guard.
/// Keep this minimal; expand as needed without breaking API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Duration (seconds) of a step whose builder never set one.
    pub default_step_duration: f32,
    /// Timing curve of a step whose builder never set one.
    pub default_curve: TimingCurve,
    /// Whether LifecycleGuard pauses running animations in the background.
    pub pause_in_background: bool,
    /// Slack a [`Scene`](crate::Scene) allows when deciding that a transition
    /// reached its end.
    pub tolerance: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_step_duration: 0.2,
            default_curve: TimingCurve::EaseInOut,
            pause_in_background: true,
            tolerance: 1e-4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "defaultStepDuration": 0.5 }"#).unwrap();
        assert_eq!(cfg.default_step_duration, 0.5);
        assert_eq!(cfg.default_curve, TimingCurve::EaseInOut);
        assert!(cfg.pause_in_background);
    }
}
