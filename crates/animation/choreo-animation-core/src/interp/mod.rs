//! Timing curves applied by substrates while a step is in flight.
//!
//! Named curves use the usual compositor control points; custom curves take
//! (x1, y1, x2, y2) with x in [0,1].

pub mod functions;

use serde::{Deserialize, Serialize};

use self::functions::bezier_ease_t;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimingCurve {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
    CubicBezier([f32; 4]),
}

impl TimingCurve {
    /// Cubic bezier control points (x1, y1, x2, y2) for this curve.
    pub fn control_points(&self) -> [f32; 4] {
        match self {
            Self::Linear => [0.0, 0.0, 1.0, 1.0],
            Self::EaseIn => [0.42, 0.0, 1.0, 1.0],
            Self::EaseOut => [0.0, 0.0, 0.58, 1.0],
            Self::EaseInOut => [0.42, 0.0, 0.58, 1.0],
            Self::CubicBezier(ctrl) => *ctrl,
        }
    }

    /// Map linear progress in [0,1] to eased progress.
    #[inline]
    pub fn ease(&self, progress: f32) -> f32 {
        let [x1, y1, x2, y2] = self.control_points();
        bezier_ease_t(progress, x1, y1, x2, y2)
    }
}
