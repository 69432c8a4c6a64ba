//! Observer protocol for animation playback.

use crate::animation::Animation;
use crate::step::AnimationStep;

/// Receives playback notifications. Every method is optional.
///
/// Per run the order is fixed: `animation_will_start`, then
/// `animation_step_finished` once per step (per iteration when repeating),
/// then `animation_did_stop`. The animation is borrowed for the duration of
/// the call, so a delegate must not try to drive it from inside a callback.
///
/// Animations hold their delegate weakly and cancel themselves when it is
/// dropped mid-run.
pub trait AnimationDelegate {
    fn animation_will_start(&self, _animation: &Animation, _animated: bool) {}

    fn animation_did_stop(&self, _animation: &Animation, _animated: bool) {}

    fn animation_step_finished(&self, _animation: &Animation, _step: &AnimationStep, _animated: bool) {}
}
