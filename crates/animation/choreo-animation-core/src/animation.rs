//! Animation: an ordered sequence of steps plus the playback state machine.
//!
//! Phases: `Idle -> [Delayed] -> Started <-> Paused -> Idle`, with
//! `Cancelling`/`Terminating` as transient phases while a forced stop notifies
//! the delegate. Steps run strictly in order; step i+1 starts once the
//! substrate reports step i finished (or immediately for synchronous steps).
//!
//! The animation never owns the substrate. Every call that touches objects
//! takes it as `&mut dyn Substrate`, and the host routes asynchronous
//! completions back through [`Animation::transition_did_stop`].

use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::delegate::AnimationDelegate;
use crate::error::AnimationError;
use crate::ids::TransitionId;
use crate::step::{AnimationStep, StepRun};
use crate::substrate::Substrate;
use crate::Result;

/// How many times a run replays the step sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Repeat {
    Times(u32),
    /// Repeat until cancelled or terminated. Animated runs only.
    Forever,
}

impl Default for Repeat {
    fn default() -> Self {
        Self::Times(1)
    }
}

/// Parameters of one run. Every `play*` entry point funnels into
/// [`Animation::play_with`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlayOptions {
    pub animated: bool,
    /// Seconds before the first step starts. Negative values clamp to 0.
    pub delay: f32,
    pub repeat: Repeat,
    /// Offset into the step sequence to start from.
    pub start_time: f32,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayOptions {
    #[inline]
    pub fn new() -> Self {
        Self {
            animated: true,
            delay: 0.0,
            repeat: Repeat::Times(1),
            start_time: 0.0,
        }
    }

    #[inline]
    pub fn immediate(mut self) -> Self {
        self.animated = false;
        self
    }

    #[inline]
    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    #[inline]
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    #[inline]
    pub fn with_start_time(mut self, seconds: f32) -> Self {
        self.start_time = seconds;
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Phase {
    Idle,
    Delayed,
    DelayPaused,
    Started,
    Paused,
    Cancelling,
    Terminating,
}

#[derive(Debug)]
struct RunState {
    animated: bool,
    repeat: Repeat,
    /// Completed passes over the step sequence.
    iteration: u32,
    /// Index of the step playing now, or the next one to play.
    cursor: usize,
    current: Option<StepRun>,
    delay: Option<TransitionId>,
    /// Offset into the step at `cursor`, consumed when it starts.
    seek: f32,
    start_time: f32,
    auto_paused: bool,
    will_start_sent: bool,
    /// Duration of steps already finished in this run.
    elapsed: f32,
}

impl RunState {
    fn last_iteration(&self) -> bool {
        match self.repeat {
            Repeat::Times(n) => self.iteration + 1 >= n,
            Repeat::Forever => false,
        }
    }
}

pub struct Animation {
    steps: Vec<AnimationStep>,
    tag: Option<String>,
    user_info: Option<serde_json::Value>,
    locking_ui: bool,
    delegate: Option<Weak<dyn AnimationDelegate>>,
    phase: Phase,
    run: Option<RunState>,
}

impl Animation {
    pub fn new(steps: impl IntoIterator<Item = AnimationStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            tag: None,
            user_info: None,
            locking_ui: false,
            delegate: None,
            phase: Phase::Idle,
            run: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach opaque caller data. Not carried over to derived animations.
    pub fn with_user_info(mut self, info: serde_json::Value) -> Self {
        self.user_info = Some(info);
        self
    }

    /// Mark the animation as one during which the host should ignore input.
    pub fn with_locking_ui(mut self, locking: bool) -> Self {
        self.locking_ui = locking;
        self
    }

    /// Observe playback through `delegate`, held weakly.
    pub fn set_delegate<D: AnimationDelegate + 'static>(&mut self, delegate: &Rc<D>) {
        let weak: Weak<D> = Rc::downgrade(delegate);
        self.delegate = Some(weak);
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn user_info(&self) -> Option<&serde_json::Value> {
        self.user_info.as_ref()
    }

    pub fn is_locking_ui(&self) -> bool {
        self.locking_ui
    }

    /// Sum of step durations. Delay and repeats are not included.
    pub fn duration(&self) -> f32 {
        self.steps.iter().map(AnimationStep::duration).sum()
    }

    // ---------- state flags ----------

    /// From the play call (delay included) until the run stops.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Started and not paused.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Started
    }

    /// Past the initial delay.
    #[inline]
    pub fn is_started(&self) -> bool {
        matches!(
            self.phase,
            Phase::Started | Phase::Paused | Phase::Cancelling | Phase::Terminating
        )
    }

    /// Paused explicitly or by the lifecycle guard, delay included.
    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused | Phase::DelayPaused)
    }

    #[inline]
    pub fn is_cancelling(&self) -> bool {
        self.phase == Phase::Cancelling
    }

    #[inline]
    pub fn is_terminating(&self) -> bool {
        self.phase == Phase::Terminating
    }

    /// Paused because the host went to the background.
    pub fn is_auto_paused(&self) -> bool {
        self.run.as_ref().map_or(false, |run| run.auto_paused)
    }

    /// Whether the current run is animated. False when idle.
    pub fn is_animated(&self) -> bool {
        self.run.as_ref().map_or(false, |run| run.animated)
    }

    /// Seconds played in the current run, net of pauses. 0 when idle.
    pub fn elapsed_time(&self, substrate: &dyn Substrate) -> f32 {
        self.run.as_ref().map_or(0.0, |run| {
            run.elapsed
                + run
                    .current
                    .as_ref()
                    .map_or(0.0, |current| current.elapsed_time(substrate))
        })
    }

    // ---------- playback ----------

    /// Play every step once. Non-animated runs finish before returning.
    pub fn play(&mut self, substrate: &mut dyn Substrate, animated: bool) -> Result<()> {
        let options = if animated {
            PlayOptions::new()
        } else {
            PlayOptions::new().immediate()
        };
        self.play_with(substrate, options)
    }

    /// Animated run starting after `delay` seconds (negative clamps to 0).
    pub fn play_after_delay(&mut self, substrate: &mut dyn Substrate, delay: f32) -> Result<()> {
        self.play_with(substrate, PlayOptions::new().with_delay(delay))
    }

    pub fn play_with_repeat_count(
        &mut self,
        substrate: &mut dyn Substrate,
        repeat: Repeat,
        animated: bool,
    ) -> Result<()> {
        let options = PlayOptions::new().with_repeat(repeat);
        let options = if animated { options } else { options.immediate() };
        self.play_with(substrate, options)
    }

    /// Animated run starting `start_time` seconds into the sequence. Steps
    /// that end before that offset are applied silently.
    pub fn play_with_start_time(&mut self, substrate: &mut dyn Substrate, start_time: f32) -> Result<()> {
        self.play_with(substrate, PlayOptions::new().with_start_time(start_time))
    }

    pub fn play_with(&mut self, substrate: &mut dyn Substrate, options: PlayOptions) -> Result<()> {
        if self.phase != Phase::Idle {
            return Err(AnimationError::AlreadyRunning {
                tag: self.tag.clone(),
            });
        }
        match options.repeat {
            Repeat::Times(0) => {
                return Err(AnimationError::InvalidRepeatCount {
                    reason: "repeat count must be at least 1".into(),
                })
            }
            Repeat::Forever if !options.animated => {
                return Err(AnimationError::InvalidRepeatCount {
                    reason: "infinite repeat requires an animated run".into(),
                })
            }
            Repeat::Forever if self.duration() <= 0.0 => {
                return Err(AnimationError::InvalidRepeatCount {
                    reason: "infinite repeat requires a positive duration".into(),
                })
            }
            _ => {}
        }

        let delay = if options.animated { non_negative(options.delay) } else { 0.0 };
        let start_time = non_negative(options.start_time);
        self.run = Some(RunState {
            animated: options.animated,
            repeat: options.repeat,
            iteration: 0,
            cursor: 0,
            current: None,
            delay: None,
            seek: 0.0,
            start_time,
            auto_paused: false,
            will_start_sent: false,
            elapsed: 0.0,
        });

        if delay > 0.0 {
            let timer = substrate.begin_delay(delay);
            if let Some(run) = self.run.as_mut() {
                run.delay = Some(timer);
            }
            self.phase = Phase::Delayed;
            debug!("animation {:?}: delayed {delay}s", self.tag);
            return Ok(());
        }
        self.begin(substrate);
        Ok(())
    }

    /// Pause an animated run. No effect when idle or already paused.
    pub fn pause(&mut self, substrate: &mut dyn Substrate) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match self.phase {
            Phase::Started if run.animated => {
                if let Some(current) = run.current {
                    current.pause(substrate);
                }
                self.phase = Phase::Paused;
                debug!("animation {:?}: paused", self.tag);
            }
            Phase::Delayed => {
                if let Some(timer) = run.delay {
                    substrate.pause_transition(timer);
                }
                self.phase = Phase::DelayPaused;
                debug!("animation {:?}: paused during delay", self.tag);
            }
            _ => {}
        }
        // an explicit pause is not undone by the next foreground signal
        run.auto_paused = false;
    }

    /// Resume after [`pause`](Self::pause). No effect unless paused.
    pub fn resume(&mut self, substrate: &mut dyn Substrate) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let mut between_steps = false;
        match self.phase {
            Phase::Paused => {
                match run.current {
                    Some(current) => current.resume(substrate),
                    None => between_steps = true,
                }
                self.phase = Phase::Started;
            }
            Phase::DelayPaused => {
                if let Some(timer) = run.delay {
                    substrate.resume_transition(timer);
                }
                self.phase = Phase::Delayed;
            }
            _ => return,
        }
        run.auto_paused = false;
        debug!("animation {:?}: resumed", self.tag);
        // a step finished while paused; pick up with the next one
        if between_steps {
            self.play_next(substrate);
        }
    }

    /// Drive every remaining object to the final state and stop. Only
    /// `animation_did_stop` is reported, while [`is_cancelling`](Self::is_cancelling) holds.
    pub fn cancel(&mut self, substrate: &mut dyn Substrate) {
        self.force_stop(substrate, Phase::Cancelling);
    }

    /// Like [`cancel`](Self::cancel), but every remaining step still reports
    /// `animation_step_finished`, all with `animated = false`.
    pub fn terminate(&mut self, substrate: &mut dyn Substrate) {
        self.force_stop(substrate, Phase::Terminating);
    }

    /// Route a substrate completion to this animation. Unknown or stale ids
    /// are ignored.
    pub fn transition_did_stop(&mut self, substrate: &mut dyn Substrate, transition: TransitionId, finished: bool) {
        let Some(run) = self.run.as_mut() else {
            warn!("animation {:?}: completion {transition:?} while idle", self.tag);
            return;
        };
        if run.delay == Some(transition) {
            run.delay = None;
            self.begin(substrate);
            return;
        }
        if run.current.map(|c| c.transition()) != Some(transition) {
            warn!("animation {:?}: ignoring stale completion {transition:?}", self.tag);
            return;
        }
        if !finished {
            debug!("animation {:?}: step {} interrupted by the substrate", self.tag, run.cursor);
        }
        run.current = None;
        let index = run.cursor;
        let animated = run.animated;
        run.elapsed += self.steps[index].duration();
        run.cursor += 1;

        if self.cancel_if_orphaned(substrate) {
            return;
        }
        self.notify_step_finished(index, animated);
        self.play_next(substrate);
    }

    /// Whether `transition` is the delay timer or the step this run is waiting on.
    pub fn owns_transition(&self, transition: TransitionId) -> bool {
        self.run.as_ref().map_or(false, |run| {
            run.delay == Some(transition) || run.current.map(|c| c.transition()) == Some(transition)
        })
    }

    /// Cancel the run when the delegate has been dropped. Returns whether it did.
    pub fn cancel_if_orphaned(&mut self, substrate: &mut dyn Substrate) -> bool {
        let orphaned = matches!(&self.delegate, Some(weak) if weak.strong_count() == 0);
        if !orphaned || !self.is_running() {
            return false;
        }
        warn!("animation {:?}: delegate dropped while running, cancelling", self.tag);
        self.delegate = None;
        self.cancel(substrate);
        true
    }

    pub(crate) fn pause_for_background(&mut self, substrate: &mut dyn Substrate) {
        let eligible = matches!(self.phase, Phase::Started | Phase::Delayed) && self.is_animated();
        if !eligible {
            return;
        }
        self.pause(substrate);
        if let Some(run) = self.run.as_mut() {
            run.auto_paused = true;
        }
        debug!("animation {:?}: auto-paused", self.tag);
    }

    pub(crate) fn resume_for_foreground(&mut self, substrate: &mut dyn Substrate) {
        if self.is_auto_paused() {
            self.resume(substrate);
        }
    }

    // ---------- derived animations ----------

    /// Steps reversed in order, each inverted. Tag becomes `reverse_<tag>`.
    pub fn reverse_animation(&self) -> Animation {
        let steps = self.steps.iter().rev().map(AnimationStep::reverse_step);
        self.derive(steps, self.tag.as_ref().map(|tag| format!("reverse_{tag}")))
    }

    /// Self followed by its reverse. Appended step tags read `loop_reverse_<tag>`.
    pub fn loop_animation(&self) -> Animation {
        let reversed = self.reverse_animation();
        let steps = self
            .steps
            .iter()
            .cloned()
            .chain(reversed.steps.iter().map(|step| step.with_tag_prefix("loop_")));
        self.derive(steps, self.tag.as_ref().map(|tag| format!("loop_{tag}")))
    }

    /// Same animation with every step rescaled so the total is `duration`.
    /// A zero-length animation keeps its steps unchanged.
    pub fn with_duration(&self, duration: f32) -> Result<Animation> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(AnimationError::InvalidDuration { duration });
        }
        let total = self.duration();
        let steps: Vec<AnimationStep> = if total <= 0.0 {
            self.steps.clone()
        } else {
            let factor = duration / total;
            self.steps.iter().map(|step| step.scaled(factor)).collect()
        };
        Ok(self.derive(steps, self.tag.clone()).with_user_info_from(self))
    }

    fn derive(&self, steps: impl IntoIterator<Item = AnimationStep>, tag: Option<String>) -> Animation {
        Animation {
            tag,
            locking_ui: self.locking_ui,
            delegate: self.delegate.clone(),
            ..Animation::new(steps)
        }
    }

    fn with_user_info_from(mut self, other: &Animation) -> Self {
        self.user_info = other.user_info.clone();
        self
    }

    // ---------- internals ----------

    /// Leave the delay (or the play call) and start stepping.
    fn begin(&mut self, substrate: &mut dyn Substrate) {
        if self.cancel_if_orphaned(substrate) {
            return;
        }
        self.phase = Phase::Started;
        let animated = self.is_animated();
        self.notify_will_start(animated);
        debug!("animation {:?}: started (animated: {animated})", self.tag);
        self.skip_to_start_time(substrate);
        self.play_next(substrate);
    }

    /// Apply every step that ends at or before the requested start time.
    fn skip_to_start_time(&mut self, substrate: &mut dyn Substrate) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        let target = run.start_time;
        if target <= 0.0 {
            return;
        }
        let mut offset = 0.0;
        while let Some(step) = self.steps.get(run.cursor) {
            if target < offset + step.duration() {
                break;
            }
            step.apply_end_state(substrate);
            offset += step.duration();
            run.cursor += 1;
        }
        run.seek = target - offset;
        run.elapsed = offset;
        debug!("animation {:?}: seeked to step {} (+{}s)", self.tag, run.cursor, run.seek);
    }

    /// Start steps from the cursor until one is in flight or the run is over.
    fn play_next(&mut self, substrate: &mut dyn Substrate) {
        loop {
            if self.phase != Phase::Started {
                return;
            }
            let Some(run) = self.run.as_mut() else {
                return;
            };
            if run.cursor >= self.steps.len() {
                if run.last_iteration() {
                    self.finish(true);
                    return;
                }
                run.iteration += 1;
                run.cursor = 0;
                continue;
            }
            let index = run.cursor;
            let seek = std::mem::take(&mut run.seek);
            let animated = run.animated;
            let step = &self.steps[index];
            match step.play(substrate, seek, animated) {
                Some(current) => {
                    run.current = Some(current);
                    debug!("animation {:?}: step {index} in flight", self.tag);
                    return;
                }
                None => {
                    run.elapsed += step.duration();
                    run.cursor += 1;
                    self.notify_step_finished(index, animated);
                }
            }
        }
    }

    fn force_stop(&mut self, substrate: &mut dyn Substrate, phase: Phase) {
        if matches!(self.phase, Phase::Idle | Phase::Cancelling | Phase::Terminating) {
            return;
        }
        let notify_steps = phase == Phase::Terminating;
        self.phase = phase;
        debug!("animation {:?}: {phase:?}", self.tag);
        self.notify_will_start(false);

        let Some(run) = self.run.as_mut() else {
            self.phase = Phase::Idle;
            return;
        };
        if let Some(timer) = run.delay.take() {
            substrate.finish_transition(timer);
        }
        if let Some(current) = run.current.take() {
            current.terminate(substrate);
            let index = run.cursor;
            run.elapsed += self.steps[index].duration();
            run.cursor += 1;
            if notify_steps {
                self.notify_step_finished(index, false);
            }
        }
        self.fast_forward(substrate, notify_steps);
        self.finish(false);
    }

    /// Apply the remaining steps of this iteration, then any remaining
    /// finite iterations. Infinite runs stop at the end of the current pass.
    fn fast_forward(&mut self, substrate: &mut dyn Substrate, notify_steps: bool) {
        loop {
            let Some(run) = self.run.as_mut() else {
                return;
            };
            if run.cursor >= self.steps.len() {
                if run.last_iteration() || run.repeat == Repeat::Forever {
                    return;
                }
                run.iteration += 1;
                run.cursor = 0;
                continue;
            }
            let index = run.cursor;
            let step = &self.steps[index];
            step.apply_end_state(substrate);
            run.elapsed += step.duration();
            run.cursor += 1;
            if notify_steps {
                self.notify_step_finished(index, false);
            }
        }
    }

    fn finish(&mut self, completed: bool) {
        let animated = completed && self.is_animated();
        debug!("animation {:?}: stopped (animated: {animated})", self.tag);
        if let Some(delegate) = self.live_delegate() {
            delegate.animation_did_stop(self, animated);
        }
        self.phase = Phase::Idle;
        self.run = None;
    }

    fn live_delegate(&self) -> Option<Rc<dyn AnimationDelegate>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    /// willStart fires once per run, even for runs stopped during their delay.
    fn notify_will_start(&mut self, animated: bool) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if std::mem::replace(&mut run.will_start_sent, true) {
            return;
        }
        if let Some(delegate) = self.live_delegate() {
            delegate.animation_will_start(self, animated);
        }
    }

    fn notify_step_finished(&self, index: usize, animated: bool) {
        debug!("animation {:?}: step {index} finished", self.tag);
        let Some(step) = self.steps.get(index) else {
            return;
        };
        if let Some(callback) = step.on_finish() {
            callback.call(animated);
        }
        if let Some(delegate) = self.live_delegate() {
            delegate.animation_step_finished(self, step, animated);
        }
    }
}

fn non_negative(seconds: f32) -> f32 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("tag", &self.tag)
            .field("steps", &self.steps.len())
            .field("duration", &self.duration())
            .field("phase", &self.phase)
            .field("locking_ui", &self.locking_ui)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ObjectId;
    use crate::object_animation::ObjectAnimation;
    use crate::scene::Scene;
    use crate::transform::Rect;

    fn two_steps(obj: ObjectId) -> Animation {
        Animation::new([
            AnimationStep::layer()
                .tag("grow")
                .duration(0.2)
                .animate(obj, ObjectAnimation::new().with_planar_scale(2.0, 2.0))
                .build()
                .unwrap(),
            AnimationStep::layer()
                .tag("fade")
                .duration(0.3)
                .animate(obj, ObjectAnimation::new().with_opacity_delta(-0.5))
                .build()
                .unwrap(),
        ])
        .with_tag("intro")
    }

    #[test]
    fn flags_follow_the_phase() {
        let mut scene = Scene::new();
        let obj = scene.add_object(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut anim = two_steps(obj);
        assert!(!anim.is_running());

        anim.play(&mut scene, true).unwrap();
        assert!(anim.is_running() && anim.is_started() && anim.is_playing());
        assert!(!anim.is_paused());

        anim.pause(&mut scene);
        assert!(anim.is_paused() && !anim.is_playing() && anim.is_started());
        anim.pause(&mut scene);
        assert!(anim.is_paused());

        anim.resume(&mut scene);
        assert!(anim.is_playing());
    }

    #[test]
    fn replaying_a_running_animation_fails() {
        let mut scene = Scene::new();
        let obj = scene.add_object(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut anim = two_steps(obj);
        anim.play(&mut scene, true).unwrap();
        let err = anim.play(&mut scene, true).unwrap_err();
        assert_eq!(err, AnimationError::AlreadyRunning { tag: Some("intro".into()) });
    }

    #[test]
    fn repeat_count_is_validated() {
        let mut scene = Scene::new();
        let obj = scene.add_object(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut anim = two_steps(obj);
        assert!(matches!(
            anim.play_with_repeat_count(&mut scene, Repeat::Times(0), true),
            Err(AnimationError::InvalidRepeatCount { .. })
        ));
        assert!(matches!(
            anim.play_with_repeat_count(&mut scene, Repeat::Forever, false),
            Err(AnimationError::InvalidRepeatCount { .. })
        ));
        assert!(!anim.is_running());
    }

    #[test]
    fn delay_pause_is_observable() {
        let mut scene = Scene::new();
        let obj = scene.add_object(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut anim = two_steps(obj);
        anim.play_after_delay(&mut scene, 0.5).unwrap();
        assert!(anim.is_running());
        assert!(!anim.is_started());

        anim.pause(&mut scene);
        assert!(anim.is_paused());
        scene.drive(&mut anim, 1.0);
        assert!(!anim.is_started());

        anim.resume(&mut scene);
        scene.drive(&mut anim, 0.5);
        assert!(anim.is_started());
    }

    #[test]
    fn negative_delay_starts_immediately() {
        let mut scene = Scene::new();
        let obj = scene.add_object(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut anim = two_steps(obj);
        anim.play_after_delay(&mut scene, -3.0).unwrap();
        assert!(anim.is_started());
    }

    #[test]
    fn with_duration_rescales_proportionally() {
        let anim = two_steps(ObjectId(0)).with_user_info(serde_json::json!({ "k": 1 }));
        let scaled = anim.with_duration(1.0).unwrap();
        assert!((scaled.duration() - 1.0).abs() < 1e-6);
        assert!((scaled.steps()[0].duration() - 0.4).abs() < 1e-6);
        assert!((scaled.steps()[1].duration() - 0.6).abs() < 1e-6);
        assert_eq!(scaled.tag(), Some("intro"));
        assert!(scaled.user_info().is_some());
        assert_eq!(
            anim.with_duration(-1.0).unwrap_err(),
            AnimationError::InvalidDuration { duration: -1.0 }
        );
    }

    #[test]
    fn derived_tags() {
        let anim = two_steps(ObjectId(0)).with_user_info(serde_json::json!("private"));
        let reversed = anim.reverse_animation();
        assert_eq!(reversed.tag(), Some("reverse_intro"));
        assert!(reversed.user_info().is_none());
        let tags: Vec<_> = reversed.steps().iter().map(|s| s.tag()).collect();
        assert_eq!(tags, vec![Some("reverse_fade"), Some("reverse_grow")]);

        let looped = anim.loop_animation();
        assert_eq!(looped.tag(), Some("loop_intro"));
        let tags: Vec<_> = looped.steps().iter().map(|s| s.tag()).collect();
        assert_eq!(
            tags,
            vec![Some("grow"), Some("fade"), Some("loop_reverse_fade"), Some("loop_reverse_grow")]
        );
    }

    #[test]
    fn elapsed_time_tracks_the_current_step() {
        let mut scene = Scene::new();
        let obj = scene.add_object(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut anim = two_steps(obj);
        anim.play(&mut scene, true).unwrap();
        scene.drive(&mut anim, 0.1);
        assert!((anim.elapsed_time(&scene) - 0.1).abs() < 1e-5);
        scene.drive(&mut anim, 0.1);
        scene.drive(&mut anim, 0.1);
        assert!((anim.elapsed_time(&scene) - 0.3).abs() < 1e-5);
    }
}
