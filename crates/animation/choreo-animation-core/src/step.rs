//! Animation steps: one timed, curve-shaped change over a set of objects.
//!
//! Two variants share the same body:
//! - [`FrameAnimationStep`] drives layout rectangles. Planar scale and
//!   translation only, and it cannot start mid-way: seeking into it plays it
//!   from its own start and its elapsed time always reads as the full duration.
//! - [`LayerAnimationStep`] drives render layers with the full 3D delta,
//!   layer extensions included, and can resume at any offset.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::config::Config;
use crate::error::AnimationError;
use crate::ids::{ObjectId, TransitionId};
use crate::interp::TimingCurve;
use crate::object_animation::ObjectAnimation;
use crate::substrate::{StepKind, Substrate, TransitionRequest};
use crate::Result;

/// Callback run once a step has finished, with whether it ran animated.
#[derive(Clone)]
pub struct StepCompletion(Rc<dyn Fn(bool)>);

impl StepCompletion {
    pub fn new(callback: impl Fn(bool) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub(crate) fn call(&self, animated: bool) {
        (self.0)(animated)
    }
}

impl fmt::Debug for StepCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepCompletion(..)")
    }
}

impl PartialEq for StepCompletion {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct StepBody {
    duration: f32,
    curve: TimingCurve,
    tag: Option<String>,
    user_info: Option<serde_json::Value>,
    on_finish: Option<StepCompletion>,
    objects: IndexMap<ObjectId, ObjectAnimation>,
}

impl StepBody {
    fn new(config: &Config) -> Self {
        Self {
            duration: config.default_step_duration,
            curve: config.default_curve,
            tag: None,
            user_info: None,
            on_finish: None,
            objects: IndexMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameAnimationStep {
    body: StepBody,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerAnimationStep {
    body: StepBody,
}

/// A step of an [`Animation`](crate::Animation).
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationStep {
    Frame(FrameAnimationStep),
    Layer(LayerAnimationStep),
}

impl AnimationStep {
    /// Builder for a frame step with default duration and curve.
    pub fn frame() -> StepBuilder {
        StepBuilder::new(StepKind::Frame, &Config::default())
    }

    /// Builder for a layer step with default duration and curve.
    pub fn layer() -> StepBuilder {
        StepBuilder::new(StepKind::Layer, &Config::default())
    }

    pub fn frame_with(config: &Config) -> StepBuilder {
        StepBuilder::new(StepKind::Frame, config)
    }

    pub fn layer_with(config: &Config) -> StepBuilder {
        StepBuilder::new(StepKind::Layer, config)
    }

    fn body(&self) -> &StepBody {
        match self {
            Self::Frame(step) => &step.body,
            Self::Layer(step) => &step.body,
        }
    }

    fn body_mut(&mut self) -> &mut StepBody {
        match self {
            Self::Frame(step) => &mut step.body,
            Self::Layer(step) => &mut step.body,
        }
    }

    fn from_body(kind: StepKind, body: StepBody) -> Self {
        match kind {
            StepKind::Frame => Self::Frame(FrameAnimationStep { body }),
            StepKind::Layer => Self::Layer(LayerAnimationStep { body }),
        }
    }

    #[inline]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::Frame(_) => StepKind::Frame,
            Self::Layer(_) => StepKind::Layer,
        }
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.body().duration
    }

    #[inline]
    pub fn curve(&self) -> TimingCurve {
        self.body().curve
    }

    pub fn tag(&self) -> Option<&str> {
        self.body().tag.as_deref()
    }

    pub fn user_info(&self) -> Option<&serde_json::Value> {
        self.body().user_info.as_ref()
    }

    pub(crate) fn on_finish(&self) -> Option<&StepCompletion> {
        self.body().on_finish.as_ref()
    }

    /// Mapped objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.body().objects.keys().copied()
    }

    pub fn object_count(&self) -> usize {
        self.body().objects.len()
    }

    pub fn object_animation(&self, object: ObjectId) -> Option<&ObjectAnimation> {
        self.body().objects.get(&object)
    }

    /// Net opacity delta for `object`; 0 when unmapped.
    pub fn alpha_variation(&self, object: ObjectId) -> f32 {
        self.object_animation(object)
            .map_or(0.0, ObjectAnimation::opacity_delta)
    }

    /// Whether the step can start part-way through its duration.
    #[inline]
    pub fn supports_seeking(&self) -> bool {
        matches!(self, Self::Layer(_))
    }

    /// Map `object` to `delta`. An object may be mapped once per step.
    pub fn add_animation(&mut self, object: ObjectId, delta: ObjectAnimation) -> Result<()> {
        if self.kind() == StepKind::Frame {
            if let Some(reason) = delta.frame_incompatibility() {
                return Err(AnimationError::UnsupportedDelta {
                    step_kind: "frame".into(),
                    reason: reason.into(),
                });
            }
        }
        let objects = &mut self.body_mut().objects;
        if objects.contains_key(&object) {
            return Err(AnimationError::DuplicateObject { object });
        }
        objects.insert(object, delta);
        Ok(())
    }

    /// Same objects, duration, curve and user info with every delta inverted.
    /// The completion callback stays with the forward step.
    pub fn reverse_step(&self) -> AnimationStep {
        let body = self.body();
        let reversed = StepBody {
            duration: body.duration,
            curve: body.curve,
            tag: body.tag.as_ref().map(|tag| format!("reverse_{tag}")),
            user_info: body.user_info.clone(),
            on_finish: None,
            objects: body
                .objects
                .iter()
                .map(|(object, delta)| (*object, delta.inverse()))
                .collect(),
        };
        Self::from_body(self.kind(), reversed)
    }

    /// Copy with `prefix` prepended to the tag. Untagged steps stay untagged.
    pub fn with_tag_prefix(&self, prefix: &str) -> AnimationStep {
        let mut step = self.clone();
        if let Some(tag) = step.body_mut().tag.as_mut() {
            tag.insert_str(0, prefix);
        }
        step
    }

    pub(crate) fn scaled(&self, factor: f32) -> AnimationStep {
        let mut step = self.clone();
        step.body_mut().duration *= factor;
        step
    }

    /// Apply every mapped delta's end state immediately.
    pub fn apply_end_state(&self, substrate: &mut dyn Substrate) {
        let kind = self.kind();
        for (object, delta) in &self.body().objects {
            substrate.apply(kind, *object, delta);
        }
    }

    /// Start the step `start_offset` seconds in.
    ///
    /// Returns `None` when the step completed synchronously: not animated, or
    /// zero duration. Frame steps ignore the offset and always start from 0.
    pub fn play(&self, substrate: &mut dyn Substrate, start_offset: f32, animated: bool) -> Option<StepRun> {
        let body = self.body();
        if !animated || body.duration <= 0.0 {
            self.apply_end_state(substrate);
            return None;
        }
        let start_offset = if self.supports_seeking() {
            start_offset.clamp(0.0, body.duration)
        } else {
            0.0
        };
        let transition = substrate.begin_transition(TransitionRequest {
            kind: self.kind(),
            duration: body.duration,
            curve: body.curve,
            start_offset,
            deltas: &body.objects,
        });
        Some(StepRun {
            transition,
            kind: self.kind(),
            duration: body.duration,
        })
    }
}

/// Handle to a step in flight on a substrate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepRun {
    transition: TransitionId,
    kind: StepKind,
    duration: f32,
}

impl StepRun {
    #[inline]
    pub fn transition(&self) -> TransitionId {
        self.transition
    }

    pub fn pause(&self, substrate: &mut dyn Substrate) {
        substrate.pause_transition(self.transition);
    }

    pub fn resume(&self, substrate: &mut dyn Substrate) {
        substrate.resume_transition(self.transition);
    }

    pub fn is_paused(&self, substrate: &dyn Substrate) -> bool {
        substrate.is_transition_paused(self.transition)
    }

    /// Force the end state; the substrate will not report this transition.
    pub fn terminate(&self, substrate: &mut dyn Substrate) {
        substrate.finish_transition(self.transition);
    }

    /// Run time net of pauses. Frame steps always report their full duration.
    pub fn elapsed_time(&self, substrate: &dyn Substrate) -> f32 {
        match self.kind {
            StepKind::Frame => self.duration,
            StepKind::Layer => substrate.elapsed(self.transition),
        }
    }
}

/// By-value builder for [`AnimationStep`]. The first failing call is
/// remembered and returned from [`build`](StepBuilder::build).
#[derive(Clone, Debug)]
pub struct StepBuilder {
    step: AnimationStep,
    error: Option<AnimationError>,
}

impl StepBuilder {
    fn new(kind: StepKind, config: &Config) -> Self {
        Self {
            step: AnimationStep::from_body(kind, StepBody::new(config)),
            error: None,
        }
    }

    /// Duration in seconds. Negative and non-finite values are rejected.
    pub fn duration(mut self, seconds: f32) -> Self {
        if !seconds.is_finite() || seconds < 0.0 {
            self.error.get_or_insert(AnimationError::InvalidDuration { duration: seconds });
        } else {
            self.step.body_mut().duration = seconds;
        }
        self
    }

    pub fn curve(mut self, curve: TimingCurve) -> Self {
        self.step.body_mut().curve = curve;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.step.body_mut().tag = Some(tag.into());
        self
    }

    /// Opaque data for the host, carried by derived steps.
    pub fn user_info(mut self, info: serde_json::Value) -> Self {
        self.step.body_mut().user_info = Some(info);
        self
    }

    /// Run `callback` each time the step finishes, before the delegate hears of it.
    pub fn on_finish(mut self, callback: impl Fn(bool) + 'static) -> Self {
        self.step.body_mut().on_finish = Some(StepCompletion::new(callback));
        self
    }

    pub fn animate(mut self, object: ObjectId, delta: ObjectAnimation) -> Self {
        if let Err(err) = self.step.add_animation(object, delta) {
            self.error.get_or_insert(err);
        }
        self
    }

    pub fn build(self) -> Result<AnimationStep> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.step),
        }
    }
}
