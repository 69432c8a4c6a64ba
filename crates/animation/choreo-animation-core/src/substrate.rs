//! Contract between the engine and the render/compositing system that
//! interpolates deltas over wall-clock time.
//!
//! The engine never caches absolute object state. Every request carries
//! relative deltas, and the substrate applies them on top of whatever each
//! object currently holds. Asynchronous transitions report back through
//! [`Animation::transition_did_stop`](crate::Animation::transition_did_stop).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ids::{ObjectId, TransitionId};
use crate::interp::TimingCurve;
use crate::object_animation::ObjectAnimation;

/// Which part of an object a step drives.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    /// The object's layout rectangle (planar scale and translation).
    Frame,
    /// The object's render layer (full 3D transform and layer extensions).
    Layer,
}

/// One timed transition over a set of objects.
#[derive(Copy, Clone, Debug)]
pub struct TransitionRequest<'a> {
    pub kind: StepKind,
    /// Full duration in seconds (> 0).
    pub duration: f32,
    pub curve: TimingCurve,
    /// Seconds already elapsed when the transition starts (0 = from the beginning).
    pub start_offset: f32,
    pub deltas: &'a IndexMap<ObjectId, ObjectAnimation>,
}

/// A transition that stopped on the substrate side.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Completion {
    pub transition: TransitionId,
    /// False when the substrate interrupted the transition before its end.
    pub finished: bool,
}

/// Render substrate driven by [`Animation`](crate::Animation).
///
/// Implementations must report every transition started with
/// [`begin_transition`](Substrate::begin_transition) or
/// [`begin_delay`](Substrate::begin_delay) exactly once, unless it was ended
/// early with [`finish_transition`](Substrate::finish_transition).
pub trait Substrate {
    /// Apply the end state of `delta` to `object` immediately.
    fn apply(&mut self, kind: StepKind, object: ObjectId, delta: &ObjectAnimation);

    /// Start interpolating every delta in `request`.
    fn begin_transition(&mut self, request: TransitionRequest<'_>) -> TransitionId;

    /// Start a timer that completes after `seconds`.
    fn begin_delay(&mut self, seconds: f32) -> TransitionId;

    fn pause_transition(&mut self, id: TransitionId);

    fn resume_transition(&mut self, id: TransitionId);

    fn is_transition_paused(&self, id: TransitionId) -> bool;

    /// Seconds of the transition played so far, net of pauses.
    fn elapsed(&self, id: TransitionId) -> f32;

    /// Jump to the end state now. No completion is reported afterwards.
    fn finish_transition(&mut self, id: TransitionId);
}
