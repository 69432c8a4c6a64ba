//! In-memory reference substrate.
//!
//! `Scene` owns the absolute state of every object and interpolates
//! transitions when the host calls [`Scene::advance`]. Frame transitions act
//! on the layout rectangle, layer transitions on the render transform.

use indexmap::IndexMap;
use log::trace;
use nalgebra::{Matrix4, UnitQuaternion, Vector3};

use crate::animation::Animation;
use crate::config::Config;
use crate::ids::{IdAllocator, ObjectId, TransitionId};
use crate::interp::functions::{lerp_f32, lerp_vec3};
use crate::interp::TimingCurve;
use crate::object_animation::ObjectAnimation;
use crate::substrate::{Completion, StepKind, Substrate, TransitionRequest};
use crate::transform::{perspective, Rect, TransformParameters};

/// Absolute rotation, scale and translation of a layer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayerState {
    pub rotation: UnitQuaternion<f32>,
    pub scale: [f32; 3],
    pub translation: [f32; 3],
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            scale: [1.0; 3],
            translation: [0.0; 3],
        }
    }
}

impl LayerState {
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::from(self.translation))
            * Matrix4::new_nonuniform_scaling(&Vector3::from(self.scale))
            * self.rotation.to_homogeneous()
    }

    fn advanced(&self, delta: &TransformParameters, p: f32) -> Self {
        let scale = lerp_vec3([1.0; 3], delta.scale, p);
        Self {
            rotation: delta.rotation.quaternion_scaled(p) * self.rotation,
            scale: [
                self.scale[0] * scale[0],
                self.scale[1] * scale[1],
                self.scale[2] * scale[2],
            ],
            translation: lerp_vec3(
                self.translation,
                [
                    self.translation[0] + delta.translation[0],
                    self.translation[1] + delta.translation[1],
                    self.translation[2] + delta.translation[2],
                ],
                p,
            ),
        }
    }
}

/// Everything the scene tracks for one object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ObjectState {
    pub frame: Rect,
    /// Unclamped; see [`effective_opacity`](Self::effective_opacity).
    pub opacity: f32,
    pub transform: LayerState,
    pub anchor: [f32; 3],
    pub sublayer: LayerState,
    pub sublayer_camera_z: f32,
    pub should_rasterize: bool,
    pub rasterization_scale: f32,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self::new(Rect::default())
    }
}

impl ObjectState {
    pub fn new(frame: Rect) -> Self {
        Self {
            frame,
            opacity: 1.0,
            transform: LayerState::default(),
            anchor: [0.5, 0.5, 0.0],
            sublayer: LayerState::default(),
            sublayer_camera_z: 0.0,
            should_rasterize: false,
            rasterization_scale: 1.0,
        }
    }

    pub fn effective_opacity(&self) -> f32 {
        self.opacity.clamp(0.0, 1.0)
    }

    pub fn sublayer_matrix(&self) -> Matrix4<f32> {
        perspective(self.sublayer_camera_z) * self.sublayer.matrix()
    }

    /// State after `p` (eased progress) of `delta` applied on top of `self`.
    pub fn advanced(&self, kind: StepKind, delta: &ObjectAnimation, p: f32) -> Self {
        let mut next = *self;
        next.opacity = self.opacity + delta.opacity * p;
        match kind {
            StepKind::Frame => {
                let [cx, cy] = self.frame.center();
                let [tx, ty, _] = delta.transform.translation;
                let [sx, sy, _] = delta.transform.scale;
                next.frame = Rect::from_center(
                    [cx + tx * p, cy + ty * p],
                    self.frame.width * lerp_f32(1.0, sx, p),
                    self.frame.height * lerp_f32(1.0, sy, p),
                );
            }
            StepKind::Layer => {
                next.transform = self.transform.advanced(&delta.transform, p);
                next.sublayer = self.sublayer.advanced(&delta.sublayer, p);
                for axis in 0..3 {
                    next.anchor[axis] = self.anchor[axis] + delta.anchor_translation[axis] * p;
                }
                next.sublayer_camera_z = self.sublayer_camera_z + delta.sublayer_camera_z * p;
                next.rasterization_scale = self.rasterization_scale + delta.rasterization_scale * p;
                if delta.toggles_rasterization && p >= 1.0 {
                    next.should_rasterize = !self.should_rasterize;
                }
            }
        }
        next
    }
}

#[derive(Debug)]
enum Driver {
    Delay,
    Step {
        kind: StepKind,
        curve: TimingCurve,
        /// Object, its delta, and its state when the transition began.
        targets: Vec<(ObjectId, ObjectAnimation, ObjectState)>,
    },
}

#[derive(Debug)]
struct ActiveTransition {
    driver: Driver,
    duration: f32,
    elapsed: f32,
    paused: bool,
}

/// Reference [`Substrate`] holding object state in memory.
#[derive(Debug)]
pub struct Scene {
    ids: IdAllocator,
    objects: IndexMap<ObjectId, ObjectState>,
    transitions: IndexMap<TransitionId, ActiveTransition>,
    /// Completions not yet claimed by the animation that started them.
    pending: Vec<Completion>,
    /// Slack when deciding that a transition reached its end.
    tolerance: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            ids: IdAllocator::new(),
            objects: IndexMap::new(),
            transitions: IndexMap::new(),
            pending: Vec::new(),
            tolerance: config.tolerance.max(0.0),
        }
    }

    /// Add an object with a fresh id.
    pub fn add_object(&mut self, frame: Rect) -> ObjectId {
        let mut id = self.ids.alloc_object();
        while self.objects.contains_key(&id) {
            id = self.ids.alloc_object();
        }
        self.objects.insert(id, ObjectState::new(frame));
        id
    }

    /// Insert or replace the state of `id`.
    pub fn insert(&mut self, id: ObjectId, state: ObjectState) {
        self.objects.insert(id, state);
    }

    pub fn state(&self, id: ObjectId) -> Option<&ObjectState> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &ObjectState)> {
        self.objects.iter().map(|(id, state)| (*id, state))
    }

    pub fn active_transitions(&self) -> usize {
        self.transitions.len()
    }

    /// Completions that fired during [`drive`](Self::drive) but belong to an
    /// animation that has not been driven since.
    pub fn pending_completions(&self) -> usize {
        self.pending.len()
    }

    /// Move every unpaused transition `dt` seconds forward and return the
    /// ones that reached their end, in start order.
    pub fn advance(&mut self, dt: f32) -> Vec<Completion> {
        let mut done = Vec::new();
        let tolerance = self.tolerance;
        for (id, transition) in self.transitions.iter_mut() {
            if transition.paused {
                continue;
            }
            transition.elapsed = (transition.elapsed + dt.max(0.0)).min(transition.duration);
            if transition.elapsed + tolerance >= transition.duration {
                transition.elapsed = transition.duration;
                done.push(*id);
            }
            Self::write_progress(&mut self.objects, transition);
        }
        done.into_iter()
            .map(|id| {
                self.transitions.shift_remove(&id);
                Completion {
                    transition: id,
                    finished: true,
                }
            })
            .collect()
    }

    /// Advance and route completions to `animation`. Cancels the animation
    /// first when its delegate has been dropped.
    ///
    /// Completions owned by other animations sharing this scene are queued
    /// and delivered the next time their animation is driven.
    pub fn drive(&mut self, animation: &mut Animation, dt: f32) {
        if animation.cancel_if_orphaned(self) {
            return;
        }
        let fired = self.advance(dt);
        self.pending.extend(fired);
        self.deliver(animation);
    }

    /// Advance once and route completions to every animation in `animations`.
    pub fn drive_all(&mut self, animations: &mut [&mut Animation], dt: f32) {
        for animation in animations.iter_mut() {
            animation.cancel_if_orphaned(self);
        }
        let fired = self.advance(dt);
        self.pending.extend(fired);
        for animation in animations.iter_mut() {
            self.deliver(animation);
        }
    }

    fn deliver(&mut self, animation: &mut Animation) {
        while let Some(index) = self
            .pending
            .iter()
            .position(|c| animation.owns_transition(c.transition))
        {
            let completion = self.pending.remove(index);
            animation.transition_did_stop(self, completion.transition, completion.finished);
        }
    }

    fn write_progress(objects: &mut IndexMap<ObjectId, ObjectState>, transition: &ActiveTransition) {
        let Driver::Step { kind, curve, targets } = &transition.driver else {
            return;
        };
        let linear = if transition.duration > 0.0 {
            transition.elapsed / transition.duration
        } else {
            1.0
        };
        let p = if linear >= 1.0 { 1.0 } else { curve.ease(linear) };
        for (object, delta, origin) in targets {
            trace!("scene: {object:?} at {p:.3} of {kind:?} transition");
            objects.insert(*object, origin.advanced(*kind, delta, p));
        }
    }
}

impl Substrate for Scene {
    fn apply(&mut self, kind: StepKind, object: ObjectId, delta: &ObjectAnimation) {
        let state = self.objects.entry(object).or_default();
        *state = state.advanced(kind, delta, 1.0);
        trace!("scene: applied {kind:?} delta to {object:?}");
    }

    fn begin_transition(&mut self, request: TransitionRequest<'_>) -> TransitionId {
        let targets = request
            .deltas
            .iter()
            .map(|(object, delta)| {
                let origin = *self.objects.entry(*object).or_default();
                (*object, *delta, origin)
            })
            .collect();
        let transition = ActiveTransition {
            driver: Driver::Step {
                kind: request.kind,
                curve: request.curve,
                targets,
            },
            duration: request.duration,
            elapsed: request.start_offset.clamp(0.0, request.duration),
            paused: false,
        };
        if transition.elapsed > 0.0 {
            Self::write_progress(&mut self.objects, &transition);
        }
        let id = self.ids.alloc_transition();
        self.transitions.insert(id, transition);
        id
    }

    fn begin_delay(&mut self, seconds: f32) -> TransitionId {
        let id = self.ids.alloc_transition();
        self.transitions.insert(
            id,
            ActiveTransition {
                driver: Driver::Delay,
                duration: seconds.max(0.0),
                elapsed: 0.0,
                paused: false,
            },
        );
        id
    }

    fn pause_transition(&mut self, id: TransitionId) {
        if let Some(transition) = self.transitions.get_mut(&id) {
            transition.paused = true;
        }
    }

    fn resume_transition(&mut self, id: TransitionId) {
        if let Some(transition) = self.transitions.get_mut(&id) {
            transition.paused = false;
        }
    }

    fn is_transition_paused(&self, id: TransitionId) -> bool {
        self.transitions.get(&id).map_or(false, |t| t.paused)
    }

    fn elapsed(&self, id: TransitionId) -> f32 {
        self.transitions.get(&id).map_or(0.0, |t| t.elapsed)
    }

    fn finish_transition(&mut self, id: TransitionId) {
        self.pending.retain(|c| c.transition != id);
        if let Some(mut transition) = self.transitions.shift_remove(&id) {
            transition.elapsed = transition.duration;
            Self::write_progress(&mut self.objects, &transition);
        }
    }
}
