//! Choreo Animation Core (substrate-agnostic)
//!
//! Composes per-object deltas into steps, sequences steps into animations and
//! drives them through a render substrate: play, pause, cancel, terminate,
//! seek, repeat, reverse and loop. The crate never rasterizes anything; it
//! hands relative deltas to a [`Substrate`] and reacts to its completions.
//! [`Scene`] is an in-memory substrate for tests and hosts without a
//! compositor.

pub mod animation;
pub mod binding;
pub mod config;
pub mod delegate;
pub mod error;
pub mod ids;
pub mod interp;
pub mod lifecycle;
pub mod object_animation;
pub mod scene;
pub mod step;
pub mod stored_animation;
pub mod substrate;
pub mod transform;

// Re-exports for hosts
pub use animation::{Animation, PlayOptions, Repeat};
pub use binding::{ObjectResolver, ObjectTable};
pub use config::Config;
pub use delegate::AnimationDelegate;
pub use error::AnimationError;
pub use ids::{IdAllocator, ObjectId, TransitionId};
pub use interp::TimingCurve;
pub use lifecycle::{LifecycleEvent, LifecycleGuard};
pub use object_animation::ObjectAnimation;
pub use scene::{LayerState, ObjectState, Scene};
pub use step::{AnimationStep, FrameAnimationStep, LayerAnimationStep, StepBuilder, StepCompletion, StepRun};
pub use stored_animation::{parse_animation_json, parse_animation_json_with};
pub use substrate::{Completion, StepKind, Substrate, TransitionRequest};
pub use transform::{perspective, Rect, Rotation, TransformParameters};

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AnimationError>;
