use serde::Deserialize;

use crate::animation::Animation;
use crate::binding::ObjectResolver;
use crate::config::Config;
use crate::error::AnimationError;
use crate::interp::TimingCurve;
use crate::object_animation::ObjectAnimation;
use crate::step::AnimationStep;
use crate::substrate::StepKind;
use crate::transform::Rect;
use crate::Result;

/// Public API: parse a declarative animation definition into an [`Animation`].
///
/// Notes:
/// - Durations are seconds. Steps without one use `Config::default_step_duration`.
/// - Vectors may be written with two components; scale gets z = 1, offsets z = 0.
/// - `fromRect`/`toRect` must appear together; explicit `scale`/`translation`
///   override what they derive.
/// - Targets are resolved by name; unknown names fail with `UnknownTarget`.
pub fn parse_animation_json(s: &str, resolver: &mut dyn ObjectResolver) -> Result<Animation> {
    parse_animation_json_with(s, resolver, &Config::default())
}

pub fn parse_animation_json_with(
    s: &str,
    resolver: &mut dyn ObjectResolver,
    config: &Config,
) -> Result<Animation> {
    let stored: StoredAnimation = serde_json::from_str(s)?;

    let mut steps = Vec::with_capacity(stored.steps.len());
    for stored_step in stored.steps {
        let mut builder = match stored_step.kind {
            StepKind::Frame => AnimationStep::frame_with(config),
            StepKind::Layer => AnimationStep::layer_with(config),
        };
        if let Some(duration) = stored_step.duration {
            builder = builder.duration(duration);
        }
        if let Some(curve) = stored_step.curve {
            builder = builder.curve(curve);
        }
        if let Some(tag) = stored_step.tag {
            builder = builder.tag(tag);
        }
        if let Some(info) = stored_step.user_info {
            builder = builder.user_info(info);
        }
        for object in stored_step.objects {
            let id = resolver
                .resolve(&object.target)
                .ok_or_else(|| AnimationError::UnknownTarget {
                    name: object.target.clone(),
                })?;
            builder = builder.animate(id, to_object_animation(&object)?);
        }
        steps.push(builder.build()?);
    }

    let mut animation = Animation::new(steps).with_locking_ui(stored.locking_ui);
    if let Some(tag) = stored.tag {
        animation = animation.with_tag(tag);
    }
    if let Some(info) = stored.user_info {
        animation = animation.with_user_info(info);
    }
    Ok(animation)
}

fn to_object_animation(stored: &StoredObject) -> Result<ObjectAnimation> {
    let mut delta = match (stored.from_rect, stored.to_rect) {
        (Some(from), Some(to)) => ObjectAnimation::from_rect_to_rect(from, to),
        (None, None) => ObjectAnimation::new(),
        _ => {
            return Err(AnimationError::Serialization {
                reason: format!("'{}': fromRect and toRect must appear together", stored.target),
            })
        }
    };
    if let Some(rotation) = stored.rotation {
        delta = delta.with_rotation(rotation.angle, rotation.axis);
    }
    if let Some(scale) = stored.scale {
        let [x, y, z] = scale.to_vec3(1.0);
        delta = delta.with_scale(x, y, z);
    }
    if let Some(translation) = stored.translation {
        let [x, y, z] = translation.to_vec3(0.0);
        delta = delta.with_translation(x, y, z);
    }
    if let Some(anchor) = stored.anchor {
        let [x, y, z] = anchor.to_vec3(0.0);
        delta = delta.with_anchor_translation(x, y, z);
    }
    if let Some(sublayer) = &stored.sublayer {
        if let Some(rotation) = sublayer.rotation {
            delta = delta.with_sublayer_rotation(rotation.angle, rotation.axis);
        }
        if let Some(scale) = sublayer.scale {
            let [x, y, z] = scale.to_vec3(1.0);
            delta = delta.with_sublayer_scale(x, y, z);
        }
        if let Some(translation) = sublayer.translation {
            let [x, y, z] = translation.to_vec3(0.0);
            delta = delta.with_sublayer_translation(x, y, z);
        }
        delta = delta.with_sublayer_camera_z(sublayer.camera_z);
    }
    if stored.rasterize {
        delta = delta.toggling_rasterization();
    }
    Ok(delta
        .with_opacity_delta(stored.opacity)
        .with_rasterization_scale_delta(stored.rasterization_scale))
}

// ---------- stored schema ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAnimation {
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    locking_ui: bool,
    #[serde(default)]
    user_info: Option<serde_json::Value>,
    steps: Vec<StoredStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredStep {
    kind: StepKind,
    #[serde(default)]
    duration: Option<f32>,
    #[serde(default)]
    curve: Option<TimingCurve>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    user_info: Option<serde_json::Value>,
    #[serde(default)]
    objects: Vec<StoredObject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredObject {
    target: String,
    #[serde(default)]
    rotation: Option<StoredRotation>,
    #[serde(default)]
    scale: Option<RawVector>,
    #[serde(default)]
    translation: Option<RawVector>,
    #[serde(default)]
    opacity: f32,
    #[serde(default)]
    from_rect: Option<Rect>,
    #[serde(default)]
    to_rect: Option<Rect>,
    #[serde(default)]
    anchor: Option<RawVector>,
    #[serde(default)]
    sublayer: Option<StoredSublayer>,
    #[serde(default)]
    rasterize: bool,
    #[serde(default)]
    rasterization_scale: f32,
}

#[derive(Copy, Clone, Debug, Deserialize)]
struct StoredRotation {
    angle: f32,
    #[serde(default = "planar_axis")]
    axis: [f32; 3],
}

fn planar_axis() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSublayer {
    #[serde(default)]
    rotation: Option<StoredRotation>,
    #[serde(default)]
    scale: Option<RawVector>,
    #[serde(default)]
    translation: Option<RawVector>,
    #[serde(default)]
    camera_z: f32,
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawVector {
    Three([f32; 3]),
    Two([f32; 2]),
}

impl RawVector {
    fn to_vec3(self, z: f32) -> [f32; 3] {
        match self {
            RawVector::Three(v) => v,
            RawVector::Two([x, y]) => [x, y, z],
        }
    }
}
