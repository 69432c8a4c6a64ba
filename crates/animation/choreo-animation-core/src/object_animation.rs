//! Per-object deltas applied by an animation step.

use nalgebra::{Matrix3, Matrix4};
use serde::{Deserialize, Serialize};

use crate::transform::{perspective, Rect, Rotation, TransformParameters};

/// The change applied to one visual object within one step.
///
/// Every field is relative to whatever state the object holds when the step
/// starts. The geometric part applies rotation, then scale, then translation.
/// Anchor, sub-object, camera and rasterization fields are only honoured by
/// layer steps; frame steps reject deltas that use them.
///
/// Built by value:
///
/// ```
/// use choreo_animation_core::ObjectAnimation;
///
/// let delta = ObjectAnimation::new()
///     .with_planar_scale(2.0, 2.0)
///     .with_opacity_delta(-0.5);
/// assert_eq!(delta.opacity_delta(), -0.5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectAnimation {
    pub transform: TransformParameters,
    pub opacity: f32,
    /// Anchor point translation in relative coordinates.
    pub anchor_translation: [f32; 3],
    pub sublayer: TransformParameters,
    /// Camera distance along z for sub-object perspective (0 = none).
    pub sublayer_camera_z: f32,
    pub toggles_rasterization: bool,
    pub rasterization_scale: f32,
}

impl Default for ObjectAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectAnimation {
    /// Identity delta.
    pub fn new() -> Self {
        Self {
            transform: TransformParameters::identity(),
            opacity: 0.0,
            anchor_translation: [0.0; 3],
            sublayer: TransformParameters::identity(),
            sublayer_camera_z: 0.0,
            toggles_rasterization: false,
            rasterization_scale: 0.0,
        }
    }

    /// Delta moving and scaling an object so that `from` lands on `to`.
    pub fn from_rect_to_rect(from: Rect, to: Rect) -> Self {
        Self {
            transform: TransformParameters::from_rect_to_rect(from, to),
            ..Self::new()
        }
    }

    #[inline]
    pub fn with_rotation(mut self, angle: f32, axis: [f32; 3]) -> Self {
        self.transform.rotation = Rotation::new(angle, axis);
        self
    }

    #[inline]
    pub fn with_planar_rotation(self, angle: f32) -> Self {
        self.with_rotation(angle, [0.0, 0.0, 1.0])
    }

    #[inline]
    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.scale = [x, y, z];
        self
    }

    #[inline]
    pub fn with_planar_scale(self, x: f32, y: f32) -> Self {
        self.with_scale(x, y, 1.0)
    }

    #[inline]
    pub fn with_translation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.translation = [x, y, z];
        self
    }

    #[inline]
    pub fn with_planar_translation(self, x: f32, y: f32) -> Self {
        self.with_translation(x, y, 0.0)
    }

    #[inline]
    pub fn with_opacity_delta(mut self, delta: f32) -> Self {
        self.opacity = delta;
        self
    }

    #[inline]
    pub fn with_anchor_translation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.anchor_translation = [x, y, z];
        self
    }

    #[inline]
    pub fn with_sublayer_rotation(mut self, angle: f32, axis: [f32; 3]) -> Self {
        self.sublayer.rotation = Rotation::new(angle, axis);
        self
    }

    #[inline]
    pub fn with_sublayer_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.sublayer.scale = [x, y, z];
        self
    }

    #[inline]
    pub fn with_sublayer_translation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.sublayer.translation = [x, y, z];
        self
    }

    #[inline]
    pub fn with_sublayer_camera_z(mut self, z: f32) -> Self {
        self.sublayer_camera_z = z;
        self
    }

    #[inline]
    pub fn toggling_rasterization(mut self) -> Self {
        self.toggles_rasterization = true;
        self
    }

    #[inline]
    pub fn with_rasterization_scale_delta(mut self, delta: f32) -> Self {
        self.rasterization_scale = delta;
        self
    }

    #[inline]
    pub fn opacity_delta(&self) -> f32 {
        self.opacity
    }

    /// Composed 3D transform (rotate, scale, translate).
    #[inline]
    pub fn transform(&self) -> Matrix4<f32> {
        self.transform.matrix()
    }

    /// Planar affine transform used for frame steps.
    #[inline]
    pub fn affine_transform(&self) -> Matrix3<f32> {
        self.transform.affine_matrix()
    }

    /// Sub-object transform with the camera perspective applied last.
    pub fn sublayer_transform(&self) -> Matrix4<f32> {
        perspective(self.sublayer_camera_z) * self.sublayer.matrix()
    }

    /// Exact inverse: applying `self` then `self.inverse()` restores the object.
    pub fn inverse(&self) -> Self {
        Self {
            transform: self.transform.inverse(),
            opacity: -self.opacity,
            anchor_translation: self.anchor_translation.map(|t| -t),
            sublayer: self.sublayer.inverse(),
            sublayer_camera_z: -self.sublayer_camera_z,
            toggles_rasterization: self.toggles_rasterization,
            rasterization_scale: -self.rasterization_scale,
        }
    }

    /// Delta equivalent to applying `self` then `next`.
    pub fn compose(&self, next: &ObjectAnimation) -> Self {
        let add3 = |a: [f32; 3], b: [f32; 3]| [a[0] + b[0], a[1] + b[1], a[2] + b[2]];
        Self {
            transform: self.transform.then(&next.transform),
            opacity: self.opacity + next.opacity,
            anchor_translation: add3(self.anchor_translation, next.anchor_translation),
            sublayer: self.sublayer.then(&next.sublayer),
            sublayer_camera_z: self.sublayer_camera_z + next.sublayer_camera_z,
            toggles_rasterization: self.toggles_rasterization != next.toggles_rasterization,
            rasterization_scale: self.rasterization_scale + next.rasterization_scale,
        }
    }

    pub fn is_identity(&self, tolerance: f32) -> bool {
        self.transform.is_identity(tolerance)
            && self.opacity.abs() <= tolerance
            && self.anchor_translation.iter().all(|a| a.abs() <= tolerance)
            && self.sublayer.is_identity(tolerance)
            && self.sublayer_camera_z.abs() <= tolerance
            && !self.toggles_rasterization
            && self.rasterization_scale.abs() <= tolerance
    }

    /// Why a frame step cannot express this delta, if it cannot.
    pub(crate) fn frame_incompatibility(&self) -> Option<&'static str> {
        if self.transform.rotation.angle != 0.0 {
            Some("frames cannot rotate")
        } else if !self.transform.is_planar() {
            Some("frames only scale and translate in the plane")
        } else if self.anchor_translation != [0.0; 3] {
            Some("anchor translation requires a layer step")
        } else if self.sublayer != TransformParameters::identity() || self.sublayer_camera_z != 0.0 {
            Some("sub-object transforms require a layer step")
        } else if self.toggles_rasterization || self.rasterization_scale != 0.0 {
            Some("rasterization requires a layer step")
        } else {
            None
        }
    }
}
