//! Transform algebra for object deltas.
//!
//! A delta is a rotation, a per-axis scale and a translation applied in that
//! fixed order (rotate, then scale, then translate). Composition and inversion
//! work on the parameters rather than on matrices, so a delta followed by its
//! inverse lands exactly where it started.

use nalgebra::{Matrix3, Matrix4, Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (origin at top-left, y down).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: [f32; 2], width: f32, height: f32) -> Self {
        Self {
            x: center[0] - 0.5 * width,
            y: center[1] - 0.5 * height,
            width,
            height,
        }
    }

    #[inline]
    pub fn center(&self) -> [f32; 2] {
        [self.x + 0.5 * self.width, self.y + 0.5 * self.height]
    }
}

/// Rotation by `angle` radians about `axis`. The axis need not be normalized.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub angle: f32,
    pub axis: [f32; 3],
}

impl Default for Rotation {
    fn default() -> Self {
        Self::planar(0.0)
    }
}

impl Rotation {
    pub fn new(angle: f32, axis: [f32; 3]) -> Self {
        Self { angle, axis }
    }

    /// Rotation in the plane, i.e. about the z axis.
    pub fn planar(angle: f32) -> Self {
        Self {
            angle,
            axis: [0.0, 0.0, 1.0],
        }
    }

    fn unit_axis(&self) -> Option<Unit<Vector3<f32>>> {
        Unit::try_new(Vector3::from(self.axis), f32::EPSILON)
    }

    /// Quaternion for `fraction` of the rotation (1.0 = whole angle).
    /// Degenerate axes yield the identity.
    pub fn quaternion_scaled(&self, fraction: f32) -> UnitQuaternion<f32> {
        match self.unit_axis() {
            Some(axis) if self.angle != 0.0 => {
                UnitQuaternion::from_axis_angle(&axis, self.angle * fraction)
            }
            _ => UnitQuaternion::identity(),
        }
    }

    #[inline]
    pub fn quaternion(&self) -> UnitQuaternion<f32> {
        self.quaternion_scaled(1.0)
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            angle: -self.angle,
            axis: self.axis,
        }
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.angle == 0.0 || (self.axis[0] == 0.0 && self.axis[1] == 0.0)
    }

    /// Rotation equivalent to applying `self` then `next`.
    pub fn then(&self, next: &Rotation) -> Rotation {
        if next.angle == 0.0 {
            return *self;
        }
        if self.angle == 0.0 {
            return *next;
        }
        // Same axis: add angles so multi-turn rotations survive.
        if let (Some(a), Some(b)) = (self.unit_axis(), next.unit_axis()) {
            if (a.into_inner() - b.into_inner()).norm() <= 1e-6 {
                return Rotation::new(self.angle + next.angle, self.axis);
            }
        }
        let q = next.quaternion() * self.quaternion();
        match q.axis_angle() {
            Some((axis, angle)) => Rotation::new(angle, [axis.x, axis.y, axis.z]),
            None => Rotation::default(),
        }
    }
}

/// Rotation, scale and translation triple.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParameters {
    pub rotation: Rotation,
    pub scale: [f32; 3],
    pub translation: [f32; 3],
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformParameters {
    pub fn identity() -> Self {
        Self {
            rotation: Rotation::default(),
            scale: [1.0, 1.0, 1.0],
            translation: [0.0, 0.0, 0.0],
        }
    }

    /// Translation and scale mapping `from` onto `to`: scale about the centre,
    /// then move the centre. Degenerate source extents keep a unit factor.
    pub fn from_rect_to_rect(from: Rect, to: Rect) -> Self {
        let factor = |src: f32, dst: f32| if src == 0.0 { 1.0 } else { dst / src };
        let [fx, fy] = from.center();
        let [tx, ty] = to.center();
        Self {
            rotation: Rotation::default(),
            scale: [factor(from.width, to.width), factor(from.height, to.height), 1.0],
            translation: [tx - fx, ty - fy, 0.0],
        }
    }

    /// Homogeneous 3D matrix `T * S * R` (column vectors: rotation applied first).
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::from(self.translation))
            * Matrix4::new_nonuniform_scaling(&Vector3::from(self.scale))
            * self.rotation.quaternion().to_homogeneous()
    }

    /// Planar affine projection of [`matrix`](Self::matrix): z rotation, xy scale, xy translation.
    pub fn affine_matrix(&self) -> Matrix3<f32> {
        let (_, _, yaw) = self.rotation.quaternion().euler_angles();
        Matrix3::new_translation(&Vector2::new(self.translation[0], self.translation[1]))
            * Matrix3::new_nonuniform_scaling(&Vector2::new(self.scale[0], self.scale[1]))
            * Matrix3::new_rotation(yaw)
    }

    /// Parameter-wise inverse: negated angle, reciprocal scale, negated translation.
    /// Zero scale factors have no inverse and become infinite.
    pub fn inverse(&self) -> Self {
        Self {
            rotation: self.rotation.inverse(),
            scale: self.scale.map(f32::recip),
            translation: self.translation.map(|t| -t),
        }
    }

    /// Parameters equivalent to applying `self` then `next`.
    pub fn then(&self, next: &TransformParameters) -> Self {
        Self {
            rotation: self.rotation.then(&next.rotation),
            scale: [
                self.scale[0] * next.scale[0],
                self.scale[1] * next.scale[1],
                self.scale[2] * next.scale[2],
            ],
            translation: [
                self.translation[0] + next.translation[0],
                self.translation[1] + next.translation[1],
                self.translation[2] + next.translation[2],
            ],
        }
    }

    pub fn is_identity(&self, tolerance: f32) -> bool {
        let rotation_angle = self.rotation.quaternion().angle();
        rotation_angle.abs() <= tolerance
            && self.scale.iter().all(|s| (s - 1.0).abs() <= tolerance)
            && self.translation.iter().all(|t| t.abs() <= tolerance)
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.rotation.is_planar() && self.scale[2] == 1.0 && self.translation[2] == 0.0
    }
}

/// Perspective projection seen from a camera at distance `camera_z` on the z axis.
/// A zero distance means no perspective (identity).
pub fn perspective(camera_z: f32) -> Matrix4<f32> {
    let mut m = Matrix4::identity();
    if camera_z != 0.0 {
        m[(3, 2)] = -1.0 / camera_z;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rotation_applies_before_scale_and_translation() {
        let params = TransformParameters {
            rotation: Rotation::planar(FRAC_PI_2),
            scale: [2.0, 3.0, 1.0],
            translation: [10.0, 0.0, 0.0],
        };
        // (1,0) -> rotate -> (0,1) -> scale -> (0,3) -> translate -> (10,3)
        let p = params.matrix() * nalgebra::Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn affine_matches_planar_projection() {
        let params = TransformParameters {
            rotation: Rotation::planar(0.3),
            scale: [2.0, 0.5, 1.0],
            translation: [4.0, -2.0, 0.0],
        };
        let m4 = params.matrix();
        let m3 = params.affine_matrix();
        assert_relative_eq!(m3[(0, 0)], m4[(0, 0)], epsilon = 1e-5);
        assert_relative_eq!(m3[(0, 1)], m4[(0, 1)], epsilon = 1e-5);
        assert_relative_eq!(m3[(1, 0)], m4[(1, 0)], epsilon = 1e-5);
        assert_relative_eq!(m3[(0, 2)], m4[(0, 3)], epsilon = 1e-5);
        assert_relative_eq!(m3[(1, 2)], m4[(1, 3)], epsilon = 1e-5);
    }

    #[test]
    fn then_inverse_is_identity() {
        let params = TransformParameters {
            rotation: Rotation::new(0.7, [1.0, 1.0, 0.0]),
            scale: [2.0, 4.0, 0.5],
            translation: [3.0, -1.0, 8.0],
        };
        let round_trip = params.then(&params.inverse());
        assert!(round_trip.is_identity(1e-5), "{round_trip:?}");
        assert_relative_eq!(round_trip.matrix(), Matrix4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn same_axis_rotations_keep_full_turns() {
        let r = Rotation::planar(3.0).then(&Rotation::planar(3.0));
        assert_relative_eq!(r.angle, 6.0);
    }

    #[test]
    fn rect_to_rect_scales_about_center() {
        let from = Rect::new(0.0, 0.0, 100.0, 50.0);
        let to = Rect::new(50.0, 50.0, 200.0, 25.0);
        let params = TransformParameters::from_rect_to_rect(from, to);
        assert_eq!(params.scale, [2.0, 0.5, 1.0]);
        assert_eq!(params.translation, [100.0, 37.5, 0.0]);
    }

    #[test]
    fn rect_to_rect_with_empty_source_keeps_unit_scale() {
        let params =
            TransformParameters::from_rect_to_rect(Rect::new(0.0, 0.0, 0.0, 10.0), Rect::new(0.0, 0.0, 5.0, 20.0));
        assert_eq!(params.scale, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn perspective_sets_m34() {
        let m = perspective(500.0);
        assert_relative_eq!(m[(3, 2)], -1.0 / 500.0);
        assert_eq!(perspective(0.0), Matrix4::identity());
    }
}
