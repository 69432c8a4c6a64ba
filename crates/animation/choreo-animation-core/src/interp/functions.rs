//! Interpolation helpers:
//! - lerp_f32 / lerp_vec3 (component-wise progress)
//! - bezier_ease_t (cubic-bezier timing, x inverted by bisection)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
#[inline]
pub fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if x1 == y1 && x2 == y2 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 ∈ [0,1]
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..32 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp_f32(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp_f32(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp_vec3([0.0; 3], [1.0, 2.0, 3.0], 0.5), [0.5, 1.0, 1.5]);
    }

    #[test]
    fn bezier_keeps_endpoints_fixed() {
        for ctrl in [[0.42, 0.0, 1.0, 1.0], [0.0, 0.0, 0.58, 1.0], [0.42, 0.0, 0.58, 1.0]] {
            assert_eq!(bezier_ease_t(0.0, ctrl[0], ctrl[1], ctrl[2], ctrl[3]), 0.0);
            assert!((bezier_ease_t(1.0, ctrl[0], ctrl[1], ctrl[2], ctrl[3]) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn ease_in_lags_linear_at_midpoint() {
        let eased = bezier_ease_t(0.5, 0.42, 0.0, 1.0, 1.0);
        assert!(eased < 0.5, "eased={eased}");
    }
}
