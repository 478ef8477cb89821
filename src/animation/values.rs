use glam::{Quat, Vec3, Vec4};

/// Values that can be interpolated between keyframes and blended between
/// animation slots.
///
/// The cubic form is a uniform Catmull-Rom segment: `v1` and `v2` bracket
/// the interval, `v0` and `v3` are their outer neighbours (callers pass the
/// bracketing value again at the ends of a track).
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    fn interpolate_cubic(v0: Self, v1: Self, v2: Self, v3: Self, t: f32) -> Self;
}

#[inline]
#[must_use]
pub fn catmull_rom(v0: f32, v1: f32, v2: f32, v3: f32, t: f32) -> f32 {
    let tsq = t * t;

    let x = -v0 + 3.0 * v1 - 3.0 * v2 + v3;
    let y = 2.0 * v0 - 5.0 * v1 + 4.0 * v2 - v3;
    let z = v2 - v0;
    let w = 2.0 * v1;

    0.5 * (x * tsq * t + y * tsq + z * t + w)
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, v1: Self, v2: Self, v3: Self, t: f32) -> Self {
        catmull_rom(v0, v1, v2, v3, t)
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    fn interpolate_cubic(v0: Self, v1: Self, v2: Self, v3: Self, t: f32) -> Self {
        Vec3::new(
            catmull_rom(v0.x, v1.x, v2.x, v3.x, t),
            catmull_rom(v0.y, v1.y, v2.y, v3.y, t),
            catmull_rom(v0.z, v1.z, v2.z, v3.z, t),
        )
    }
}

impl Interpolatable for Quat {
    /// Shortest-arc spherical interpolation.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }

    fn interpolate_cubic(v0: Self, v1: Self, v2: Self, v3: Self, t: f32) -> Self {
        let a = Vec4::from(v0);
        let b = Vec4::from(v1);
        let c = Vec4::from(v2);
        let d = Vec4::from(v3);

        let result = Vec4::new(
            catmull_rom(a.x, b.x, c.x, d.x, t),
            catmull_rom(a.y, b.y, c.y, d.y, t),
            catmull_rom(a.z, b.z, c.z, d.z, t),
            catmull_rom(a.w, b.w, c.w, d.w, t),
        );

        normalize_or_identity(Quat::from_vec4(result))
    }
}

/// Renormalizes a quaternion built from independently evaluated
/// components. A degenerate (zero-length) result falls back to identity.
#[inline]
#[must_use]
pub fn normalize_or_identity(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq > f32::EPSILON {
        q * len_sq.sqrt().recip()
    } else {
        Quat::IDENTITY
    }
}
