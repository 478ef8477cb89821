use glam::{Affine3A, Quat, Vec3};

use crate::animation::{Animation, Interpolatable};
use crate::errors::Result;
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::playback::ActiveState;
use crate::scene::scene::Scene;
use crate::utils::time::AnimTime;

/// A sampled local pose: position, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Builds the local matrix `T(pivot + position) * R * S * T(-pivot)`:
    /// rotation and scale happen about the pivot.
    #[must_use]
    pub fn local_matrix(&self, pivot: Vec3) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, pivot + self.position)
            * Affine3A::from_translation(-pivot)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Samples the active slot(s) with `sample` and blends the results.
///
/// At mix 0 (or with no secondary slot) the primary value is returned as is;
/// at mix 1 the secondary value is returned as is.
fn blend<T: Interpolatable>(
    animations: &[Animation],
    state: &ActiveState,
    time: AnimTime,
    sample: impl Fn(&Animation, AnimTime) -> T,
) -> T {
    let primary = || sample(&animations[state.primary], time.saturating_sub(state.primary_offset));

    let Some((secondary, offset)) = state.secondary else {
        return primary();
    };
    if state.mix <= 0.0 {
        return primary();
    }
    let other = sample(&animations[secondary], time.saturating_sub(offset));
    if state.mix >= 1.0 {
        return other;
    }
    T::interpolate_linear(primary(), other, state.mix)
}

impl Node {
    #[must_use]
    pub fn sample_position(&self, time: AnimTime) -> Vec3 {
        blend(&self.animations, &self.playback.resolve(time), time, Animation::position)
    }

    #[must_use]
    pub fn sample_rotation(&self, time: AnimTime) -> Quat {
        blend(&self.animations, &self.playback.resolve(time), time, Animation::rotation)
    }

    #[must_use]
    pub fn sample_scaling(&self, time: AnimTime) -> Vec3 {
        blend(&self.animations, &self.playback.resolve(time), time, Animation::scaling)
    }

    /// The blended local pose at `time`.
    #[must_use]
    pub fn local_transform(&self, time: AnimTime) -> Transform {
        let state = self.playback.resolve(time);
        Transform {
            position: blend(&self.animations, &state, time, Animation::position),
            rotation: blend(&self.animations, &state, time, Animation::rotation),
            scale: blend(&self.animations, &state, time, Animation::scaling),
        }
    }

    /// The local matrix at `time`, pivot included.
    #[must_use]
    pub fn local_matrix(&self, time: AnimTime) -> Affine3A {
        self.local_transform(time).local_matrix(self.pivot)
    }
}

impl Scene {
    /// Local position of one node at `time`.
    pub fn node_position(&self, handle: NodeHandle, time: AnimTime) -> Result<Vec3> {
        Ok(self.node(handle)?.sample_position(time))
    }

    /// Local rotation of one node at `time`.
    pub fn node_rotation(&self, handle: NodeHandle, time: AnimTime) -> Result<Quat> {
        Ok(self.node(handle)?.sample_rotation(time))
    }

    /// Local scale of one node at `time`.
    pub fn node_scaling(&self, handle: NodeHandle, time: AnimTime) -> Result<Vec3> {
        Ok(self.node(handle)?.sample_scaling(time))
    }

    /// Local matrix of one node at `time`, ignoring its ancestors.
    pub fn node_matrix(&self, handle: NodeHandle, time: AnimTime) -> Result<Affine3A> {
        Ok(self.node(handle)?.local_matrix(time))
    }

    /// Inverse of [`Scene::node_matrix`].
    pub fn node_inv_matrix(&self, handle: NodeHandle, time: AnimTime) -> Result<Affine3A> {
        Ok(self.node(handle)?.local_matrix(time).inverse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn pivot_is_a_fixed_point_of_rotation() {
        let pivot = Vec3::new(1.0, 0.0, 0.0);
        let transform = Transform {
            rotation: Quat::from_rotation_z(FRAC_PI_2),
            ..Transform::IDENTITY
        };
        let m = transform.local_matrix(pivot);
        assert!(m.transform_point3(pivot).abs_diff_eq(pivot, 1e-5));
        assert!(m.transform_point3(Vec3::new(2.0, 0.0, 0.0)).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn blend_short_circuits_at_the_ends() {
        let mut a = Animation::new();
        a.set_position(Vec3::X, 0);
        let mut b = Animation::new();
        b.set_position(Vec3::Y, 0);
        let animations = [a, b];

        let mut state = ActiveState {
            primary: 0,
            primary_offset: 0,
            secondary: Some((1, 0)),
            mix: 0.0,
        };
        assert_eq!(blend(&animations, &state, 0, Animation::position), Vec3::X);
        state.mix = 1.0;
        assert_eq!(blend(&animations, &state, 0, Animation::position), Vec3::Y);
        state.mix = 0.5;
        assert!(blend(&animations, &state, 0, Animation::position).abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
    }
}
