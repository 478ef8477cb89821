use glam::{Quat, Vec3};

use crate::animation::tracks::{Extrapolator, Interpolator, KeySpan, Track};
use crate::animation::values::{Interpolatable, normalize_or_identity};
use crate::utils::time::AnimTime;

/// The ten scalar channels of an [`Animation`], in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackChannel {
    PosX,
    PosY,
    PosZ,
    RotX,
    RotY,
    RotZ,
    RotW,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl TrackChannel {
    pub const COUNT: usize = 10;

    pub const ALL: [TrackChannel; Self::COUNT] = [
        TrackChannel::PosX,
        TrackChannel::PosY,
        TrackChannel::PosZ,
        TrackChannel::RotX,
        TrackChannel::RotY,
        TrackChannel::RotZ,
        TrackChannel::RotW,
        TrackChannel::ScaleX,
        TrackChannel::ScaleY,
        TrackChannel::ScaleZ,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Value of the channel in an animation that has no keys:
    /// zero position, identity rotation, unit scale.
    #[must_use]
    pub const fn default_value(self) -> f32 {
        match self {
            TrackChannel::RotW | TrackChannel::ScaleX | TrackChannel::ScaleY | TrackChannel::ScaleZ => 1.0,
            _ => 0.0,
        }
    }
}

/// A named bundle of exactly ten tracks describing position, rotation
/// (quaternion components) and scale over time.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: Option<String>,
    tracks: [Track; TrackChannel::COUNT],
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            tracks: std::array::from_fn(|i| Track::with_default(TrackChannel::ALL[i].default_value())),
        }
    }

    /// Creates an empty animation whose tracks all use the given policies.
    #[must_use]
    pub fn with_policies(interpolator: Interpolator, extrapolator: Extrapolator) -> Self {
        let mut anim = Self::new();
        anim.set_interpolator(interpolator);
        anim.set_extrapolator(extrapolator);
        anim
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[inline]
    #[must_use]
    pub fn track(&self, channel: TrackChannel) -> &Track {
        &self.tracks[channel.index()]
    }

    #[inline]
    pub fn track_mut(&mut self, channel: TrackChannel) -> &mut Track {
        &mut self.tracks[channel.index()]
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn set_interpolator(&mut self, interpolator: Interpolator) {
        for track in &mut self.tracks {
            track.set_interpolator(interpolator);
        }
    }

    pub fn set_extrapolator(&mut self, extrapolator: Extrapolator) {
        for track in &mut self.tracks {
            track.set_extrapolator(extrapolator);
        }
    }

    // ========================================================================
    // Authoring
    // ========================================================================

    pub fn set_position(&mut self, position: Vec3, time: AnimTime) {
        self.track_mut(TrackChannel::PosX).set_value(time, position.x);
        self.track_mut(TrackChannel::PosY).set_value(time, position.y);
        self.track_mut(TrackChannel::PosZ).set_value(time, position.z);
    }

    pub fn set_rotation(&mut self, rotation: Quat, time: AnimTime) {
        self.track_mut(TrackChannel::RotX).set_value(time, rotation.x);
        self.track_mut(TrackChannel::RotY).set_value(time, rotation.y);
        self.track_mut(TrackChannel::RotZ).set_value(time, rotation.z);
        self.track_mut(TrackChannel::RotW).set_value(time, rotation.w);
    }

    pub fn set_scaling(&mut self, scale: Vec3, time: AnimTime) {
        self.track_mut(TrackChannel::ScaleX).set_value(time, scale.x);
        self.track_mut(TrackChannel::ScaleY).set_value(time, scale.y);
        self.track_mut(TrackChannel::ScaleZ).set_value(time, scale.z);
    }

    // ========================================================================
    // Sampling
    // ========================================================================

    #[must_use]
    pub fn position(&self, time: AnimTime) -> Vec3 {
        Vec3::new(
            self.track(TrackChannel::PosX).value(time),
            self.track(TrackChannel::PosY).value(time),
            self.track(TrackChannel::PosZ).value(time),
        )
    }

    #[must_use]
    pub fn scaling(&self, time: AnimTime) -> Vec3 {
        Vec3::new(
            self.track(TrackChannel::ScaleX).value(time),
            self.track(TrackChannel::ScaleY).value(time),
            self.track(TrackChannel::ScaleZ).value(time),
        )
    }

    /// Samples the rotation channels as a unit quaternion.
    ///
    /// When the four component tracks are keyed at the same times and share
    /// their interpolator and extrapolator, the keys are treated as whole
    /// quaternions and linear interpolation slerps between them. Otherwise
    /// each component is evaluated with its own policies and the result is
    /// renormalized.
    #[must_use]
    pub fn rotation(&self, time: AnimTime) -> Quat {
        let x = self.track(TrackChannel::RotX);
        let aligned = [TrackChannel::RotY, TrackChannel::RotZ, TrackChannel::RotW]
            .into_iter()
            .map(|c| self.track(c))
            .all(|other| {
                x.shares_key_times(other)
                    && x.interpolator() == other.interpolator()
                    && x.extrapolator() == other.extrapolator()
            });

        if !aligned {
            return normalize_or_identity(Quat::from_xyzw(
                x.value(time),
                self.track(TrackChannel::RotY).value(time),
                self.track(TrackChannel::RotZ).value(time),
                self.track(TrackChannel::RotW).value(time),
            ));
        }

        match x.span(time) {
            None => normalize_or_identity(Quat::from_xyzw(
                x.default_value(),
                self.track(TrackChannel::RotY).default_value(),
                self.track(TrackChannel::RotZ).default_value(),
                self.track(TrackChannel::RotW).default_value(),
            )),
            Some(KeySpan::Hold(index)) => self.key_rotation(index),
            Some(KeySpan::Between { index, t }) => {
                let q1 = self.key_rotation(index);
                let q2 = self.key_rotation(index + 1);
                match x.interpolator() {
                    Interpolator::Step => q1,
                    Interpolator::Linear => Quat::interpolate_linear(q1, q2, t),
                    Interpolator::Cubic => {
                        let q0 = if index > 0 { self.key_rotation(index - 1) } else { q1 };
                        let q3 = if index + 2 < x.len() { self.key_rotation(index + 2) } else { q2 };
                        Quat::interpolate_cubic(q0, q1, q2, q3, t)
                    }
                }
            }
        }
    }

    fn key_rotation(&self, index: usize) -> Quat {
        let component = |c: TrackChannel| self.track(c).keys()[index].value;
        normalize_or_identity(Quat::from_xyzw(
            component(TrackChannel::RotX),
            component(TrackChannel::RotY),
            component(TrackChannel::RotZ),
            component(TrackChannel::RotW),
        ))
    }

    /// Earliest keyframe time across all ten tracks.
    #[must_use]
    pub fn start_time(&self) -> Option<AnimTime> {
        self.tracks.iter().filter_map(Track::start_time).min()
    }

    /// Latest keyframe time across all ten tracks.
    #[must_use]
    pub fn end_time(&self) -> Option<AnimTime> {
        self.tracks.iter().filter_map(Track::end_time).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn empty_animation_is_identity_pose() {
        let anim = Animation::new();
        assert_eq!(anim.position(123), Vec3::ZERO);
        assert_eq!(anim.rotation(123), Quat::IDENTITY);
        assert_eq!(anim.scaling(123), Vec3::ONE);
        assert_eq!(anim.start_time(), None);
    }

    #[test]
    fn rotation_keys_slerp_as_quaternions() {
        let mut anim = Animation::new();
        anim.set_rotation(Quat::IDENTITY, 0);
        anim.set_rotation(Quat::from_rotation_y(PI), 1000);

        let mid = anim.rotation(500);
        let expected = Quat::from_rotation_y(PI / 2.0);
        assert!(mid.angle_between(expected) < 1e-3, "got {mid:?}");
        assert!((mid.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn misaligned_rotation_tracks_fall_back_to_components() {
        let mut anim = Animation::new();
        anim.set_rotation(Quat::IDENTITY, 0);
        anim.set_rotation(Quat::from_rotation_z(PI / 2.0), 1000);
        anim.track_mut(TrackChannel::RotW).set_value(500, 1.0);

        let q = anim.rotation(500);
        assert!((q.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mixed_rotation_policies_sample_per_component() {
        let mut anim = Animation::new();
        anim.set_rotation(Quat::IDENTITY, 0);
        anim.set_rotation(Quat::from_rotation_y(PI / 2.0), 1000);
        anim.track_mut(TrackChannel::RotY).set_extrapolator(Extrapolator::Repeat);

        let components = Quat::from_xyzw(
            anim.track(TrackChannel::RotX).value(1250),
            anim.track(TrackChannel::RotY).value(1250),
            anim.track(TrackChannel::RotZ).value(1250),
            anim.track(TrackChannel::RotW).value(1250),
        )
        .normalize();
        assert!(anim.rotation(1250).abs_diff_eq(components, 1e-5));
    }

    #[test]
    fn time_bounds_span_all_channels() {
        let mut anim = Animation::new();
        anim.set_position(Vec3::X, 100);
        anim.set_scaling(Vec3::ONE, 2500);
        anim.track_mut(TrackChannel::RotY).set_value(-40, 0.0);
        assert_eq!(anim.start_time(), Some(-40));
        assert_eq!(anim.end_time(), Some(2500));
    }
}
