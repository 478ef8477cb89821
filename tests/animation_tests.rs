//! Track and Animation tests
//!
//! Tests for:
//! - Keyframe insertion order and replacement
//! - Step / Linear / Cubic interpolation
//! - Clamp / Repeat / Pingpong / Extend extrapolation
//! - Ten-track animations and quaternion rotation sampling

use anim_rig::{Animation, Extrapolator, Interpolator, Keyframe, Track, TrackChannel};
use glam::{Quat, Vec3};
use std::f32::consts::PI;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn ramp(interpolator: Interpolator, extrapolator: Extrapolator) -> Track {
    let mut track = Track::new();
    track.set_interpolator(interpolator);
    track.set_extrapolator(extrapolator);
    track.set_value(0, 0.0);
    track.set_value(1000, 1.0);
    track
}

// ============================================================================
// Keyframes
// ============================================================================

#[test]
fn track_keys_stay_sorted() {
    let mut track = Track::new();
    track.set_value(500, 5.0);
    track.set_value(100, 1.0);
    track.set_value(300, 3.0);

    let times: Vec<_> = track.keys().iter().map(|k| k.time).collect();
    assert_eq!(times, vec![100, 300, 500]);
    assert_eq!(track.start_time(), Some(100));
    assert_eq!(track.end_time(), Some(500));
}

#[test]
fn track_set_value_at_existing_time_replaces() {
    let mut track = ramp(Interpolator::Linear, Extrapolator::Clamp);
    track.set_value(1000, 4.0);
    assert_eq!(track.len(), 2);
    assert!(approx_eq(track.value(1000), 4.0));

    track.set_keyframe(Keyframe::new(0, -1.0));
    assert_eq!(track.len(), 2);
    assert!(approx_eq(track.value(0), -1.0));
}

#[test]
fn track_evaluation_does_not_change_keys() {
    let track = ramp(Interpolator::Cubic, Extrapolator::Pingpong);
    for time in [-3000, -1, 0, 250, 999, 1000, 1001, 7777] {
        let _ = track.value(time);
    }
    assert_eq!(track.len(), 2);
}

#[test]
fn empty_track_yields_default() {
    let track = Track::with_default(2.5);
    assert!(track.is_empty());
    assert!(approx_eq(track.value(-10), 2.5));
    assert!(approx_eq(track.value(1234), 2.5));
    assert_eq!(track.start_time(), None);
}

#[test]
fn single_key_track_is_constant() {
    let mut track = Track::new();
    track.set_extrapolator(Extrapolator::Repeat);
    track.set_value(40, 7.0);
    for time in [-100, 0, 40, 41, 100_000] {
        assert!(approx_eq(track.value(time), 7.0));
    }
}

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn linear_clamp_ramp() {
    let track = ramp(Interpolator::Linear, Extrapolator::Clamp);
    assert!(approx_eq(track.value(0), 0.0));
    assert!(approx_eq(track.value(500), 0.5));
    assert!(approx_eq(track.value(1000), 1.0));
    assert!(approx_eq(track.value(2000), 1.0));
    assert!(approx_eq(track.value(-500), 0.0));
}

#[test]
fn step_holds_left_key() {
    let track = ramp(Interpolator::Step, Extrapolator::Clamp);
    assert!(approx_eq(track.value(0), 0.0));
    assert!(approx_eq(track.value(999), 0.0));
    assert!(approx_eq(track.value(1000), 1.0));
}

#[test]
fn cubic_passes_through_keys() {
    let mut track = Track::new();
    track.set_interpolator(Interpolator::Cubic);
    for (time, value) in [(0, 0.0), (100, 2.0), (200, -1.0), (300, 4.0)] {
        track.set_value(time, value);
    }
    assert!(approx_eq(track.value(0), 0.0));
    assert!(approx_eq(track.value(100), 2.0));
    assert!(approx_eq(track.value(200), -1.0));
    assert!(approx_eq(track.value(300), 4.0));
}

#[test]
fn cubic_on_a_line_stays_linear() {
    let mut track = Track::new();
    track.set_interpolator(Interpolator::Cubic);
    for i in 0..4 {
        track.set_value(i * 100, i as f32);
    }
    assert!(approx_eq(track.value(150), 1.5));
    assert!(approx_eq(track.value(120), 1.2));
}

// ============================================================================
// Extrapolation
// ============================================================================

#[test]
fn repeat_is_periodic() {
    let track = ramp(Interpolator::Linear, Extrapolator::Repeat);
    for time in [0, 120, 500, 999] {
        assert!(approx_eq(track.value(time), track.value(time + 1000)));
        assert!(approx_eq(track.value(time), track.value(time - 3000)));
    }
    assert!(approx_eq(track.value(1250), 0.25));
}

#[test]
fn extend_behaves_like_repeat() {
    let extend = ramp(Interpolator::Linear, Extrapolator::Extend);
    let repeat = ramp(Interpolator::Linear, Extrapolator::Repeat);
    for time in [-1500, -1, 0, 300, 1000, 2750] {
        assert!(approx_eq(extend.value(time), repeat.value(time)));
    }
}

#[test]
fn pingpong_mirrors_around_end() {
    let track = ramp(Interpolator::Linear, Extrapolator::Pingpong);
    for d in [0, 100, 250, 999] {
        assert!(approx_eq(track.value(1000 + d), track.value(1000 - d)));
    }
    assert!(approx_eq(track.value(1500), 0.5));
    assert!(approx_eq(track.value(2000), 0.0));
    assert!(approx_eq(track.value(2250), 0.25));
}

#[test]
fn extrapolation_is_defined_over_the_whole_time_range() {
    let mut track = Track::new();
    track.set_value(1, 0.0);
    track.set_value(1001, 1.0);

    track.set_extrapolator(Extrapolator::Repeat);
    assert!(approx_eq(track.value(i64::MIN), 0.191));
    assert!(approx_eq(track.value(i64::MAX), 0.806));
    assert!(approx_eq(track.value(i64::MIN), track.value(i64::MIN + 1000)));

    track.set_extrapolator(Extrapolator::Extend);
    assert!(approx_eq(track.value(i64::MIN), 0.191));

    track.set_extrapolator(Extrapolator::Pingpong);
    assert!(approx_eq(track.value(i64::MIN), 0.191));
    assert!(approx_eq(track.value(i64::MAX), 0.194));

    track.set_extrapolator(Extrapolator::Clamp);
    assert!(approx_eq(track.value(i64::MIN), 0.0));
    assert!(approx_eq(track.value(i64::MAX), 1.0));
}

// ============================================================================
// Animation
// ============================================================================

#[test]
fn animation_has_ten_tracks_with_identity_defaults() {
    let anim = Animation::new();
    assert_eq!(anim.tracks().len(), TrackChannel::COUNT);
    assert_eq!(anim.position(123), Vec3::ZERO);
    assert_eq!(anim.scaling(123), Vec3::ONE);
    assert!(anim.rotation(123).abs_diff_eq(Quat::IDENTITY, EPSILON));
    assert_eq!(anim.start_time(), None);
}

#[test]
fn animation_policies_apply_to_every_track() {
    let mut anim = Animation::new();
    anim.set_interpolator(Interpolator::Step);
    anim.set_extrapolator(Extrapolator::Pingpong);
    for channel in TrackChannel::ALL {
        assert_eq!(anim.track(channel).interpolator(), Interpolator::Step);
        assert_eq!(anim.track(channel).extrapolator(), Extrapolator::Pingpong);
    }
}

#[test]
fn animation_writes_three_tracks_per_vector() {
    let mut anim = Animation::new();
    anim.set_position(Vec3::new(1.0, 2.0, 3.0), 100);
    anim.set_scaling(Vec3::splat(2.0), 300);

    assert_eq!(anim.track(TrackChannel::PosY).len(), 1);
    assert!(anim.track(TrackChannel::RotX).is_empty());
    assert_eq!(anim.track(TrackChannel::ScaleZ).len(), 1);
    assert_eq!(anim.start_time(), Some(100));
    assert_eq!(anim.end_time(), Some(300));
    assert!(anim.position(0).abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), EPSILON));
}

#[test]
fn rotation_keys_slerp_as_quaternions() {
    let mut anim = Animation::new();
    anim.set_rotation(Quat::IDENTITY, 0);
    anim.set_rotation(Quat::from_rotation_y(PI), 1000);

    let halfway = anim.rotation(500);
    let expected = Quat::from_rotation_y(PI / 2.0);
    assert!(halfway.dot(expected).abs() > 1.0 - EPSILON);
    assert!(approx_eq(halfway.length(), 1.0));
}

#[test]
fn rotation_step_holds_left_key() {
    let mut anim = Animation::new();
    anim.set_interpolator(Interpolator::Step);
    let q = Quat::from_rotation_x(0.7);
    anim.set_rotation(q, 0);
    anim.set_rotation(Quat::from_rotation_x(1.4), 1000);
    assert!(anim.rotation(999).abs_diff_eq(q, EPSILON));
}

#[test]
fn rotation_with_mismatched_tracks_is_normalized() {
    let mut anim = Animation::new();
    anim.track_mut(TrackChannel::RotW).set_value(0, 1.0);
    anim.track_mut(TrackChannel::RotW).set_value(1000, 1.0);
    anim.track_mut(TrackChannel::RotY).set_value(500, 1.0);

    let q = anim.rotation(500);
    assert!(approx_eq(q.length(), 1.0));
    let expected = Quat::from_rotation_y(PI / 2.0);
    assert!(q.dot(expected).abs() > 1.0 - EPSILON);
}
