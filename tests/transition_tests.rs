//! Transition tests
//!
//! Tests for:
//! - Mix factor progression over a transition window
//! - Collapse onto the target once the window has passed
//! - Recursive application and the no-op case
//! - Quaternion blending between rotations

use anim_rig::{AnimError, EvalContext, NodeHandle, Scene};
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

/// A node whose animation 0 rests at the origin and animation 1 at (8, 0, 0).
fn two_poses(scene: &mut Scene) -> NodeHandle {
    let node = scene.create_node();
    scene.set_position(node, Vec3::ZERO, 0).unwrap();
    let target = scene.add_node_animation(node).unwrap();
    scene
        .edit_animation(node, target, |anim| anim.set_position(Vec3::new(8.0, 0.0, 0.0), 0))
        .unwrap();
    node
}

// ============================================================================
// Progression
// ============================================================================

#[test]
fn mix_runs_from_zero_to_one() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.transition(node, 1, 1000, 400).unwrap();

    assert!(vec3_approx(scene.node_position(node, 1000).unwrap(), Vec3::ZERO));
    assert!(vec3_approx(scene.node_position(node, 1100).unwrap(), Vec3::new(2.0, 0.0, 0.0)));
    assert!(vec3_approx(scene.node_position(node, 1400).unwrap(), Vec3::new(8.0, 0.0, 0.0)));
}

#[test]
fn mix_is_monotonic() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.transition(node, 1, 0, 1000).unwrap();

    let mut last = -1.0;
    for time in (0..=1000).step_by(50) {
        scene.update_transitions(node, time).unwrap();
        let mix = scene.active_mix(node).unwrap();
        assert!(mix >= last);
        assert!((0.0..=1.0).contains(&mix));
        last = mix;
    }
    assert!((last - 1.0).abs() < EPSILON);
}

#[test]
fn transition_collapses_after_window() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.transition(node, 1, 1000, 400).unwrap();
    assert!(scene.transition_state(node).unwrap().is_some());
    assert_eq!(scene.active_animation_index(node, 1).unwrap(), Some(1));

    scene.update_transitions(node, 1400).unwrap();
    assert_eq!(scene.active_animation_index(node, 0).unwrap(), Some(0));

    scene.update_transitions(node, 1401).unwrap();
    assert_eq!(scene.transition_state(node).unwrap(), None);
    assert_eq!(scene.active_animation_index(node, 0).unwrap(), Some(1));
    assert_eq!(scene.active_animation_index(node, 1).unwrap(), None);
    assert_eq!(scene.animation_offset(node, 0).unwrap(), 1000);
    assert!(scene.active_mix(node).unwrap().abs() < EPSILON);
}

#[test]
fn read_only_queries_see_the_collapsed_state() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.transition(node, 1, 0, 100).unwrap();

    // nothing committed yet
    assert!(vec3_approx(scene.node_position(node, 500).unwrap(), Vec3::new(8.0, 0.0, 0.0)));
    assert!(scene.transition_state(node).unwrap().is_some());
}

#[test]
fn evaluate_commits_transitions() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.transition(node, 1, 0, 100).unwrap();

    scene.evaluate(node, 50).unwrap();
    assert!((scene.active_mix(node).unwrap() - 0.5).abs() < EPSILON);
    assert!(vec3_approx(scene.get_node(node).unwrap().matrix().translation.into(), Vec3::new(4.0, 0.0, 0.0)));

    scene.evaluate(node, 101).unwrap();
    assert_eq!(scene.active_animation_index(node, 0).unwrap(), Some(1));
}

#[test]
fn target_is_sampled_relative_to_start() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    let walk = scene.add_node_animation(node).unwrap();
    scene
        .edit_animation(node, walk, |anim| {
            anim.set_position(Vec3::ZERO, 0);
            anim.set_position(Vec3::new(0.0, 0.0, 10.0), 1000);
        })
        .unwrap();

    scene.transition(node, walk, 5000, 0).unwrap();
    scene.update_transitions(node, 5001).unwrap();
    assert!(vec3_approx(scene.node_position(node, 5500).unwrap(), Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn extreme_query_times_resolve() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.set_node_animation_offset(node, 500, 0).unwrap();
    scene.transition(node, 1, 10, 100).unwrap();

    assert!(vec3_approx(scene.node_position(node, i64::MIN).unwrap(), Vec3::ZERO));
    assert!(vec3_approx(scene.node_position(node, i64::MAX).unwrap(), Vec3::new(8.0, 0.0, 0.0)));

    let mut ctx = EvalContext::new();
    scene.matrix(&mut ctx, node, i64::MIN).unwrap();
    scene.update_transitions(node, i64::MAX).unwrap();
    assert_eq!(scene.active_animation_index(node, 0).unwrap(), Some(1));
    assert!(vec3_approx(scene.node_position(node, i64::MIN).unwrap(), Vec3::new(8.0, 0.0, 0.0)));
}

// ============================================================================
// Recursion
// ============================================================================

#[test]
fn transition_applies_to_descendants() {
    let mut scene = Scene::new();
    let root = two_poses(&mut scene);
    let child = two_poses(&mut scene);
    scene.link(root, child).unwrap();

    scene.transition(root, 1, 0, 200).unwrap();
    assert!(scene.transition_state(child).unwrap().is_some());

    scene.update_transitions(root, 201).unwrap();
    assert_eq!(scene.active_animation_index(child, 0).unwrap(), Some(1));
}

#[test]
fn transition_to_current_primary_is_a_noop() {
    let mut scene = Scene::new();
    let root = two_poses(&mut scene);
    let child = two_poses(&mut scene);
    scene.link(root, child).unwrap();
    scene.use_node_animation(child, 1).unwrap();

    scene.transition(root, 0, 0, 200).unwrap();
    assert_eq!(scene.transition_state(root).unwrap(), None);
    assert_eq!(scene.transition_state(child).unwrap(), None);
    assert_eq!(scene.active_animation_index(child, 0).unwrap(), Some(1));
}

#[test]
fn invalid_target_changes_nothing() {
    let mut scene = Scene::new();
    let root = two_poses(&mut scene);
    let child = scene.create_node();
    scene.link(root, child).unwrap();

    assert_eq!(
        scene.transition(root, 1, 0, 100),
        Err(AnimError::InvalidAnimationIndex { index: 1, count: 1 })
    );
    assert_eq!(scene.transition_state(root).unwrap(), None);
}

#[test]
fn node_transition_leaves_children_alone() {
    let mut scene = Scene::new();
    let root = two_poses(&mut scene);
    let child = two_poses(&mut scene);
    scene.link(root, child).unwrap();

    scene.node_transition(root, 1, 0, 100).unwrap();
    assert!(scene.transition_state(root).unwrap().is_some());
    assert_eq!(scene.transition_state(child).unwrap(), None);
}

// ============================================================================
// Rotation blending
// ============================================================================

#[test]
fn rotation_blend_follows_shortest_arc() {
    let mut scene = Scene::new();
    let node = scene.create_node();
    scene.set_rotation(node, Quat::IDENTITY, 0).unwrap();
    let turned = scene.add_node_animation(node).unwrap();
    scene
        .edit_animation(node, turned, |anim| anim.set_rotation(Quat::from_rotation_y(PI), 0))
        .unwrap();

    scene.transition(node, turned, 0, 1000).unwrap();
    assert!(quat_approx(scene.node_rotation(node, 0).unwrap(), Quat::IDENTITY));
    assert!(quat_approx(scene.node_rotation(node, 500).unwrap(), Quat::from_rotation_y(FRAC_PI_2)));
    assert!(quat_approx(scene.node_rotation(node, 1000).unwrap(), Quat::from_rotation_y(PI)));
}

#[test]
fn lazy_matrices_track_the_blend() {
    let mut scene = Scene::new();
    let node = two_poses(&mut scene);
    scene.transition(node, 1, 0, 100).unwrap();

    let mut ctx = EvalContext::new();
    for (time, x) in [(0, 0.0), (25, 2.0), (50, 4.0), (100, 8.0), (150, 8.0)] {
        let pos = scene.world_position(&mut ctx, node, time).unwrap();
        assert!(vec3_approx(pos, Vec3::new(x, 0.0, 0.0)));
    }
}
