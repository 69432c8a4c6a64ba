mod common;

use std::f32::consts::PI;

use approx::assert_relative_eq;
use choreo_animation_core::{
    Animation, AnimationStep, ObjectAnimation, ObjectId, ObjectState, Rect, Scene,
};
use common::{approx, run_until_idle};
use nalgebra::Matrix4;

fn sample_deltas() -> Vec<ObjectAnimation> {
    vec![
        ObjectAnimation::new(),
        ObjectAnimation::new().with_planar_scale(2.0, 0.25).with_opacity_delta(-0.7),
        ObjectAnimation::new()
            .with_rotation(PI / 3.0, [1.0, 2.0, 0.5])
            .with_scale(0.5, 3.0, 1.5)
            .with_translation(-4.0, 12.0, 30.0),
        ObjectAnimation::new()
            .with_planar_rotation(2.5 * PI)
            .with_sublayer_rotation(0.4, [0.0, 1.0, 0.0])
            .with_sublayer_scale(1.2, 1.2, 1.0)
            .with_sublayer_translation(0.0, 0.0, -50.0)
            .with_sublayer_camera_z(-600.0)
            .with_anchor_translation(0.0, -0.5, 0.0)
            .toggling_rasterization()
            .with_rasterization_scale_delta(1.0),
        ObjectAnimation::from_rect_to_rect(
            Rect::new(10.0, 10.0, 40.0, 80.0),
            Rect::new(100.0, -20.0, 10.0, 10.0),
        ),
    ]
}

#[test]
fn delta_then_inverse_is_identity() {
    for delta in sample_deltas() {
        let round_trip = delta.compose(&delta.inverse());
        assert!(round_trip.is_identity(1e-4), "{delta:?} -> {round_trip:?}");
        assert_relative_eq!(round_trip.transform(), Matrix4::identity(), epsilon = 1e-4);
        assert_relative_eq!(round_trip.sublayer_transform(), Matrix4::identity(), epsilon = 1e-4);
        approx(round_trip.opacity_delta(), 0.0, 1e-6);
    }
}

#[test]
fn composed_matrix_follows_rotate_scale_translate() {
    let delta = ObjectAnimation::new()
        .with_rotation(0.8, [0.0, 0.0, 1.0])
        .with_scale(2.0, 2.0, 2.0)
        .with_translation(5.0, 6.0, 7.0);
    let expected = Matrix4::new_translation(&nalgebra::Vector3::new(5.0, 6.0, 7.0))
        * Matrix4::new_scaling(2.0)
        * Matrix4::new_rotation(nalgebra::Vector3::new(0.0, 0.0, 0.8));
    assert_relative_eq!(delta.transform(), expected, epsilon = 1e-5);
}

fn assert_same_state(a: &ObjectState, b: &ObjectState) {
    approx(a.frame.x, b.frame.x, 1e-3);
    approx(a.frame.y, b.frame.y, 1e-3);
    approx(a.frame.width, b.frame.width, 1e-3);
    approx(a.frame.height, b.frame.height, 1e-3);
    approx(a.opacity, b.opacity, 1e-5);
    for axis in 0..3 {
        approx(a.transform.translation[axis], b.transform.translation[axis], 1e-3);
        approx(a.transform.scale[axis], b.transform.scale[axis], 1e-4);
        approx(a.anchor[axis], b.anchor[axis], 1e-5);
    }
    approx(a.transform.rotation.angle_to(&b.transform.rotation), 0.0, 1e-3);
    approx(a.sublayer_camera_z, b.sublayer_camera_z, 1e-3);
    assert_eq!(a.should_rasterize, b.should_rasterize);
}

fn mixed_animation(card: ObjectId, badge: ObjectId) -> Animation {
    Animation::new([
        AnimationStep::frame()
            .tag("resize")
            .duration(0.2)
            .animate(card, ObjectAnimation::new().with_planar_scale(1.5, 0.5).with_planar_translation(20.0, -8.0))
            .build()
            .unwrap(),
        AnimationStep::layer()
            .tag("spin")
            .duration(0.3)
            .animate(
                card,
                ObjectAnimation::new()
                    .with_rotation(PI / 2.0, [0.0, 1.0, 0.0])
                    .with_sublayer_camera_z(400.0)
                    .toggling_rasterization(),
            )
            .animate(badge, ObjectAnimation::new().with_scale(3.0, 3.0, 1.0).with_opacity_delta(-0.6))
            .build()
            .unwrap(),
        AnimationStep::layer()
            .tag("drop")
            .duration(0.1)
            .animate(badge, ObjectAnimation::new().with_translation(0.0, 40.0, 0.0).with_anchor_translation(0.1, 0.0, 0.0))
            .build()
            .unwrap(),
    ])
    .with_tag("mixed")
}

#[test]
fn reverse_after_forward_restores_every_object() {
    let mut scene = Scene::new();
    let card = scene.add_object(Rect::new(0.0, 0.0, 100.0, 60.0));
    let badge = scene.add_object(Rect::new(80.0, -10.0, 20.0, 20.0));
    let initial: Vec<ObjectState> = [card, badge].iter().map(|id| *scene.state(*id).unwrap()).collect();

    let mut forward = mixed_animation(card, badge);
    let mut backward = forward.reverse_animation();
    forward.play(&mut scene, true).unwrap();
    run_until_idle(&mut scene, &mut forward, 0.02);
    backward.play(&mut scene, true).unwrap();
    run_until_idle(&mut scene, &mut backward, 0.02);

    for (id, before) in [card, badge].iter().zip(&initial) {
        assert_same_state(scene.state(*id).unwrap(), before);
    }
}

#[test]
fn reverse_before_forward_also_restores() {
    let mut scene = Scene::new();
    let card = scene.add_object(Rect::new(0.0, 0.0, 100.0, 60.0));
    let badge = scene.add_object(Rect::new(80.0, -10.0, 20.0, 20.0));
    let initial = *scene.state(badge).unwrap();

    let mut forward = mixed_animation(card, badge);
    let mut backward = forward.reverse_animation();
    backward.play(&mut scene, false).unwrap();
    forward.play(&mut scene, false).unwrap();

    assert_same_state(scene.state(badge).unwrap(), &initial);
}

#[test]
fn loop_doubles_duration_and_returns_home() {
    let mut scene = Scene::new();
    let card = scene.add_object(Rect::new(0.0, 0.0, 100.0, 60.0));
    let badge = scene.add_object(Rect::new(80.0, -10.0, 20.0, 20.0));
    let home = *scene.state(card).unwrap();

    let anim = mixed_animation(card, badge);
    let mut looped = anim.loop_animation();
    approx(looped.duration(), 2.0 * anim.duration(), 1e-6);
    assert_eq!(looped.steps().len(), 6);
    assert_eq!(looped.steps()[3].tag(), Some("loop_reverse_drop"));

    looped.play(&mut scene, true).unwrap();
    let elapsed = run_until_idle(&mut scene, &mut looped, 0.02);
    approx(elapsed, 1.2, 0.07);
    assert_same_state(scene.state(card).unwrap(), &home);
}

#[test]
fn reverse_keeps_step_kinds_and_durations() {
    let anim = mixed_animation(ObjectId(0), ObjectId(1));
    let reversed = anim.reverse_animation();
    let forward: Vec<_> = anim.steps().iter().map(|s| (s.kind(), s.duration())).collect();
    let mut backward: Vec<_> = reversed.steps().iter().map(|s| (s.kind(), s.duration())).collect();
    backward.reverse();
    assert_eq!(forward, backward);
    approx(reversed.duration(), anim.duration(), 1e-6);
}
