//! Integration tests for the repeat engine.
//!
//! Records operations through real gestures, then replays them at an offset
//! and checks where the next one lands.

use glam::Vec3;
use sculpt_lib::controller::{self, PointerRay};
use sculpt_lib::error::EditError;
use sculpt_lib::fixtures;
use sculpt_lib::harness::TestHarness;
use sculpt_lib::ops::PrimitiveKind;
use sculpt_lib::replay::{LastOperation, RepeatPrompt};
use sculpt_lib::state::ToolMode;
use sculpt_lib::viewport::camera::ArcBallCamera;
use shared::Primitive;
use tokio::sync::watch;

/// Wide slab under a front-facing camera (forward -Z, right +X)
fn slab_scene() -> TestHarness {
    let mut h = TestHarness::new();
    h.app.camera = ArcBallCamera::look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    h.add_shape(fixtures::box_shape(6.0, 2.0, 6.0, [0.0, 0.0, 0.0])).unwrap();
    h
}

/// Straight-line carve on top of the slab at `point`
fn straight_carve(h: &mut TestHarness, point: Vec3) {
    controller::toggle_straight_lines(&mut h.app);
    h.set_tool(ToolMode::Carve);
    h.click_from_above(point).unwrap();
}

fn recorded_point(h: &TestHarness) -> Vec3 {
    match h.app.replay.last() {
        Some(LastOperation::CustomSplit { point, .. } | LastOperation::PlaneSplit { point, .. }) => {
            *point
        }
        other => panic!("unexpected record {other:?}"),
    }
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

// ── Single repeats ──────────────────────────────────────────────

#[test]
fn test_repeat_without_record() {
    let mut h = TestHarness::new();
    assert_eq!(h.repeat(1.0), Err(EditError::NothingToRepeat));
    assert_eq!(
        h.last_notification().as_deref(),
        Some("Nothing to repeat yet. Carve or draw something first!")
    );
    assert_eq!(h.shape_count(), 0);
}

#[test]
fn test_horizontal_split_repeats_chain_upward() {
    let mut h = TestHarness::new();
    h.add_shape(fixtures::sphere_at(2.0, [0.0, 0.0, 0.0])).unwrap();
    h.set_tool(ToolMode::Carve);
    h.click(PointerRay::new(Vec3::new(-10.0, -1.0, 0.3), Vec3::X)).unwrap();
    assert_eq!(h.shape_count(), 2);
    assert!(matches!(h.app.replay.last(), Some(LastOperation::PlaneSplit { .. })));
    let p0 = recorded_point(&h);
    assert!((p0.y + 1.0).abs() < 1e-4);

    h.repeat(1.0).unwrap();
    assert_eq!(h.shape_count(), 3);
    assert!(approx(recorded_point(&h), p0 + Vec3::Y));

    h.repeat(1.0).unwrap();
    assert_eq!(h.shape_count(), 4);
    assert!(approx(recorded_point(&h), p0 + Vec3::Y * 2.0));
    assert!(matches!(
        h.app.replay.last(),
        Some(LastOperation::PlaneSplit { normal, .. }) if *normal == Vec3::Y
    ));
    assert!(h.is_in_sync());
}

#[test]
fn test_split_repeats_chain_along_normal() {
    let mut h = slab_scene();
    let p0 = Vec3::new(0.4, 1.0, 1.1);
    straight_carve(&mut h, p0);
    assert_eq!(h.shape_count(), 2);
    assert!(approx(recorded_point(&h), p0));

    h.repeat(1.0).unwrap();
    assert_eq!(h.shape_count(), 3);
    assert!(approx(recorded_point(&h), p0 + Vec3::NEG_Z));
    assert_eq!(h.last_notification().as_deref(), Some("Carve repeated 1cm away!"));

    h.repeat(1.0).unwrap();
    assert_eq!(h.shape_count(), 4);
    assert!(approx(recorded_point(&h), p0 + Vec3::NEG_Z * 2.0));
    assert!(h.is_in_sync());
}

#[test]
fn test_repeat_miss_keeps_record() {
    let mut h = slab_scene();
    let p0 = Vec3::new(0.4, 1.0, 1.1);
    straight_carve(&mut h, p0);
    let before = h.ids();

    assert_eq!(h.repeat(50.0), Err(EditError::NoTarget));
    assert_eq!(h.ids(), before);
    assert!(approx(recorded_point(&h), p0));
    assert_eq!(
        h.last_notification().as_deref(),
        Some("Could not find a design at the offset distance.")
    );
}

#[test]
fn test_zero_distance_uses_default() {
    let mut h = slab_scene();
    let p0 = Vec3::new(0.4, 1.0, 1.1);
    straight_carve(&mut h, p0);

    h.repeat(0.0).unwrap();
    let d = h.app.settings.replay.default_distance;
    assert!(approx(recorded_point(&h), p0 + Vec3::NEG_Z * d));
}

#[test]
fn test_bore_repeat_moves_right() {
    let mut h = slab_scene();
    h.set_tool(ToolMode::CircleCarve);
    h.click_from_above(Vec3::new(-1.2, 1.0, 0.3)).unwrap();
    assert!(h.notified("Perfect circular hole carved!"));

    h.repeat(1.5).unwrap();
    assert_eq!(h.shape_count(), 1);
    assert!(h.notified("Carve repeated 1.5cm away!"));
    match h.app.replay.last() {
        Some(LastOperation::CircularBore { point, .. }) => {
            assert!(approx(*point, Vec3::new(0.3, 1.0, 0.3)));
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn test_sketch_repeat_moves_right() {
    let mut h = slab_scene();
    h.set_tool(ToolMode::SketchCarve);
    h.stroke(&fixtures::square_outline(Vec3::new(-1.5, 0.0, 0.0), Vec3::X, Vec3::Y, 0.3))
        .unwrap();
    assert!(h.notified("Custom shape carved successfully!"));

    h.repeat(1.0).unwrap();
    assert!(h.notified("Sketch carve repeated 1cm away!"));
    match h.app.replay.last() {
        Some(LastOperation::FreeformCut(profile)) => {
            assert!(approx(profile.center, Vec3::new(-0.5, 0.0, 0.0)));
        }
        other => panic!("unexpected record {other:?}"),
    }
}

#[test]
fn test_sketch_repeat_off_the_edge() {
    let mut h = slab_scene();
    h.set_tool(ToolMode::SketchCarve);
    h.stroke(&fixtures::square_outline(Vec3::ZERO, Vec3::X, Vec3::Y, 0.3)).unwrap();

    assert_eq!(h.repeat(20.0), Err(EditError::NoIntersection));
    assert_eq!(
        h.last_notification().as_deref(),
        Some("Repeated sketch didn't intersect any design.")
    );
}

#[test]
fn test_tube_repeat_adds_shifted_copy() {
    let mut h = TestHarness::new();
    h.app.camera = ArcBallCamera::look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    h.set_tool(ToolMode::Draw);
    h.stroke(&fixtures::helix(Vec3::ZERO, 1.0, 2.0, 12)).unwrap();
    let first = h.shapeify().unwrap();

    h.repeat(2.0).unwrap();
    assert_eq!(h.shape_count(), 2);
    assert!(h.notified("Drawn shape repeated 2cm away!"));

    let copy = h.ids()[1].clone();
    let a = h.mesh_of(&first).unwrap().positions[0];
    let b = h.mesh_of(&copy).unwrap().positions[0];
    assert!(approx(b - a, Vec3::new(2.0, 0.0, 0.0)));
}

#[test]
fn test_ring_repeat() {
    let mut h = TestHarness::new();
    h.app.camera = ArcBallCamera::look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    h.add_primitive(PrimitiveKind::Ring, Some(Vec3::ZERO)).unwrap();

    h.repeat(2.0).unwrap();
    assert_eq!(h.shape_count(), 2);
    assert_eq!(h.last_notification().as_deref(), Some("Ring repeated 2cm away!"));
    let copy = h.ids()[1].clone();
    assert_eq!(h.position_of(&copy), Some(Vec3::new(2.0, 0.0, 0.0)));
}

#[test]
fn test_drawn_circle_repeat_keeps_radius() {
    let mut h = TestHarness::new();
    h.app.camera = ArcBallCamera::look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    h.set_tool(ToolMode::CircleDraw);
    controller::pointer_down(
        &mut h.app,
        controller::PointerRay::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y),
    )
    .unwrap();
    controller::pointer_move(
        &mut h.app,
        controller::PointerRay::new(Vec3::new(0.8, 10.0, 0.0), Vec3::NEG_Y),
    );
    controller::pointer_up(&mut h.app).unwrap();

    h.repeat(3.0).unwrap();
    assert!(h.notified("Circle repeated 3cm away!"));

    let copy = h.shape(&h.ids()[1]).unwrap();
    match copy.geometry.primitive() {
        Some(Primitive::Torus { radius, .. }) => assert!((radius - 0.8).abs() < 1e-4),
        other => panic!("unexpected geometry {other:?}"),
    }
    assert!((copy.transform.rotation[0] - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
}

// ── Prompt ──────────────────────────────────────────────────────

#[test]
fn test_prompt_follows_record_kind() {
    let mut h = slab_scene();
    straight_carve(&mut h, Vec3::new(0.4, 1.0, 1.1));
    assert_eq!(h.app.replay.prompt(), RepeatPrompt::Choices);
    assert_eq!(h.app.replay.prompt_title(), Some("Repeat last carve?"));

    h.app.replay.show_prompt(RepeatPrompt::Equal);
    assert_eq!(h.app.replay.prompt(), RepeatPrompt::Equal);

    h.add_primitive(PrimitiveKind::Ring, Some(Vec3::new(8.0, 0.0, 0.0)));
    assert_eq!(h.app.replay.prompt_title(), Some("Repeat last shape?"));
    h.app.replay.show_prompt(RepeatPrompt::Equal);
    assert_eq!(h.app.replay.prompt(), RepeatPrompt::Choices);
}

#[test]
fn test_pointer_down_hides_prompt() {
    let mut h = slab_scene();
    straight_carve(&mut h, Vec3::new(0.4, 1.0, 1.1));
    h.set_tool(ToolMode::Select);
    h.click_from_above(Vec3::new(20.0, 0.0, 0.0)).unwrap();
    assert_eq!(h.app.replay.prompt(), RepeatPrompt::Hidden);
    assert!(h.app.replay.last().is_some());
}

// ── Multi-repeat ────────────────────────────────────────────────

#[tokio::test]
async fn test_repeat_many_applies_every_attempt() {
    let mut h = slab_scene();
    let p0 = Vec3::new(0.4, 1.0, 1.7);
    straight_carve(&mut h, p0);

    let report = h.repeat_many(3, 1.0, None).await.unwrap();
    assert_eq!(report.attempts.len(), 3);
    assert_eq!(report.succeeded(), 3);
    assert!(!report.cancelled);
    assert_eq!(h.shape_count(), 5);
    assert!(approx(recorded_point(&h), p0 + Vec3::NEG_Z * 3.0));

    assert!(h.notified("Applying 3 repeated carves..."));
    assert_eq!(h.last_notification().as_deref(), Some("Finished 3 repeated carves!"));
    assert_eq!(h.app.replay.prompt(), RepeatPrompt::Hidden);
}

#[tokio::test]
async fn test_repeat_many_keeps_going_after_misses() {
    let mut h = slab_scene();
    straight_carve(&mut h, Vec3::new(0.4, 1.0, 1.1));
    let before = h.shape_count();

    let report = h.repeat_many(3, 40.0, None).await.unwrap();
    assert_eq!(report.attempts.len(), 3);
    assert_eq!(report.succeeded(), 0);
    assert!(report.attempts.iter().all(|a| *a == Err(EditError::NoTarget)));
    assert_eq!(h.shape_count(), before);
    assert!(h.notified("Finished 3 repeated carves!"));
}

#[tokio::test]
async fn test_repeat_many_without_record() {
    let mut h = TestHarness::new();
    let result = h.repeat_many(2, 1.0, None).await;
    assert!(matches!(result, Err(EditError::NothingToRepeat)));
    assert_eq!(
        h.notifications.messages(),
        vec!["Nothing to repeat yet. Carve or draw something first!".to_string()]
    );
}

#[tokio::test]
async fn test_repeat_many_cancelled_up_front() {
    let mut h = slab_scene();
    straight_carve(&mut h, Vec3::new(0.4, 1.0, 1.1));
    let before = h.shape_count();

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();
    let report = h.repeat_many(5, 1.0, Some(rx)).await.unwrap();

    assert!(report.cancelled);
    assert!(report.attempts.is_empty());
    assert_eq!(h.shape_count(), before);
    assert!(!h.notified("Finished 5 repeated carves!"));
}

#[tokio::test(start_paused = true)]
async fn test_repeat_many_cancelled_midway() {
    let mut settings = sculpt_lib::state::EditorSettings::headless();
    settings.replay.repeat_pacing_ms = 200;
    let mut h = TestHarness::with_settings(settings);
    h.app.camera = ArcBallCamera::look_from(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
    h.add_primitive(PrimitiveKind::Ring, Some(Vec3::ZERO)).unwrap();

    let (tx, rx) = watch::channel(false);
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        let _ = tx.send(true);
    });

    let report = h.repeat_many(10, 1.0, Some(rx)).await.unwrap();
    canceller.await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(h.shape_count(), 3);
}
