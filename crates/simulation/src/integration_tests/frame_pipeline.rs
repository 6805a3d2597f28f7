use crate::test_harness::{TestScene, FRAME};

// ====================================================================
// Clock → broadcast → fog uniform sets
// ====================================================================

#[test]
fn test_every_fog_shader_sees_same_time_after_frame() {
    let mut scene = TestScene::new();
    let slots = scene.register_fog_shaders(5);
    scene.frames(3);

    let expected = scene.clock().accumulated_time();
    for slot in slots {
        let set = scene.registry().fog(slot).copied().expect("slot should be live");
        assert_eq!(
            set.fog_time, expected,
            "fog time of {slot:?} should equal the clock after broadcast"
        );
        assert!(set.wind_enabled);
    }
}

#[test]
fn test_broadcast_runs_once_per_frame() {
    let mut scene = TestScene::new();
    let before = scene.registry().broadcast_count();
    scene.frames(10);
    assert_eq!(scene.registry().broadcast_count() - before, 10);
}

#[test]
fn test_accumulated_time_never_decreases() {
    let mut scene = TestScene::new().with_wind(0.3);
    let mut last = scene.clock().accumulated_time();
    for _ in 0..50 {
        scene.frame();
        let now = scene.clock().accumulated_time();
        assert!(now >= last, "time went backwards: {last} -> {now}");
        last = now;
    }
}

#[test]
fn test_calm_wind_tracks_real_time() {
    let mut scene = TestScene::new().with_wind(0.0);
    let start = scene.clock().accumulated_time();
    let n = 30;
    scene.frames(n);
    let advanced = scene.clock().accumulated_time() - start;
    let frame = FRAME.as_secs_f64();
    assert!(
        advanced >= frame * (n - 1) as f64 && advanced <= frame * (n + 1) as f64,
        "with no wind, {n} frames should add ~{} s, got {advanced}",
        frame * n as f64
    );
}

#[test]
fn test_full_wind_adds_two_seconds_per_frame() {
    let mut scene = TestScene::new().with_wind(1.0);
    let start = scene.clock().accumulated_time();
    scene.frames(10);
    let advanced = scene.clock().accumulated_time() - start;
    assert!(
        advanced >= 20.0 && advanced < 20.0 + 11.0 * FRAME.as_secs_f64(),
        "expected 20 s of wind increment plus real time, got {advanced}"
    );
}

#[test]
fn test_disabled_wind_flag_reaches_shaders() {
    let mut scene = TestScene::new().with_wind_enabled(false);
    let slots = scene.register_fog_shaders(2);
    scene.frame();
    for slot in slots {
        assert_eq!(scene.registry().fog(slot).map(|s| s.wind_enabled), Some(false));
    }
}

#[test]
fn test_shader_strength_follows_wind() {
    let mut scene = TestScene::new().with_wind(0.0);
    let slot = scene.register_fog_shaders(1)[0];
    scene.frame();
    let calm = scene.registry().fog(slot).map(|s| s.wind_intensity).unwrap_or(0.0);
    assert!((calm - 0.0005).abs() < 1e-12, "got {calm}");
}

// ====================================================================
// Lifecycle
// ====================================================================

#[test]
fn test_released_shader_no_longer_updated() {
    let mut scene = TestScene::new();
    let slots = scene.register_fog_shaders(3);
    scene.frame();
    assert!(scene.resource_mut::<crate::shader_registry::ShaderRegistry>().release_fog(slots[1]));
    scene.frames(2);
    assert!(scene.registry().fog(slots[1]).is_none());
    assert_eq!(scene.registry().live_fog_count(), 2);
    let expected = scene.clock().accumulated_time();
    assert_eq!(scene.registry().fog(slots[2]).map(|s| s.fog_time), Some(expected));
}

#[test]
fn test_shader_registered_mid_run_joins_next_broadcast() {
    let mut scene = TestScene::new();
    scene.frames(5);
    let late = scene.register_fog_shaders(1)[0];
    assert_eq!(scene.registry().fog(late).map(|s| s.fog_time), Some(0.0));
    scene.frame();
    let expected = scene.clock().accumulated_time();
    assert_eq!(scene.registry().fog(late).map(|s| s.fog_time), Some(expected));
}

#[test]
fn test_exit_releases_all_uniform_sets() {
    let mut scene = TestScene::new();
    scene.register_fog_shaders(4);
    scene.frame();
    scene.exit();
    assert_eq!(scene.registry().live_fog_count(), 0);
    assert_eq!(scene.gradient_factor(0), None);
}
