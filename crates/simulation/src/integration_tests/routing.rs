use crate::shader_registry::TreeSlot;
use crate::test_harness::TestScene;

// ====================================================================
// Sensor parameters → gradient + growth
// ====================================================================

#[test]
fn test_color_slots_registered_at_startup() {
    let scene = TestScene::new();
    for slot in 0..TreeSlot::COUNT {
        assert_eq!(
            scene.gradient_factor(slot),
            Some(0.0),
            "slot {slot} should start at the low gradient stop"
        );
    }
}

#[test]
fn test_no2_reading_visible_in_same_frame() {
    let mut scene = TestScene::new();
    scene.send_parameters(&[("no2", 0.3)]);
    scene.frame();
    let factor = scene.gradient_factor(0).unwrap_or(-1.0);
    let growth = scene.growth_target(0).unwrap_or(-1.0);
    assert!((factor - 0.7).abs() < 1e-12, "gradient factor {factor}");
    assert!((growth - 0.3).abs() < 1e-12, "growth target {growth}");
}

#[test]
fn test_full_batch_routes_each_slot() {
    let mut scene = TestScene::new();
    scene.send_parameters(&[("pm10", 1.0), ("co", 0.5), ("no2", 0.0)]);
    scene.frame();
    assert_eq!(scene.gradient_factor(0), Some(1.0));
    assert_eq!(scene.gradient_factor(1), Some(0.5));
    assert_eq!(scene.gradient_factor(2), Some(0.0));
    assert_eq!(scene.growth_target(2), Some(1.0));
}

#[test]
fn test_unknown_parameter_changes_nothing() {
    let mut scene = TestScene::new();
    scene.send_parameters(&[("ozone", 0.9)]);
    scene.frame();
    for slot in 0..TreeSlot::COUNT {
        assert_eq!(scene.gradient_factor(slot), Some(0.0));
        assert_eq!(scene.growth_target(slot), Some(0.0));
    }
}

#[test]
fn test_growth_eases_toward_target_over_frames() {
    let mut scene = TestScene::new();
    scene.send_parameters(&[("co", 0.8)]);
    scene.frame();
    let slot = TreeSlot::ALL[1];
    let first = scene.trees().growth(slot);
    assert!(first > 0.0 && first < 0.8, "one frame should only partly grow: {first}");
    scene.frames(300);
    assert_eq!(scene.trees().growth(slot), 0.8);
}

#[test]
fn test_later_reading_overrides_earlier() {
    let mut scene = TestScene::new();
    scene.send_parameters(&[("no2", 0.2)]);
    scene.frame();
    scene.send_parameters(&[("no2", 0.9)]);
    scene.frame();
    let factor = scene.gradient_factor(0).unwrap_or(-1.0);
    assert!((factor - 0.1).abs() < 1e-12, "got {factor}");
}

// ====================================================================
// Live parameters → wind
// ====================================================================

#[test]
fn test_wind_force_applied_before_broadcast() {
    let mut scene = TestScene::new();
    let slot = scene.register_fog_shaders(1)[0];
    scene.send_live(&[("windForce", 0.0)]);
    scene.frame();
    assert_eq!(scene.clock().wind_intensity(), 0.0);
    let strength = scene.registry().fog(slot).map(|s| s.wind_intensity).unwrap_or(-1.0);
    assert!((strength - 0.0005).abs() < 1e-12, "got {strength}");
}

#[test]
fn test_wind_force_does_not_touch_trees() {
    let mut scene = TestScene::new();
    scene.send_live(&[("windForce", 0.2), ("no2", 0.6)]);
    scene.frame();
    assert_eq!(scene.clock().wind_intensity(), 0.2);
    assert_eq!(scene.gradient_factor(0), Some(0.0));
    assert_eq!(scene.growth_target(0), Some(0.0));
}

#[test]
fn test_wind_force_out_of_range_clamped() {
    let mut scene = TestScene::new();
    scene.send_live(&[("windForce", -3.0)]);
    scene.frame();
    assert_eq!(scene.clock().wind_intensity(), 0.0);
}
