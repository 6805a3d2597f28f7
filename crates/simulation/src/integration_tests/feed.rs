use std::path::PathBuf;

use crate::config::CanopyConfig;
use crate::feed_timer::FeedTimer;
use crate::sensor_feed::{ActiveFeed, FeedSource};
use crate::test_harness::TestScene;

fn write_script(name: &str, json: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("canopy_{}_{}.json", name, std::process::id()));
    std::fs::write(&path, json).expect("temp dir should be writable");
    path
}

fn scripted_config(path: PathBuf, looping: bool) -> CanopyConfig {
    let mut config = CanopyConfig::default();
    config.feed.source = FeedSource::Scripted { path, looping };
    config.feed.interval_ms = 2000;
    config
}

// ====================================================================
// Feed timer + scripted feed → routed parameters
// ====================================================================

#[test]
fn test_disabled_feed_leaves_timer_stopped() {
    let scene = TestScene::new();
    assert!(!scene.resource::<FeedTimer>().is_running());
    assert!(scene.resource::<ActiveFeed>().name().is_none());
}

#[test]
fn test_scripted_feed_first_batch_applied_on_startup_frame() {
    let path = write_script(
        "first_batch",
        r#"[
            { "parameters": [{ "name": "no2", "value": 0.4 }],
              "live": [{ "name": "windForce", "value": 0.25 }] },
            { "parameters": [{ "name": "no2", "value": 0.9 }] }
        ]"#,
    );
    let scene = TestScene::with_config(scripted_config(path.clone(), false));
    let _ = std::fs::remove_file(&path);

    assert!(scene.resource::<FeedTimer>().is_running());
    assert_eq!(scene.resource::<FeedTimer>().timestep(), 1);
    let factor = scene.gradient_factor(0).unwrap_or(-1.0);
    assert!((factor - 0.6).abs() < 1e-12, "got {factor}");
    assert_eq!(scene.clock().wind_intensity(), 0.25);
}

#[test]
fn test_scripted_feed_advances_on_interval() {
    let path = write_script(
        "interval",
        r#"[
            { "parameters": [{ "name": "co", "value": 0.1 }] },
            { "parameters": [{ "name": "co", "value": 0.7 }] }
        ]"#,
    );
    let mut scene = TestScene::with_config(scripted_config(path.clone(), false));
    let _ = std::fs::remove_file(&path);

    // 2000 ms at 16 ms per frame: the second batch arrives after 125 frames.
    scene.frames(100);
    let early = scene.gradient_factor(1).unwrap_or(-1.0);
    assert!((early - 0.9).abs() < 1e-12, "still on first batch, got {early}");
    scene.frames(30);
    let late = scene.gradient_factor(1).unwrap_or(-1.0);
    assert!((late - 0.3).abs() < 1e-12, "second batch expected, got {late}");
}

#[test]
fn test_exhausted_feed_stops_timer() {
    let path = write_script(
        "exhausted",
        r#"[ { "parameters": [{ "name": "pm10", "value": 0.5 }] } ]"#,
    );
    let mut scene = TestScene::with_config(scripted_config(path.clone(), false));
    let _ = std::fs::remove_file(&path);

    scene.frames(130);
    assert!(scene.resource::<ActiveFeed>().is_exhausted());
    assert!(!scene.resource::<FeedTimer>().is_running());
    assert_eq!(scene.gradient_factor(2), Some(0.5));
}

#[test]
fn test_synthetic_feed_keeps_values_in_range() {
    let mut config = CanopyConfig::default();
    config.feed.source = FeedSource::Synthetic { seed: 5 };
    config.feed.interval_ms = 1100;
    let mut scene = TestScene::with_config(config);
    for _ in 0..20 {
        scene.frames(70);
        for slot in 0..3 {
            let f = scene.gradient_factor(slot).unwrap_or(-1.0);
            assert!((0.0..=1.0).contains(&f), "slot {slot} factor {f}");
        }
        let wind = scene.clock().wind_intensity();
        assert!((0.0..=1.0).contains(&wind));
    }
    assert!(scene.resource::<FeedTimer>().timestep() > 1);
}
