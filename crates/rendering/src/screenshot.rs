use std::path::{Path, PathBuf};

use bevy::core::FrameCount;
use bevy::prelude::*;
use bevy::render::view::screenshot::{save_to_disk, Screenshot};

pub const SCREENSHOT_KEY: KeyCode = KeyCode::F12;
pub const SCREENSHOT_DIR: &str = "screenshots";

/// `<dir>/canopy_<unix seconds>_<frame>.png`. The frame number keeps two
/// captures within the same second apart.
pub fn screenshot_path(dir: &Path, unix_secs: u64, frame: u32) -> PathBuf {
    dir.join(format!("canopy_{unix_secs}_{frame:06}.png"))
}

pub fn handle_screenshot_key(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    frame: Res<FrameCount>,
) {
    if !keyboard.just_pressed(SCREENSHOT_KEY) {
        return;
    }
    let dir = Path::new(SCREENSHOT_DIR);
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create {}: {}", dir.display(), e);
        return;
    }
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let path = screenshot_path(dir, secs, frame.0);
    info!("Saving screenshot to {}", path.display());
    commands
        .spawn(Screenshot::primary_window())
        .observe(save_to_disk(path));
}
