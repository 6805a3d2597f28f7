use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use simulation::animation_clock::AnimationClock;
use simulation::config::CanopyConfig;
use simulation::feed_timer::FeedTimer;
use simulation::shader_registry::{ShaderRegistry, TreeSlot};
use simulation::tree_growth::TreeGrowthState;

pub const OVERLAY_TOGGLE_KEY: KeyCode = KeyCode::F3;

/// Whether the debug statistics overlay is shown.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebugOverlay(pub bool);

pub fn init_debug_overlay(mut commands: Commands, config: Res<CanopyConfig>) {
    commands.insert_resource(DebugOverlay(config.debug));
}

pub fn toggle_debug_overlay(keys: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<DebugOverlay>) {
    if keys.just_pressed(OVERLAY_TOGGLE_KEY) {
        overlay.0 = !overlay.0;
        info!("Debug overlay {}", if overlay.0 { "on" } else { "off" });
    }
}

pub fn format_fps(fps: Option<f64>, frame_ms: Option<f64>) -> String {
    match (fps, frame_ms) {
        (Some(fps), Some(ms)) => format!("{fps:.0} fps ({ms:.2} ms)"),
        (Some(fps), None) => format!("{fps:.0} fps"),
        _ => "-- fps".to_string(),
    }
}

pub fn stats_overlay_ui(
    mut contexts: EguiContexts,
    overlay: Res<DebugOverlay>,
    diagnostics: Res<DiagnosticsStore>,
    clock: Res<AnimationClock>,
    registry: Res<ShaderRegistry>,
    trees: Res<TreeGrowthState>,
    timer: Res<FeedTimer>,
) {
    if !overlay.0 {
        return;
    }
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed());
    let frame_ms = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(|d| d.smoothed());

    egui::Area::new(egui::Id::new("canopy_stats_overlay"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-12.0, 12.0))
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.monospace(format_fps(fps, frame_ms));
                ui.monospace(format!("fog time    {:>12.2}", clock.accumulated_time()));
                ui.monospace(format!(
                    "wind        {:>12.3} ({})",
                    clock.wind_intensity(),
                    if clock.wind_enabled() { "on" } else { "off" }
                ));
                ui.monospace(format!("fog shaders {:>12}", registry.live_fog_count()));
                ui.monospace(format!("broadcasts  {:>12}", registry.broadcast_count()));
                ui.monospace(format!("feed step   {:>12}", timer.timestep()));
                for slot in TreeSlot::ALL {
                    let gradient = registry
                        .color(slot)
                        .map(|c| format!("{:.2}", c.gradient_factor))
                        .unwrap_or_else(|| "--".to_string());
                    ui.monospace(format!(
                        "tree {}  growth {:.2}  gradient {}",
                        slot.index(),
                        trees.growth(slot),
                        gradient
                    ));
                }
            });
        });
}
