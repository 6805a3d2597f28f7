use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use simulation::frame_sets::FrameSet;

pub mod parameter_panel;
pub mod stats_overlay;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }
        if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
            app.add_plugins(FrameTimeDiagnosticsPlugin);
        }

        app.add_systems(
            Startup,
            (
                parameter_panel::init_parameter_panel,
                stats_overlay::init_debug_overlay,
            ),
        )
        .add_systems(
            Update,
            (
                // Panel edits go out in the Feed set so they are routed this frame.
                (
                    parameter_panel::toggle_parameter_panel,
                    parameter_panel::parameter_panel_ui,
                )
                    .chain()
                    .in_set(FrameSet::Feed)
                    .after(simulation::sensor_feed::drive_sensor_feed),
                parameter_panel::sync_panel_with_batches.in_set(FrameSet::Route),
                (
                    stats_overlay::toggle_debug_overlay,
                    stats_overlay::stats_overlay_ui,
                )
                    .chain(),
            ),
        );
    }
}
