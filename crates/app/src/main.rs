use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::WinitSettings;

use simulation::config::CONFIG_ENV_VAR;

mod cli;

fn main() -> AppExit {
    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("canopy: {e}\n\n{}", cli::USAGE);
            return AppExit::error();
        }
    };
    if args.help {
        println!("{}", cli::USAGE);
        return AppExit::Success;
    }

    let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let config = match cli::load_config(&args, env_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("canopy: invalid configuration: {e}");
            return AppExit::error();
        }
    };

    // Shaders are composed before any window opens so a bad fog module
    // fails here rather than at first draw.
    let rendering = match rendering::RenderingPlugin::from_settings(&config.fog) {
        Ok(plugin) => plugin,
        Err(e) => {
            eprintln!("canopy: {e}");
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Canopy".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(WinitSettings::game())
        .insert_resource(config)
        .add_plugins((simulation::SimulationPlugin, rendering, ui::UiPlugin))
        .run()
}
