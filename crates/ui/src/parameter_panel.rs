//! Parameter panel: hand-driven stand-in for the external parameter store.
//!
//! - one slider per numeric parameter, sent as a `ParameterBatch`
//! - a slider for the wind signal, sent as a `LiveParameterBatch`
//! - wind on/off toggle
//! - feed timer start / stop / reset
//!
//! Slider positions follow incoming batches, so feed readings show up here.
//! `P` toggles the panel.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use simulation::animation_clock::AnimationClock;
use simulation::config::CanopyConfig;
use simulation::feed_timer::FeedTimer;
use simulation::parameter_router::{LiveParameterBatch, NamedParameter, ParameterBatch};
use simulation::sensor_feed::ActiveFeed;

pub const PANEL_TOGGLE_KEY: KeyCode = KeyCode::KeyP;

#[derive(Debug, Clone, PartialEq)]
pub struct SliderState {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

#[derive(Resource, Debug, Clone)]
pub struct ParameterPanel {
    pub visible: bool,
    pub sliders: Vec<SliderState>,
    pub wind_signal: String,
    pub wind: f64,
}

impl ParameterPanel {
    pub fn from_config(config: &CanopyConfig) -> Self {
        let sliders = config
            .parameters
            .numeric_parameters
            .iter()
            .map(|p| SliderState {
                name: p.name.clone(),
                min: p.min,
                max: p.max,
                value: p.value,
            })
            .collect();
        Self {
            visible: true,
            sliders,
            wind_signal: config.wind_signal.clone(),
            wind: config.initial_wind_intensity(),
        }
    }

    /// Move a slider to reflect a reading. Returns false for unknown names.
    pub fn observe(&mut self, param: &NamedParameter) -> bool {
        if param.name == self.wind_signal {
            self.wind = param.value.clamp(0.0, 1.0);
            return true;
        }
        match self.sliders.iter_mut().find(|s| s.name == param.name) {
            Some(slider) => {
                slider.value = param.value.clamp(slider.min, slider.max);
                true
            }
            None => false,
        }
    }
}

pub fn init_parameter_panel(mut commands: Commands, config: Res<CanopyConfig>) {
    commands.insert_resource(ParameterPanel::from_config(&config));
}

pub fn toggle_parameter_panel(keys: Res<ButtonInput<KeyCode>>, mut panel: ResMut<ParameterPanel>) {
    if keys.just_pressed(PANEL_TOGGLE_KEY) {
        panel.visible = !panel.visible;
    }
}

/// Keep sliders in step with batches from the feed (and our own edits).
pub fn sync_panel_with_batches(
    mut numeric: EventReader<ParameterBatch>,
    mut live: EventReader<LiveParameterBatch>,
    mut panel: ResMut<ParameterPanel>,
) {
    for batch in numeric.read() {
        for param in &batch.0 {
            panel.observe(param);
        }
    }
    for batch in live.read() {
        for param in &batch.0 {
            panel.observe(param);
        }
    }
}

pub fn parameter_panel_ui(
    mut contexts: EguiContexts,
    mut panel: ResMut<ParameterPanel>,
    mut clock: ResMut<AnimationClock>,
    mut timer: ResMut<FeedTimer>,
    feed: Res<ActiveFeed>,
    mut numeric: EventWriter<ParameterBatch>,
    mut live: EventWriter<LiveParameterBatch>,
) {
    if !panel.visible {
        return;
    }

    let mut edited: Vec<NamedParameter> = Vec::new();
    let mut wind_edit: Option<f64> = None;

    egui::Window::new("Parameters")
        .resizable(false)
        .default_width(280.0)
        .default_pos(egui::pos2(12.0, 12.0))
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;

            ui.label("Sensors:");
            for slider in &mut panel.sliders {
                let response = ui.add(
                    egui::Slider::new(&mut slider.value, slider.min..=slider.max)
                        .text(slider.name.as_str()),
                );
                if response.changed() {
                    edited.push(NamedParameter::new(slider.name.clone(), slider.value));
                }
            }

            ui.separator();

            let mut wind = panel.wind;
            let label = panel.wind_signal.clone();
            if ui
                .add(egui::Slider::new(&mut wind, 0.0..=1.0).text(label))
                .changed()
            {
                panel.wind = wind;
                wind_edit = Some(wind);
            }

            let mut enabled = clock.wind_enabled();
            if ui.checkbox(&mut enabled, "Wind-driven fog").changed() {
                clock.set_wind_enabled(enabled);
            }
            ui.label(format!("Fog time: {:.1}", clock.accumulated_time()));

            ui.separator();

            let feed_name = feed.name().unwrap_or("none");
            ui.label(format!("Feed: {feed_name}"));
            ui.label(format!(
                "Timestep {} ({})",
                timer.timestep(),
                if timer.is_running() { "running" } else { "stopped" }
            ));
            ui.horizontal(|ui| {
                if ui.button("Start").clicked() {
                    timer.start();
                }
                if ui.button("Stop").clicked() {
                    timer.stop();
                }
                if ui.button("Reset").clicked() {
                    timer.reset();
                }
            });
        });

    if !edited.is_empty() {
        numeric.send(ParameterBatch(edited));
    }
    if let Some(value) = wind_edit {
        let name = panel.wind_signal.clone();
        live.send(LiveParameterBatch(vec![NamedParameter::new(name, value)]));
    }
}
