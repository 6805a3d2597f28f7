//! Damped orbit camera.
//!
//! Input systems write the desired orbit into [`OrbitCamera`]; each frame
//! [`apply_orbit_camera`] eases the displayed orbit toward it with
//! `value += (target - value) * (1 - exp(-speed * dt))`.
//!
//! Left drag orbits, right drag pans, the wheel zooms. Pointer input over an
//! egui panel is ignored.

use bevy::input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use simulation::config::CanopyConfig;

pub const FOV_DEGREES: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 20_000.0;
/// Eye height and distance of the starting view.
pub const START_HEIGHT: f32 = 100.0;
pub const START_DISTANCE: f32 = 250.0;

const ZOOM_SPEED: f32 = 0.1;
const MIN_DISTANCE: f32 = 10.0;
const MAX_DISTANCE: f32 = 5000.0;
const MIN_PITCH: f32 = -10.0 * std::f32::consts::PI / 180.0;
const MAX_PITCH: f32 = 85.0 * std::f32::consts::PI / 180.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
/// Matches a 0.1 per-frame damping factor at 60 fps.
const DAMPING_SPEED: f32 = 6.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub focus: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Orbit {
    /// Eye at `(middle_x, START_HEIGHT, START_DISTANCE)` looking along -Z.
    pub fn starting_view(middle_x: f32) -> Self {
        Self {
            focus: Vec3::new(middle_x, START_HEIGHT, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            distance: START_DISTANCE,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.focus + Vec3::new(x, y, z)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }

    /// Move `self` toward `target` by the damping fraction for `dt`.
    pub fn ease_toward(&mut self, target: &Orbit, dt: f32) {
        let t = 1.0 - (-DAMPING_SPEED * dt.max(0.0)).exp();
        self.focus = self.focus.lerp(target.focus, t);
        self.yaw += (target.yaw - self.yaw) * t;
        self.pitch += (target.pitch - self.pitch) * t;
        self.distance += (target.distance - self.distance) * t;
    }
}

#[derive(Resource, Debug, Clone)]
pub struct OrbitCamera {
    pub target: Orbit,
    pub current: Orbit,
}

impl OrbitCamera {
    pub fn new(start: Orbit) -> Self {
        Self {
            target: start,
            current: start,
        }
    }

    pub fn is_settled(&self) -> bool {
        let (a, b) = (&self.current, &self.target);
        a.focus.distance(b.focus) < 1e-3
            && (a.yaw - b.yaw).abs() < 1e-5
            && (a.pitch - b.pitch).abs() < 1e-5
            && (a.distance - b.distance).abs() < 1e-3
    }
}

/// True when egui owns the pointer (hovering or dragging a panel).
pub fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    let ctx = contexts.ctx_mut();
    ctx.wants_pointer_input() || ctx.is_pointer_over_area()
}

pub fn setup_camera(mut commands: Commands, config: Res<CanopyConfig>) {
    let orbit = OrbitCamera::new(Orbit::starting_view(config.trees.middle_x()));
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        orbit.current.transform(),
    ));
    commands.insert_resource(orbit);
}

/// Left drag: orbit. Right drag: pan the focus in the view plane.
pub fn camera_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    mut contexts: EguiContexts,
    mut orbit: ResMut<OrbitCamera>,
) {
    let delta = motion.delta;
    if delta == Vec2::ZERO || egui_wants_pointer(&mut contexts) {
        return;
    }
    if buttons.pressed(MouseButton::Left) {
        let target = &mut orbit.target;
        target.yaw -= delta.x * ORBIT_SENSITIVITY;
        target.pitch = (target.pitch + delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    } else if buttons.pressed(MouseButton::Right) {
        let target = &mut orbit.target;
        let scale = target.distance / 1000.0;
        let right = Vec3::new(target.yaw.cos(), 0.0, -target.yaw.sin());
        target.focus += (-right * delta.x + Vec3::Y * delta.y) * scale;
    }
}

pub fn camera_zoom(
    mut scroll_evts: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut orbit: ResMut<OrbitCamera>,
) {
    if egui_wants_pointer(&mut contexts) {
        scroll_evts.clear();
        return;
    }
    for evt in scroll_evts.read() {
        let dy = match evt.unit {
            MouseScrollUnit::Line => evt.y,
            MouseScrollUnit::Pixel => evt.y / 100.0,
        };
        let target = &mut orbit.target;
        target.distance = (target.distance * (1.0 - dy * ZOOM_SPEED)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

pub fn apply_orbit_camera(
    time: Res<Time>,
    mut orbit: ResMut<OrbitCamera>,
    mut query: Query<&mut Transform, With<Camera3d>>,
) {
    if orbit.is_settled() {
        return;
    }
    let target = orbit.target;
    orbit.current.ease_toward(&target, time.delta_secs());
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    *transform = orbit.current.transform();
}
