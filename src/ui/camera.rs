use crate::prelude::*;
use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit},
    prelude::*,
    transform::TransformSystem,
};
use std::f32::consts::{PI, TAU};

use super::UiSet;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            // the panel decides focus for this frame before the camera reads it
            .add_systems(Update, orbit_input_system.after(UiSet::Panel))
            .add_systems(
                PostUpdate,
                orbit_update_system.before(TransformSystem::TransformPropagate),
            );
    }
}

// keeps the camera off the poles, where looking at the target loses its up vector
const POLAR_EPSILON: f32 = 1e-4;
const ZOOM_STEP: f32 = 0.95;
const PIXELS_PER_LINE: f32 = 100.0;

fn spawn_camera(
    mut commands: Commands,
    mut clearcolor: ResMut<ClearColor>,
    settings: Res<ViewerSettings>,
) {
    *clearcolor = ClearColor(Color::BLACK);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(settings.projection(1.0)),
        Transform::from_translation(settings.camera_position).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::new(settings.camera_position, Vec3::ZERO, &settings),
    ));
}

/// Damped orbit around `target`. Input only queues motion. [`OrbitCamera::update`]
/// releases a fraction of it every frame.
#[derive(Component, Clone, Debug)]
pub struct OrbitCamera {
    pub target: Vec3,
    radius: f32,
    /// angle around +Y, measured from +Z
    azimuth: f32,
    /// angle down from +Y
    polar: f32,

    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    smooth_zoom_buffer: f32,

    damping_factor: f32,
    min_distance: f32,
    max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        let settings = ViewerSettings::default();
        Self::new(settings.camera_position, Vec3::ZERO, &settings)
    }
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3, settings: &ViewerSettings) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            polar: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            smooth_zoom_buffer: 0.0,
            damping_factor: settings.damping_factor,
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        let direction = Vec3::new(sin_polar * sin_azimuth, cos_polar, sin_polar * cos_azimuth);
        self.target + self.radius * direction
    }

    /// Queues a rotation from a pointer drag. Dragging across the full viewport
    /// height turns the camera once around.
    pub fn rotate(&mut self, drag: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_azimuth -= TAU * drag.x / viewport_height;
        self.pending_polar -= TAU * drag.y / viewport_height;
    }

    /// Queues a pan so the point under the pointer follows it on the plane
    /// through the target.
    pub fn pan(&mut self, drag: Vec2, viewport_height: f32, fov: f32, camera: &Transform) {
        if viewport_height <= 0.0 {
            return;
        }
        let target_distance = self.radius * (fov * 0.5).tan();
        let scale = 2.0 * target_distance / viewport_height;
        self.pending_pan += camera.left() * drag.x * scale + camera.up() * drag.y * scale;
    }

    /// Queues a dolly. Positive steps move towards the target.
    pub fn zoom(&mut self, steps: f32) {
        self.smooth_zoom_buffer += steps;
    }

    pub fn is_settled(&self) -> bool {
        const REST: f32 = 1e-5;
        self.pending_azimuth.abs() < REST
            && self.pending_polar.abs() < REST
            && self.pending_pan.length_squared() < REST * REST
            && self.smooth_zoom_buffer.abs() < REST
    }

    /// Releases queued motion for a frame lasting `dt` seconds and returns the new eye position.
    pub fn update(&mut self, dt: f32) -> Vec3 {
        let f = self.frame_factor(dt);

        self.azimuth = (self.azimuth + self.pending_azimuth * f) % TAU;
        self.polar =
            (self.polar + self.pending_polar * f).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.target += self.pending_pan * f;

        let zoom = self.smooth_zoom_buffer * f;
        self.radius =
            (self.radius * ZOOM_STEP.powf(zoom)).clamp(self.min_distance, self.max_distance);

        self.pending_azimuth -= self.pending_azimuth * f;
        self.pending_polar -= self.pending_polar * f;
        self.pending_pan -= self.pending_pan * f;
        self.smooth_zoom_buffer -= zoom;

        self.position()
    }

    // damping_factor is tuned per 1/60 s, rescale it to the real frame time
    fn frame_factor(&self, dt: f32) -> f32 {
        let damping = self.damping_factor.clamp(0.0, 1.0);
        (1.0 - (1.0 - damping).powf(dt.max(0.0) * 60.0)).clamp(0.0, 1.0)
    }
}

pub fn orbit_input_system(
    mut query: Query<(&Projection, &Transform, &mut OrbitCamera)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    viewport: Res<ViewportState>,
    panel_focus: Res<PanelFocus>,
) {
    let Ok((projection, transform, mut orbit)) = query.single_mut() else {
        return;
    };
    if panel_focus.0 {
        return;
    }

    let drag = mouse_motion.delta;
    if drag != Vec2::ZERO {
        if mouse_buttons.pressed(MouseButton::Left) {
            orbit.rotate(drag, viewport.height);
        } else if mouse_buttons.any_pressed([MouseButton::Right, MouseButton::Middle]) {
            let fov = match projection {
                Projection::Perspective(perspective) => perspective.fov,
                _ => return,
            };
            orbit.pan(drag, viewport.height, fov, transform);
        }
    }

    let steps = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
    };
    if steps != 0.0 {
        orbit.zoom(steps);
    }
}

pub fn orbit_update_system(
    mut query: Query<(&mut Transform, &mut OrbitCamera)>,
    time: Res<Time>,
) {
    for (mut transform, mut orbit) in &mut query {
        if orbit.is_settled() {
            continue;
        }
        transform.translation = orbit.update(time.delta_secs());
        transform.look_at(orbit.target, Vec3::Y);
    }
}
