use crate::prelude::*;
use bevy::{
    prelude::*,
    window::{
        PrimaryWindow, WindowBackendScaleFactorChanged, WindowResized, WindowScaleFactorChanged,
    },
};

pub struct ViewportPlugin;

impl Plugin for ViewportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderLoop>()
            .add_systems(Startup, init_viewport)
            .add_systems(
                PreUpdate,
                (
                    handle_resize,
                    cancel_on_escape.run_if(resource_exists::<ButtonInput<KeyCode>>),
                ),
            )
            .add_systems(Last, tick_render_loop);
    }
}

/// Size and scaling of the drawable surface.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ViewportState {
    pub width: f32,
    pub height: f32,
    pub aspect_ratio: f32,
    pub pixel_ratio: f32,
    max_pixel_ratio: f32,
}

impl ViewportState {
    pub fn new(width: f32, height: f32, max_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width,
            height,
            aspect_ratio: 1.0,
            pixel_ratio: 1.0,
            max_pixel_ratio,
        };
        viewport.on_resize(width, height);
        viewport
    }

    /// Applies a new surface size. Repeated calls simply overwrite each other.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        // minimized windows report a zero height, keep the last usable aspect
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Clamps the device's pixel ratio to the configured maximum.
    pub fn set_device_ratio(&mut self, device_ratio: f32) {
        self.pixel_ratio = device_ratio.min(self.max_pixel_ratio);
    }
}

/// Handle on the per-frame loop. The loop runs until [`RenderLoop::cancel`] is called.
#[derive(Resource, Default, Debug)]
pub struct RenderLoop {
    frames: u64,
    cancelled: bool,
    exit_sent: bool,
}

impl RenderLoop {
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}

fn init_viewport(
    mut commands: Commands,
    settings: Res<ViewerSettings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let mut viewport = ViewportState::new(1280.0, 720.0, settings.max_pixel_ratio);
    if let Ok(mut window) = windows.single_mut() {
        // the override changes the logical size, so clamp before reading it
        clamp_pixel_ratio(&mut viewport, &mut window);
        viewport.on_resize(window.width(), window.height());
    }
    commands.insert_resource(viewport);
}

/// Caps the window's effective scale factor at the viewport's pixel ratio.
fn clamp_pixel_ratio(viewport: &mut ViewportState, window: &mut Window) {
    let device_ratio = window.resolution.base_scale_factor();
    viewport.set_device_ratio(device_ratio);
    let wanted = (device_ratio > viewport.pixel_ratio).then_some(viewport.pixel_ratio);
    if window.resolution.scale_factor_override() != wanted {
        debug!("Clamping pixel ratio {device_ratio} to {:?}", wanted);
        window.resolution.set_scale_factor_override(wanted);
    }
}

fn handle_resize(
    mut resize_events: EventReader<WindowResized>,
    mut scale_events: EventReader<WindowScaleFactorChanged>,
    mut backend_scale_events: EventReader<WindowBackendScaleFactorChanged>,
    viewport: Option<ResMut<ViewportState>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut projections: Query<&mut Projection, With<OrbitCamera>>,
) {
    let Some(mut viewport) = viewport else {
        return;
    };
    let mut resized = false;
    for event in resize_events.read() {
        viewport.on_resize(event.width, event.height);
        resized = true;
    }
    // read both so neither queue is left pending
    let rescaled = scale_events.read().count() + backend_scale_events.read().count() > 0;
    if !resized && !rescaled {
        return;
    }

    if let Ok(mut window) = windows.single_mut() {
        clamp_pixel_ratio(&mut viewport, &mut window);
    }

    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = viewport.aspect_ratio;
        }
    }
}

fn cancel_on_escape(keys: Res<ButtonInput<KeyCode>>, mut render_loop: ResMut<RenderLoop>) {
    if keys.just_pressed(KeyCode::Escape) {
        render_loop.cancel();
    }
}

fn tick_render_loop(mut render_loop: ResMut<RenderLoop>, mut exit: EventWriter<AppExit>) {
    if render_loop.cancelled {
        if !render_loop.exit_sent {
            info!("Render loop cancelled after {} frames", render_loop.frames);
            exit.write(AppExit::Success);
            render_loop.exit_sent = true;
        }
        return;
    }
    render_loop.frames += 1;
}
