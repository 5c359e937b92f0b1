use bevy::prelude::*;

mod camera;
mod config_egui;
mod fps_widget;
mod viewport;

pub use camera::OrbitCamera;
pub use config_egui::PanelFocus;
pub use viewport::ViewportState;

/// Ordering of the ui systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum UiSet {
    /// Panel drawing, which decides [`PanelFocus`] for the frame.
    Panel,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            viewport::ViewportPlugin,
            camera::CameraPlugin,
            fps_widget::FpsWidgetPlugin,
            config_egui::ConfigEguiPlugin,
        ));
    }
}
