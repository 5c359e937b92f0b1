use crate::prelude::*;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use super::UiSet;

pub struct ConfigEguiPlugin;

impl Plugin for ConfigEguiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelFocus>()
            .add_systems(Startup, configure_visuals_system)
            .add_systems(
                Update,
                ui_system
                    .in_set(UiSet::Panel)
                    .before(crate::galaxy::GalaxySet::WatchConfig),
            );
    }
}

/// Set while the pointer belongs to the panel, so drags there don't orbit the camera.
#[derive(Resource, Default)]
pub struct PanelFocus(pub bool);

fn configure_visuals_system(mut contexts: EguiContexts) {
    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..Default::default()
    });
}

fn ui_system(
    mut contexts: EguiContexts,
    mut galaxy_config: ResMut<GalaxyConfig>,
    mut panel_focus: ResMut<PanelFocus>,
) {
    let ctx = contexts.ctx_mut();

    egui::SidePanel::right("galaxy_panel")
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Galaxy");

            let count = GalaxyConfig::COUNT_RANGE;
            ui.add(
                egui::Slider::new(&mut galaxy_config.count, count.min..=count.max)
                    .step_by(count.step as f64)
                    .logarithmic(true)
                    .text("Count"),
            );
            let size = GalaxyConfig::SIZE_RANGE;
            ui.add(
                egui::Slider::new(&mut galaxy_config.size, size.min..=size.max)
                    .step_by(size.step as f64)
                    .text("Size"),
            );
            ui.separator();

            ui.horizontal(|ui| {
                ui.radio_value(
                    &mut galaxy_config.policy,
                    RegenerationPolicy::Immediate,
                    "Live",
                );
                ui.radio_value(
                    &mut galaxy_config.policy,
                    RegenerationPolicy::OnApply,
                    "On apply",
                );
            });
            ui.horizontal(|ui| {
                let on_apply = galaxy_config.policy == RegenerationPolicy::OnApply;
                if ui.add_enabled(on_apply, egui::Button::new("Apply")).clicked() {
                    galaxy_config.request_regeneration();
                }
                if ui.button("Regenerate").clicked() {
                    galaxy_config.request_regeneration();
                }
            });
        });

    panel_focus.0 = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
}
