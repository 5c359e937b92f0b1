use crate::prelude::*;
use bevy::diagnostic::DiagnosticsStore;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;

pub struct FpsWidgetPlugin;

impl Plugin for FpsWidgetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_widget)
            .add_systems(Update, update_widget_system)
            .add_plugins(FrameTimeDiagnosticsPlugin::default());
    }
}

#[derive(Component)]
struct FpsText;

#[derive(Component)]
struct ParticleText;

fn setup_widget(mut commands: Commands) {
    let font = TextFont {
        font_size: 16.0,
        ..default()
    };
    commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexStart,
                position_type: PositionType::Absolute,
                justify_content: JustifyContent::FlexStart,
                width: Val::Px(240.),
                left: Val::Percent(1.),
                top: Val::Percent(1.),
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::linear_rgba(0.0, 0.03, 0.08, 0.5)),
            GlobalZIndex(i32::MAX - 1),
        ))
        .with_children(|parent| {
            parent.spawn((FpsText, Text(" N/A".to_string()), font.clone()));
            parent.spawn((ParticleText, Text(String::new()), font));
        });
}

fn update_widget_system(
    diagnostics: Res<DiagnosticsStore>,
    mut regenerated: EventReader<GalaxyRegenerated>,
    viewport: Res<ViewportState>,
    mut fps_query: Query<&mut Text, (With<FpsText>, Without<ParticleText>)>,
    mut particle_query: Query<&mut Text, With<ParticleText>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(|frame_time| frame_time.smoothed())
        .unwrap_or(0.0);

    for mut text in &mut fps_query {
        text.0 = format!("{:>10} {fps:.1} ({frame_time:.2} ms)", "FPS:");
    }

    let latest = regenerated.read().last();
    if latest.is_none() && !viewport.is_changed() {
        return;
    }
    for mut text in &mut particle_query {
        // keep the particle line, only the viewport part changes on resize
        let particles = match latest {
            Some(event) => format!(
                "{:>10} {} (gen {})",
                "Particles:", event.count, event.generation
            ),
            None => text.0.lines().next().unwrap_or_default().to_string(),
        };
        text.0 = format!(
            "{particles}\n{:>10} {:.0}x{:.0} @{:.1}x",
            "Viewport:", viewport.width, viewport.height, viewport.pixel_ratio
        );
    }
}
