use bevy::prelude::*;

mod points_material;

pub struct GraphicsPlugin;

impl Plugin for GraphicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(points_material::PointsMaterialPlugin);
    }
}
