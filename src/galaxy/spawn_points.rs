use super::{GalaxyConfig, GalaxySet, PointCloud};
use bevy::prelude::*;

pub struct SpawnPointsPlugin;

impl Plugin for SpawnPointsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PointSpawningControl { generation: -1 })
            .add_event::<GalaxyRegenerated>()
            .configure_sets(Update, GalaxySet::WatchConfig.before(GalaxySet::Spawn))
            .add_systems(Startup, spawn_galaxy_root)
            .add_systems(Update, manage_point_cloud.in_set(GalaxySet::Spawn));
    }
}

/// Scene node every generated cloud is parented to
#[derive(Component)]
pub struct GalaxyRoot;

/// Owns the cloud drawn for one generation of the config.
#[derive(Component)]
pub struct GalaxyPoints {
    pub generation: i32,
    pub cloud: PointCloud,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct GalaxyRegenerated {
    pub generation: i32,
    pub count: usize,
}

#[derive(Resource)]
struct PointSpawningControl {
    generation: i32,
}

fn spawn_galaxy_root(mut commands: Commands) {
    commands.spawn((
        GalaxyRoot,
        Transform::IDENTITY,
        Visibility::Inherited,
        Name::new("Galaxy"),
    ));
}

/// Replaces the galaxy's point cloud whenever the config generation moves on.
/// The old cloud is despawned in the same command flush the new one is spawned in.
fn manage_point_cloud(
    mut commands: Commands,
    galaxy_config: Res<GalaxyConfig>,
    root_query: Query<Entity, With<GalaxyRoot>>,
    existing_points_query: Query<Entity, With<GalaxyPoints>>,
    mut control: ResMut<PointSpawningControl>,
    mut regenerated: EventWriter<GalaxyRegenerated>,
) {
    if control.generation == galaxy_config.generation {
        return;
    }
    let Ok(root) = root_query.single() else {
        return;
    };
    // mark handled even on failure so a bad config is reported once
    control.generation = galaxy_config.generation;

    let cloud = match PointCloud::generate_par(&galaxy_config) {
        Ok(cloud) => cloud,
        Err(err) => {
            error!("Galaxy not regenerated: {err}");
            return;
        }
    };

    for entity in &existing_points_query {
        commands.entity(entity).despawn();
    }

    info!(
        "Generated galaxy {} with {} particles",
        galaxy_config.generation,
        cloud.len()
    );
    regenerated.write(GalaxyRegenerated {
        generation: galaxy_config.generation,
        count: cloud.len(),
    });

    commands.spawn((
        GalaxyPoints {
            generation: galaxy_config.generation,
            cloud,
        },
        Transform::IDENTITY,
        Visibility::Inherited,
        ChildOf(root),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::GalaxyConfigPlugin;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins((GalaxyConfigPlugin, SpawnPointsPlugin));
        app.update();
        app
    }

    fn clouds(app: &mut App) -> Vec<(i32, usize, f32)> {
        let mut query = app.world_mut().query::<&GalaxyPoints>();
        query
            .iter(app.world())
            .map(|p| (p.generation, p.cloud.len(), p.cloud.style.size))
            .collect()
    }

    #[test]
    fn startup_attaches_default_cloud_under_root() {
        let mut app = app();
        assert_eq!(clouds(&mut app), vec![(1, 1000, 0.02)]);

        let root = app
            .world_mut()
            .query_filtered::<Entity, With<GalaxyRoot>>()
            .single(app.world())
            .unwrap();
        let children = app.world().get::<Children>(root).unwrap();
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn regeneration_replaces_previous_cloud() {
        let mut app = app();
        for count in [200, 300, 0, 5000] {
            app.world_mut().resource_mut::<GalaxyConfig>().count = count;
            app.update();
            let current = clouds(&mut app);
            assert_eq!(current.len(), 1);
            assert_eq!(current[0].1, count as usize);
        }
    }

    #[test]
    fn cloud_style_follows_size_at_generation_time() {
        let mut app = app();
        app.world_mut().resource_mut::<GalaxyConfig>().size = 0.075;
        app.update();
        assert_eq!(clouds(&mut app)[0].2, 0.075);
    }

    #[test]
    fn invalid_count_keeps_previous_cloud() {
        let mut app = app();
        app.world_mut().resource_mut::<GalaxyConfig>().count = -10;
        app.update();
        assert_eq!(clouds(&mut app), vec![(1, 1000, 0.02)]);
    }

    #[test]
    fn regeneration_is_announced() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<GalaxyConfig>()
            .request_regeneration();
        app.update();

        let events = app.world().resource::<Events<GalaxyRegenerated>>();
        let last = events.iter_current_update_events().last().unwrap();
        assert_eq!(last.generation, 2);
        assert_eq!(last.count, 1000);
    }
}
