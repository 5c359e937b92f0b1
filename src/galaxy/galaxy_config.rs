use bevy::prelude::*;

/// When edits to the parameters turn into a new point cloud.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegenerationPolicy {
    /// Regenerate on the frame after any edit.
    #[default]
    Immediate,
    /// Stage edits until [`GalaxyConfig::request_regeneration`] is called.
    OnApply,
}

#[derive(Resource, Clone, PartialEq, Debug)]
pub struct GalaxyConfig {
    pub generation: i32,
    pub policy: RegenerationPolicy,

    pub count: i32,
    pub size: f32,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self {
            generation: 1,
            policy: RegenerationPolicy::Immediate,
            count: 1000,
            size: 0.02,
        }
    }
}

/// Bounds and steps for the panel sliders. Not enforced by the generator.
pub struct ParamRange<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

impl GalaxyConfig {
    pub const COUNT_RANGE: ParamRange<i32> = ParamRange {
        min: 100,
        max: 1_000_000,
        step: 100,
    };
    pub const SIZE_RANGE: ParamRange<f32> = ParamRange {
        min: 0.001,
        max: 0.1,
        step: 0.001,
    };

    /// Asks for a fresh draw on the next frame, whatever the policy.
    pub fn request_regeneration(&mut self) {
        self.generation += 1;
    }

    fn same_params(&self, other: &Self) -> bool {
        self.count == other.count && self.size == other.size
    }
}

/// Snapshot of the parameters the current generation was built from
#[derive(Resource)]
struct GalaxyConfigOld(GalaxyConfig);

pub struct GalaxyConfigPlugin;

impl Plugin for GalaxyConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GalaxyConfig>()
            .add_systems(Startup, snapshot_initial_config)
            .add_systems(Update, apply_ui_updates.in_set(GalaxySet::WatchConfig));
    }
}

/// Ordering of the galaxy systems within `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GalaxySet {
    WatchConfig,
    Spawn,
}

fn snapshot_initial_config(mut commands: Commands, galaxy_config: Res<GalaxyConfig>) {
    commands.insert_resource(GalaxyConfigOld(galaxy_config.clone()));
}

fn apply_ui_updates(
    galaxy_config_old: Option<ResMut<GalaxyConfigOld>>,
    mut galaxy_config: ResMut<GalaxyConfig>,
) {
    let Some(mut galaxy_config_old) = galaxy_config_old else {
        return;
    };
    if !galaxy_config.is_changed() {
        return;
    }

    let params_changed = !galaxy_config.same_params(&galaxy_config_old.0);
    let requested = galaxy_config.generation != galaxy_config_old.0.generation;

    match galaxy_config.policy {
        RegenerationPolicy::Immediate if params_changed && !requested => {
            galaxy_config.generation += 1;
        }
        // staged edits ride along with the next explicit request
        RegenerationPolicy::OnApply if !requested => return,
        _ => {}
    }

    if params_changed || requested {
        debug!(
            "Galaxy config now at generation {} (count {}, size {})",
            galaxy_config.generation, galaxy_config.count, galaxy_config.size
        );
    }
    galaxy_config_old.0 = galaxy_config.clone();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(GalaxyConfigPlugin);
        app.update();
        app
    }

    fn generation(app: &App) -> i32 {
        app.world().resource::<GalaxyConfig>().generation
    }

    #[test]
    fn defaults_match_initial_parameters() {
        let config = GalaxyConfig::default();
        assert_eq!(config.count, 1000);
        assert_eq!(config.size, 0.02);
        assert_eq!(config.policy, RegenerationPolicy::Immediate);
    }

    #[test]
    fn untouched_config_keeps_generation() {
        let mut app = app();
        let start = generation(&app);
        app.update();
        app.update();
        assert_eq!(generation(&app), start);
    }

    #[test]
    fn immediate_policy_bumps_generation_once_per_frame() {
        let mut app = app();
        let start = generation(&app);
        {
            let mut config = app.world_mut().resource_mut::<GalaxyConfig>();
            config.count = 5000;
            config.size = 0.05;
        }
        app.update();
        assert_eq!(generation(&app), start + 1);
        app.update();
        assert_eq!(generation(&app), start + 1);
    }

    #[test]
    fn writing_the_same_values_is_not_a_change() {
        let mut app = app();
        let start = generation(&app);
        app.world_mut().resource_mut::<GalaxyConfig>().count = 1000;
        app.update();
        assert_eq!(generation(&app), start);
    }

    #[test]
    fn on_apply_policy_waits_for_request() {
        let mut app = app();
        app.world_mut().resource_mut::<GalaxyConfig>().policy = RegenerationPolicy::OnApply;
        app.update();
        let start = generation(&app);

        app.world_mut().resource_mut::<GalaxyConfig>().count = 200;
        app.update();
        app.update();
        assert_eq!(generation(&app), start);

        app.world_mut()
            .resource_mut::<GalaxyConfig>()
            .request_regeneration();
        app.update();
        assert_eq!(generation(&app), start + 1);
    }

    #[test]
    fn explicit_request_is_not_double_counted() {
        let mut app = app();
        let start = generation(&app);
        {
            let mut config = app.world_mut().resource_mut::<GalaxyConfig>();
            config.size = 0.08;
            config.request_regeneration();
        }
        app.update();
        assert_eq!(generation(&app), start + 1);
    }
}
