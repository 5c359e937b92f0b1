mod galaxy_config;
mod point_cloud;
mod spawn_points;

pub use galaxy_config::{GalaxyConfig, GalaxyConfigPlugin, GalaxySet, RegenerationPolicy};
pub use point_cloud::{Blending, PointCloud, PointStyle};
pub use spawn_points::{GalaxyPoints, GalaxyRegenerated, SpawnPointsPlugin};
