use bevy::prelude::*;

/// Startup settings for the window and the viewer camera.
#[derive(Resource, Clone, Debug)]
pub struct ViewerSettings {
    pub title: String,
    pub camera_position: Vec3,
    /// vertical field of view, degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the pending orbit motion applied per 1/60 s
    pub damping_factor: f32,
    pub max_pixel_ratio: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            title: "Particle Galaxy".into(),
            camera_position: Vec3::splat(3.0),
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            damping_factor: 0.05,
            max_pixel_ratio: 2.0,
            min_distance: 0.2,
            max_distance: 50.0,
        }
    }
}

impl ViewerSettings {
    pub fn projection(&self, aspect_ratio: f32) -> PerspectiveProjection {
        PerspectiveProjection {
            fov: self.fov_degrees.to_radians(),
            near: self.near,
            far: self.far,
            aspect_ratio,
        }
    }
}
