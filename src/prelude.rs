pub use crate::galaxy::{
    Blending, GalaxyConfig, GalaxyPoints, GalaxyRegenerated, PointCloud, PointStyle,
    RegenerationPolicy,
};
pub use crate::settings::ViewerSettings;
pub use crate::ui::{OrbitCamera, PanelFocus, ViewportState};
