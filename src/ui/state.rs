use std::path::PathBuf;

use crate::renderer::{CameraMode, SceneSettings};

pub struct UiState {
    pub heightmap_path: PathBuf,
    pub corrected_edges: bool,

    pub camera_mode: CameraMode,
    pub vsync_enabled: bool,

    pub scene: SceneSettings,

    pub show_stats: bool,
    pub show_help: bool,

    pub fps_cap_enabled: bool,
    pub fps_cap: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            heightmap_path: PathBuf::from("map.bmp"),
            corrected_edges: false,

            camera_mode: CameraMode::Orbital,
            vsync_enabled: true,

            scene: SceneSettings::default(),

            show_stats: true,
            show_help: true,

            fps_cap_enabled: false,
            fps_cap: 144,
        }
    }
}
