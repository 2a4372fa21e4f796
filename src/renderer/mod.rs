pub mod camera;
pub mod gpu;

pub use camera::{Camera, CameraMode};
pub use gpu::{GpuState, SceneSettings};
