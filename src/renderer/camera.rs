use glam::{Mat4, Vec2, Vec3};

const LOOK_SENSITIVITY: f32 = 0.002;
const ZOOM_STEP: f32 = 0.1;
const DOLLY_STEP: f32 = 0.25;
const MAX_PITCH_DEG: f32 = 89.0;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Free,
    Orbital,
}

/// Unit vector for a yaw/pitch pair around world Z.
fn direction(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.cos() * pitch.cos(),
        yaw.sin() * pitch.cos(),
        pitch.sin(),
    )
}

/// Z-up camera; terrain height runs along world Z.
///
/// In orbital mode `yaw`/`pitch` place the eye around `target`. In free mode
/// they give the view direction from `position`.
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,

    pub target: Vec3,
    pub orbital_distance: f32,

    pub mode: CameraMode,

    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub move_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            yaw: -135.0_f32.to_radians(),
            pitch: 35.0_f32.to_radians(),

            target: Vec3::ZERO,
            orbital_distance: 40.0,

            mode: CameraMode::Orbital,

            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,

            move_speed: 10.0,
        };
        camera.place_on_orbit();
        camera
    }
}

impl Camera {
    /// View direction in either mode.
    pub fn front(&self) -> Vec3 {
        match self.mode {
            CameraMode::Free => direction(self.yaw, self.pitch),
            CameraMode::Orbital => -direction(self.yaw, self.pitch),
        }
    }

    fn view_matrix(&self) -> Mat4 {
        let look_at = match self.mode {
            CameraMode::Free => self.position + self.front(),
            CameraMode::Orbital => self.target,
        };
        Mat4::look_at_rh(self.position, look_at, Vec3::Z)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far) * self.view_matrix()
    }

    /// Aim at a terrain centred on `center` with the given bounding radius.
    pub fn focus(&mut self, center: Vec3, radius: f32) {
        self.target = center;
        self.orbital_distance = (radius * 2.2).clamp(1.0, self.far * 0.5);
        self.move_speed = (radius * 0.5).max(1.0);
        match self.mode {
            CameraMode::Orbital => self.place_on_orbit(),
            CameraMode::Free => {
                self.position = center - self.front() * self.orbital_distance;
            }
        }
    }

    /// WASD flight; only free mode moves.
    pub fn process_keyboard(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        if self.mode != CameraMode::Free {
            return;
        }

        let step = self.move_speed * dt;
        let front = self.front();
        let side = front.cross(Vec3::Z).normalize_or_zero();
        self.position += (front * forward + side * right + Vec3::Z * up) * step;
    }

    pub fn process_mouse_movement(&mut self, delta: Vec2) {
        let d = delta * LOOK_SENSITIVITY;
        self.yaw -= d.x;
        self.pitch = match self.mode {
            CameraMode::Free => self.pitch - d.y,
            CameraMode::Orbital => self.pitch + d.y,
        };

        let limit = MAX_PITCH_DEG.to_radians();
        self.pitch = self.pitch.clamp(-limit, limit);

        if self.mode == CameraMode::Orbital {
            self.place_on_orbit();
        }
    }

    /// Wheel zooms the orbit or dollies the free camera along its view.
    pub fn process_scroll(&mut self, delta: f32) {
        match self.mode {
            CameraMode::Free => {
                self.position += self.front() * delta * self.move_speed * DOLLY_STEP;
            }
            CameraMode::Orbital => {
                let scaled = self.orbital_distance * (1.0 - delta * ZOOM_STEP);
                self.orbital_distance = scaled.clamp(1.0, self.far * 0.5);
                self.place_on_orbit();
            }
        }
    }

    /// Switch modes without moving the eye.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode == mode {
            return;
        }

        let offset = self.position - self.target;
        let Some(dir) = offset.try_normalize() else {
            self.mode = mode;
            return;
        };

        // free mode looks toward the target, orbital mode stores the eye offset
        let stored = match mode {
            CameraMode::Free => -dir,
            CameraMode::Orbital => dir,
        };
        self.yaw = stored.y.atan2(stored.x);
        self.pitch = stored.z.clamp(-1.0, 1.0).asin();
        self.mode = mode;

        if mode == CameraMode::Orbital {
            self.orbital_distance = offset.length().max(1.0);
            self.place_on_orbit();
        }
    }

    fn place_on_orbit(&mut self) {
        self.position = self.target + direction(self.yaw, self.pitch) * self.orbital_distance;
    }

    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _padding: 0.0,
        }
    }
}
