use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Vec2, Vec3};
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

mod renderer;
mod ui;

use heightmap3d::terrain::{
    EdgePolicy, LoadedTerrain, MeshBuffers, MeshScales, TerrainEngine, TerrainResult,
};
use renderer::{Camera, GpuState};
use ui::{TerrainStats, UiActions, UiState, apply_theme, draw_help_overlay, draw_side_panel};

const WINDOW_TITLE: &str = "Heightmap 3D";

#[derive(Parser)]
#[command(name = "heightmap3d")]
#[command(version, about = "Render a grayscale heightmap as a lit terrain mesh")]
struct Cli {
    /// Grayscale heightmap image (BMP or PNG).
    #[arg(default_value = "map.bmp")]
    heightmap: PathBuf,

    /// Triangulate every column, bounding columns by the map width instead of its height.
    #[arg(long)]
    corrected_edges: bool,

    /// Present without waiting for vertical sync.
    #[arg(long)]
    no_vsync: bool,
}

struct InputState {
    forward: f32,
    right: f32,
    up: f32,
    mouse_captured: bool,
    mouse_delta: Vec2,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            forward: 0.0,
            right: 0.0,
            up: 0.0,
            mouse_captured: false,
            mouse_delta: Vec2::ZERO,
        }
    }
}

/// Axis-aligned extent of the terrain, used to frame the camera.
fn mesh_bounds(mesh: &MeshBuffers) -> (Vec3, Vec3) {
    mesh.vertices().iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(lo, hi), v| {
            let p = Vec3::from(v.position);
            (lo.min(p), hi.max(p))
        },
    )
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    egui_state: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    egui_ctx: egui::Context,

    camera: Camera,
    terrain_engine: TerrainEngine,
    ui_state: UiState,
    input: InputState,

    last_frame: Instant,
    frame_count: u32,
    fps_timer: Instant,
    fps: f32,

    last_vsync_state: bool,
    last_frame_time: Instant,

    loading: bool,
    load_error: Option<String>,
    terrain_stats: Option<TerrainStats>,
    terrain_bounds: Option<(Vec3, Vec3)>,
    exit_requested: bool,
}

impl App {
    fn new(cli: &Cli) -> Self {
        let ui_state = UiState {
            heightmap_path: cli.heightmap.clone(),
            corrected_edges: cli.corrected_edges,
            vsync_enabled: !cli.no_vsync,
            ..UiState::default()
        };

        Self {
            window: None,
            gpu: None,
            egui_state: None,
            egui_renderer: None,
            egui_ctx: egui::Context::default(),

            camera: Camera::default(),
            terrain_engine: TerrainEngine::new(),
            last_vsync_state: ui_state.vsync_enabled,
            ui_state,
            input: InputState::default(),

            last_frame: Instant::now(),
            frame_count: 0,
            fps_timer: Instant::now(),
            fps: 0.0,

            last_frame_time: Instant::now(),

            loading: false,
            load_error: None,
            terrain_stats: None,
            terrain_bounds: None,
            exit_requested: false,
        }
    }

    fn init_gpu(&mut self, window: Arc<Window>) -> Result<()> {
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.ui_state.vsync_enabled))?;

        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            self.egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2048),
        );

        let egui_renderer =
            egui_wgpu::Renderer::new(&gpu.device, gpu.config.format, None, 1, false);

        apply_theme(&self.egui_ctx);

        let size = window.inner_size();
        self.camera
            .set_aspect(size.width as f32, size.height as f32);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.egui_state = Some(egui_state);
        self.egui_renderer = Some(egui_renderer);

        self.request_load();
        Ok(())
    }

    fn edge_policy(&self) -> EdgePolicy {
        if self.ui_state.corrected_edges {
            EdgePolicy::Corrected
        } else {
            EdgePolicy::Legacy
        }
    }

    fn request_load(&mut self) {
        let policy = self.edge_policy();
        info!(
            "loading heightmap {} ({:?} edges)",
            self.ui_state.heightmap_path.display(),
            policy
        );

        self.terrain_engine
            .load(&self.ui_state.heightmap_path, MeshScales::default(), policy);
        self.loading = true;
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_count += 1;
        if self.fps_timer.elapsed().as_secs_f32() >= 1.0 {
            self.fps = self.frame_count as f32 / self.fps_timer.elapsed().as_secs_f32();
            self.frame_count = 0;
            self.fps_timer = Instant::now();
        }

        self.camera.set_mode(self.ui_state.camera_mode);
        self.camera
            .process_keyboard(self.input.forward, self.input.right, self.input.up, dt);

        if self.input.mouse_captured {
            self.camera.process_mouse_movement(self.input.mouse_delta);
        }
        self.input.mouse_delta = Vec2::ZERO;

        self.update_terrain();
    }

    fn update_terrain(&mut self) {
        if self.gpu.is_none() {
            return;
        }

        while let Some(result) = self.terrain_engine.try_recv_result() {
            self.loading = false;
            match result {
                TerrainResult::Mesh(loaded) => self.install_terrain(loaded),
                TerrainResult::Error(e) => {
                    if let Some(gpu) = &mut self.gpu {
                        gpu.terrain = None;
                    }
                    self.terrain_stats = None;
                    self.load_error = Some(e);
                }
            }
        }
    }

    fn install_terrain(&mut self, loaded: LoadedTerrain) {
        let Some(gpu) = &mut self.gpu else { return };
        gpu.upload_terrain(&loaded.mesh);

        let mesh = &loaded.mesh;
        self.terrain_stats = Some(TerrainStats {
            source: loaded
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| loaded.path.display().to_string()),
            width: mesh.width(),
            height: mesh.height(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            normals_written: loaded.normals.written,
            degenerate_normals: loaded.normals.degenerate,
            z_range: mesh.height_range(),
            build_ms: loaded.elapsed.as_secs_f32() * 1000.0,
        });

        let bounds = mesh_bounds(mesh);
        if self.terrain_bounds.is_none() {
            self.frame_terrain(bounds);
        }
        self.terrain_bounds = Some(bounds);
        self.load_error = None;

        if let Some(window) = &self.window {
            window.set_title(&format!(
                "{} - {} ({}x{})",
                WINDOW_TITLE,
                loaded.path.display(),
                mesh.width(),
                mesh.height()
            ));
        }
    }

    fn frame_terrain(&mut self, (lo, hi): (Vec3, Vec3)) {
        let center = (lo + hi) * 0.5;
        let radius = ((hi - lo).length() * 0.5).max(1.0);
        self.camera.focus(center, radius);
    }

    fn render(&mut self) {
        if self.ui_state.fps_cap_enabled {
            let frame_duration = Duration::from_secs_f64(1.0 / self.ui_state.fps_cap as f64);
            let elapsed = self.last_frame_time.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
        self.last_frame_time = Instant::now();

        let (Some(window), Some(egui_state)) = (&self.window, &mut self.egui_state) else {
            return;
        };

        let raw_input = egui_state.take_egui_input(window);

        let last_error = self
            .load_error
            .clone()
            .or_else(|| self.terrain_engine.last_error());
        let camera_pos = self.camera.position.to_array();
        let camera_speed = self.camera.move_speed;
        let camera_mode = self.camera.mode;
        let loading = self.loading;
        let fps = self.fps;

        let mut ui_actions = UiActions::default();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            ui_actions = draw_side_panel(
                ctx,
                &mut self.ui_state,
                self.terrain_stats.as_ref(),
                fps,
                &last_error,
                loading,
            );

            if self.ui_state.show_help {
                draw_help_overlay(ctx, camera_mode, camera_pos, camera_speed);
            }
        });

        self.handle_ui_actions(ui_actions);

        let Some(gpu) = &mut self.gpu else { return };
        let Some(window) = &self.window else { return };
        let Some(egui_state) = &mut self.egui_state else {
            return;
        };
        let Some(egui_renderer) = &mut self.egui_renderer else {
            return;
        };

        egui_state.handle_platform_output(window, full_output.platform_output);

        if self.ui_state.vsync_enabled != self.last_vsync_state {
            gpu.set_vsync(self.ui_state.vsync_enabled);
            self.last_vsync_state = self.ui_state.vsync_enabled;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.resize(gpu.size);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, shutting down");
                self.exit_requested = true;
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface texture timed out");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.update_camera(&self.camera);
        gpu.update_scene(&self.ui_state.scene);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, id, &delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Encoder"),
            });

        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        gpu.render_terrain(&view, &mut encoder, self.ui_state.scene.background);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut render_pass = render_pass.forget_lifetime();
            egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in full_output.textures_delta.free {
            egui_renderer.free_texture(&id);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        window.request_redraw();
    }

    fn handle_ui_actions(&mut self, actions: UiActions) {
        if actions.reload && !self.loading {
            self.request_load();
        }

        if actions.reset_camera {
            if let Some(bounds) = self.terrain_bounds {
                self.frame_terrain(bounds);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let value = if pressed { 1.0 } else { 0.0 };

        match key {
            KeyCode::KeyW => self.input.forward = value,
            KeyCode::KeyS => self.input.forward = -value,
            KeyCode::KeyA => self.input.right = -value,
            KeyCode::KeyD => self.input.right = value,
            KeyCode::Space => self.input.up = value,
            KeyCode::ShiftLeft | KeyCode::ControlLeft => self.input.up = -value,
            KeyCode::Escape if pressed => self.exit_requested = true,
            KeyCode::KeyR if pressed && !self.loading => self.request_load(),
            _ => {}
        }
    }

    fn set_mouse_capture(&mut self, captured: bool) {
        self.input.mouse_captured = captured;

        let Some(window) = &self.window else { return };
        let (grab, visible) = if captured {
            (winit::window::CursorGrabMode::Confined, false)
        } else {
            (winit::window::CursorGrabMode::None, true)
        };
        if let Err(e) = window.set_cursor_grab(grab) {
            warn!("cursor grab failed: {e}");
        }
        window.set_cursor_visible(visible);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(1280, 800));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init_gpu(window) {
            error!("GPU initialisation failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(egui_state) = &mut self.egui_state {
            if let Some(window) = &self.window {
                let response = egui_state.on_window_event(window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.exit_requested = true;
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                    self.camera
                        .set_aspect(size.width as f32, size.height as f32);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.handle_key(key, event.state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state,
                ..
            } => {
                self.set_mouse_capture(state == ElementState::Pressed);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                self.camera.process_scroll(scroll);
            }

            WindowEvent::RedrawRequested => {
                self.update();
                self.render();
            }

            _ => {}
        }

        if self.exit_requested {
            self.terrain_engine.stop();
            event_loop.exit();
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: winit::event::DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.input.mouse_captured {
                self.input.mouse_delta.x += delta.0 as f32;
                self.input.mouse_delta.y += delta.1 as f32;
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&cli);
    event_loop
        .run_app(&mut app)
        .context("event loop exited with an error")?;
    Ok(())
}
