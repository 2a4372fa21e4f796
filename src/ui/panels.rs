use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::renderer::{CameraMode, SceneSettings};
use crate::ui::state::UiState;
use crate::ui::theme::*;

/// Figures shown in the statistics block, captured when a mesh arrives.
pub struct TerrainStats {
    pub source: String,
    pub width: u32,
    pub height: u32,
    pub vertices: usize,
    pub triangles: usize,
    pub normals_written: usize,
    pub degenerate_normals: usize,
    pub z_range: (f32, f32),
    pub build_ms: f32,
}

#[derive(Default)]
pub struct UiActions {
    pub reload: bool,
    pub reset_camera: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: Option<&TerrainStats>,
    fps: f32,
    last_error: &Option<String>,
    loading: bool,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(300.0)
        .max_width(400.0)
        .default_width(320.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("Heightmap 3D").strong());
                ui.add_space(4.0);
                ui.label(RichText::new("Terrain mesh viewer").color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "SOURCE");
                ui.label(
                    RichText::new(state.heightmap_path.display().to_string())
                        .family(egui::FontFamily::Monospace)
                        .size(12.0),
                );
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    let text = if loading { "Loading..." } else { "Reload" };
                    let reload = egui::Button::new(RichText::new(text).color(BG_DEEP))
                        .fill(ACCENT_TEAL)
                        .min_size(egui::vec2(90.0, 28.0));
                    if ui.add_enabled(!loading, reload).clicked() {
                        actions.reload = true;
                    }
                    ui.checkbox(&mut state.corrected_edges, "Width-bounded edges")
                        .on_hover_text("Triangulate every column instead of bounding columns by the map height. Applies on reload.");
                });
                error_box(ui, last_error);
                ui.add_space(16.0);

                section_header(ui, "VIEW");
                ui.horizontal(|ui| {
                    camera_controls(ui, &mut state.camera_mode);
                    if ui.button("Reset").clicked() {
                        actions.reset_camera = true;
                    }
                });
                ui.add_space(16.0);

                scene_controls(ui, &mut state.scene);
                ui.add_space(16.0);

                perf_controls(ui, state);

                if state.show_stats {
                    ui.add_space(16.0);
                    stats_panel(ui, stats, fps);
                }
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn error_box(ui: &mut Ui, error: &Option<String>) {
    if let Some(err) = error {
        ui.add_space(6.0);
        egui::Frame::default()
            .fill(Color32::from_rgb(40, 15, 15))
            .stroke(egui::Stroke::new(1.0, ACCENT_RED))
            .rounding(4.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(err).color(ACCENT_RED).size(11.0));
            });
    }
}

fn camera_controls(ui: &mut Ui, mode: &mut CameraMode) {
    ui.label("Camera:");
    if ui.selectable_label(*mode == CameraMode::Orbital, "Orbital").clicked() {
        *mode = CameraMode::Orbital;
    }
    if ui.selectable_label(*mode == CameraMode::Free, "Free").clicked() {
        *mode = CameraMode::Free;
    }
}

fn scene_controls(ui: &mut Ui, scene: &mut SceneSettings) {
    section_header(ui, "LIGHTING");
    ui.checkbox(&mut scene.lighting, "Directional light");
    ui.add_enabled_ui(scene.lighting, |ui| {
        ui.add(egui::Slider::new(&mut scene.ambient, 0.0..=1.0).text("Ambient"));
        ui.horizontal(|ui| {
            ui.label("Direction");
            for c in scene.light_dir.iter_mut() {
                ui.add(egui::DragValue::new(c).speed(0.02).range(-1.0..=1.0));
            }
        });
    });
    ui.add_space(12.0);

    section_header(ui, "FOG");
    ui.checkbox(&mut scene.fog, "Linear fog");
    ui.add_enabled_ui(scene.fog, |ui| {
        ui.horizontal(|ui| {
            ui.label("Range:");
            ui.add(egui::DragValue::new(&mut scene.fog_start).speed(0.5).range(0.0..=scene.fog_end));
            ui.label("to");
            ui.add(egui::DragValue::new(&mut scene.fog_end).speed(0.5).range(scene.fog_start..=1000.0));
        });
        ui.horizontal(|ui| {
            ui.label("Colour");
            ui.color_edit_button_rgb(&mut scene.fog_color);
        });
    });
    ui.horizontal(|ui| {
        ui.label("Background");
        ui.color_edit_button_rgb(&mut scene.background);
    });
}

fn perf_controls(ui: &mut Ui, state: &mut UiState) {
    section_header(ui, "PERFORMANCE");
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.vsync_enabled, "VSync");
        ui.checkbox(&mut state.show_stats, "Stats");
        ui.checkbox(&mut state.show_help, "Help");
    });
    ui.horizontal(|ui| {
        ui.checkbox(&mut state.fps_cap_enabled, "FPS Cap:");
        ui.add_enabled(state.fps_cap_enabled,
            egui::DragValue::new(&mut state.fps_cap).range(30..=500).suffix(" fps"));
    });
}

fn stats_panel(ui: &mut Ui, stats: Option<&TerrainStats>, fps: f32) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if fps >= 60.0 { ACCENT_GREEN } else if fps >= 30.0 { ACCENT_AMBER } else { ACCENT_RED };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                stat_row(ui, "FPS", format!("{:.0}", fps), fps_color);

                let Some(stats) = stats else {
                    stat_row(ui, "Mesh", "none".to_string(), TEXT_MUTED);
                    return;
                };

                stat_row(ui, "Source", stats.source.clone(), TEXT_PRIMARY);
                stat_row(ui, "Grid", format!("{} x {}", stats.width, stats.height), TEXT_PRIMARY);
                stat_row(ui, "Vertices", fmt_num(stats.vertices), ACCENT_TEAL);
                stat_row(ui, "Triangles", fmt_num(stats.triangles), ACCENT_TEAL);
                stat_row(ui, "Normals", fmt_num(stats.normals_written), TEXT_PRIMARY);

                let degenerate_color = if stats.degenerate_normals > 0 { ACCENT_AMBER } else { TEXT_PRIMARY };
                stat_row(ui, "Degenerate", fmt_num(stats.degenerate_normals), degenerate_color);
                stat_row(ui, "Height", format!("{:.2} .. {:.2}", stats.z_range.0, stats.z_range.1), TEXT_PRIMARY);
                stat_row(ui, "Build ms", format!("{:.1}", stats.build_ms), TEXT_PRIMARY);
            });
        });
}

fn stat_row(ui: &mut Ui, label: &str, value: String, color: Color32) {
    ui.label(RichText::new(label).color(TEXT_MUTED));
    ui.label(RichText::new(value).color(color));
    ui.end_row();
}

pub fn draw_help_overlay(ctx: &Context, mode: CameraMode, pos: [f32; 3], speed: f32) {
    let controls = match mode {
        CameraMode::Orbital => "RMB+Drag - Orbit | Scroll - Zoom | Esc - Quit",
        CameraMode::Free => "WASD - Move | Space/Shift - Up/Down | RMB+Drag - Look | Scroll - Dolly | Esc - Quit",
    };

    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new(controls).color(TEXT_MUTED));
                    ui.label(RichText::new(format!("Pos: ({:.1}, {:.1}, {:.1}) | Speed: {:.1}", pos[0], pos[1], pos[2], speed)).color(TEXT_MUTED));
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}
