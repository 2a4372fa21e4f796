use egui::style::WidgetVisuals;
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

pub const BG_DEEP: Color32 = Color32::from_rgb(6, 8, 14);
pub const BG_PANEL: Color32 = Color32::from_rgb(12, 14, 24);
pub const BG_WIDGET: Color32 = Color32::from_rgb(22, 26, 40);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(32, 38, 58);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(42, 50, 76);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(176, 182, 196);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(110, 116, 132);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(226, 230, 238);

pub const ACCENT_TEAL: Color32 = Color32::from_rgb(54, 170, 160);
pub const ACCENT_GREEN: Color32 = Color32::from_rgb(70, 168, 64);
pub const ACCENT_AMBER: Color32 = Color32::from_rgb(196, 142, 48);
pub const ACCENT_RED: Color32 = Color32::from_rgb(180, 52, 52);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(48, 58, 96, 80);

fn widget(bg: Color32, border: Stroke, text: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: bg,
        weak_bg_fill: bg,
        bg_stroke: border,
        rounding: Rounding::same(4.0),
        fg_stroke: Stroke::new(1.0, text),
        expansion,
    }
}

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    let subtle = Stroke::new(1.0, BORDER_SUBTLE);

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.widgets.noninteractive = widget(BG_PANEL, subtle, TEXT_MUTED, 0.0);
    visuals.widgets.inactive = widget(BG_WIDGET, subtle, TEXT_PRIMARY, 0.0);
    visuals.widgets.hovered =
        widget(BG_WIDGET_HOVER, Stroke::new(1.0, ACCENT_TEAL), TEXT_BRIGHT, 1.0);
    visuals.widgets.active =
        widget(BG_WIDGET_ACTIVE, Stroke::new(2.0, ACCENT_TEAL), TEXT_BRIGHT, 1.0);
    visuals.widgets.open = widget(BG_WIDGET_ACTIVE, subtle, TEXT_BRIGHT, 0.0);

    visuals.selection.bg_fill = ACCENT_TEAL.gamma_multiply(0.4);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_TEAL);
    visuals.hyperlink_color = ACCENT_TEAL;
    visuals.warn_fg_color = ACCENT_AMBER;
    visuals.error_fg_color = ACCENT_RED;

    visuals.faint_bg_color = BG_PANEL;
    visuals.extreme_bg_color = BG_DEEP;
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = subtle;
    visuals.window_rounding = Rounding::same(6.0);
    visuals.slider_trailing_fill = true;

    let mut style = (*ctx.style()).clone();
    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.slider_width = 160.0;

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
