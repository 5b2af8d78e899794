use icicle_core::{Stylesheet, ThemeMode};
use icicle_protocol::{Color, Paint, ThemeToken};

pub fn to_color32(color: Color) -> egui::Color32 {
    let [r, g, b, a] = color.to_rgba8();
    egui::Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Resolve a command's paint through the live stylesheet.
pub fn paint(paint: Paint, sheet: &Stylesheet) -> egui::Color32 {
    match paint {
        Paint::Solid(color) => to_color32(color),
        Paint::Theme(token) => token_color(token, sheet),
    }
}

pub fn token_color(token: ThemeToken, sheet: &Stylesheet) -> egui::Color32 {
    to_color32(sheet.resolve(token))
}

// ── egui visual presets ────────────────────────────────────────────────────

pub fn visuals(mode: ThemeMode) -> egui::Visuals {
    match mode {
        ThemeMode::Dark => dark_visuals(),
        ThemeMode::Light => light_visuals(),
    }
}

/// Catppuccin Mocha dark visuals for egui widgets.
fn dark_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::dark();
    v.panel_fill = egui::Color32::from_rgb(0x18, 0x18, 0x25);
    v.window_fill = egui::Color32::from_rgb(0x1e, 0x1e, 0x2e);
    v.extreme_bg_color = egui::Color32::from_rgb(0x11, 0x11, 0x1b);
    v.widgets.noninteractive.bg_stroke =
        egui::Stroke::new(1.0, egui::Color32::from_rgb(0x44, 0x44, 0x44));
    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(0x45, 0x47, 0x5a);
    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(0x58, 0x5b, 0x70);
    v.widgets.active.bg_fill = egui::Color32::from_rgb(0x89, 0xb4, 0xfa);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(0x89, 0xb4, 0xfa, 60);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(3);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(3);
    v.widgets.active.corner_radius = egui::CornerRadius::same(3);
    v
}

fn light_visuals() -> egui::Visuals {
    let mut v = egui::Visuals::light();
    v.panel_fill = egui::Color32::from_rgb(248, 248, 250);
    v.window_fill = egui::Color32::from_rgb(221, 221, 221);
    v.extreme_bg_color = egui::Color32::WHITE;
    v.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(230, 230, 235);
    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(220, 220, 228);
    v.widgets.active.bg_fill = egui::Color32::from_rgb(50, 110, 220);
    v.selection.bg_fill = egui::Color32::from_rgba_unmultiplied(50, 110, 220, 50);
    v.widgets.inactive.corner_radius = egui::CornerRadius::same(3);
    v.widgets.hovered.corner_radius = egui::CornerRadius::same(3);
    v.widgets.active.corner_radius = egui::CornerRadius::same(3);
    v
}
