//! Candlelight theme: near-black night map with warm gold accents

use egui::Color32;

/// Dark warm palette; the only saturated colors are the candle flames.
pub mod colors {
    use super::Color32;

    // === Backgrounds (night map) ===
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(10, 10, 14); // #0A0A0E
    pub const BG_ELEVATED: Color32 = Color32::from_rgb(20, 20, 26); // #14141A
    pub const BG_HOVER: Color32 = Color32::from_rgb(32, 32, 40); // #202028

    // === Text ===
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(245, 240, 225); // warm white
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(170, 165, 150);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(90, 88, 80);

    // === Lines & Borders ===
    pub const BORDER: Color32 = Color32::from_rgb(44, 44, 52);
    /// Faint graticule over the world background.
    pub const GRATICULE: Color32 = Color32::from_rgb(28, 28, 36);

    // === Candle gold ===
    pub const GOLD: Color32 = Color32::from_rgb(0xF5, 0xE6, 0xA2); // #F5E6A2
    pub const FLAME_DEFAULT: Color32 = Color32::from_rgb(0xFF, 0xD7, 0x00); // #FFD700
    pub const WAX_DEFAULT: Color32 = Color32::from_rgb(0xFF, 0xF8, 0xE1); // #FFF8E1
}

/// Flame and wax colors per intention category, defaults for everything else.
pub fn category_colors(category: &str) -> (Color32, Color32) {
    match category {
        "health" => (
            Color32::from_rgb(0xFF, 0x52, 0x52),
            Color32::from_rgb(0xFF, 0xEB, 0xEE),
        ),
        "family" => (
            Color32::from_rgb(0x4C, 0xAF, 0x50),
            Color32::from_rgb(0xE8, 0xF5, 0xE9),
        ),
        "peace" => (
            Color32::from_rgb(0x21, 0x96, 0xF3),
            Color32::from_rgb(0xE3, 0xF2, 0xFD),
        ),
        "memory" => (
            Color32::from_rgb(0x9C, 0x27, 0xB0),
            Color32::from_rgb(0xF3, 0xE5, 0xF5),
        ),
        _ => (colors::FLAME_DEFAULT, colors::WAX_DEFAULT),
    }
}

/// Create the candlelight egui Visuals
pub fn candlelight_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::dark();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_ELEVATED;
    visuals.extreme_bg_color = BG_PRIMARY;
    visuals.faint_bg_color = BG_ELEVATED;

    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_fill = BG_PRIMARY;
    visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);

    visuals.widgets.inactive.bg_fill = BG_PRIMARY;
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.weak_bg_fill = BG_PRIMARY;

    visuals.widgets.hovered.bg_fill = BG_ELEVATED;
    visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, TEXT_MUTED);
    visuals.widgets.hovered.weak_bg_fill = BG_ELEVATED;

    visuals.widgets.active.bg_fill = BG_HOVER;
    visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.active.weak_bg_fill = BG_HOVER;

    visuals.selection.bg_fill = Color32::from_rgb(70, 60, 30);
    visuals.selection.stroke = egui::Stroke::new(1.0, GOLD);

    visuals.hyperlink_color = GOLD;

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
