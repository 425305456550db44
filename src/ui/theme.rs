use egui::{Color32, FontId, Rounding, Stroke, Visuals};

use crate::model::activity::Domain;

// ── Palette ──────────────────────────────────────────────────────────────────

pub const ARMY_GREEN: Color32 = Color32::from_rgb(0x3C, 0x5A, 0x3C);
pub const KHAKI: Color32 = Color32::from_rgb(0x8B, 0x73, 0x55);
pub const OLIVE: Color32 = Color32::from_rgb(0x9A, 0x9A, 0x7C);
pub const BEIGE: Color32 = Color32::from_rgb(0xF5, 0xF5, 0xDC);
pub const IVORY: Color32 = Color32::from_rgb(0xFA, 0xFA, 0xF0);
pub const GOLD: Color32 = Color32::from_rgb(0xB8, 0x86, 0x0B);

pub const BG_CANVAS: Color32 = Color32::WHITE;
pub const BG_PANEL: Color32 = IVORY;
pub const BG_AXIS: Color32 = Color32::from_rgb(0xEE, 0xEE, 0xE0);
pub const BG_IMO_EVEN: Color32 = Color32::from_rgb(0xF7, 0xF7, 0xEE);
pub const BG_IMO_ODD: Color32 = Color32::from_rgb(0xFF, 0xFF, 0xFA);
pub const BG_DRAGGED: Color32 = Color32::from_rgba_premultiplied(0x3C, 0x5A, 0x3C, 40);

pub const OBJECTIVE_BORDER: Color32 = Color32::from_rgb(0xD3, 0x2F, 0x2F);
pub const LOE_FILL: Color32 = KHAKI;
pub const IMO_FILL: Color32 = OLIVE;
pub const GRID_LINE: Color32 = Color32::from_rgb(0xDD, 0xDD, 0xCC);
pub const TODAY_LINE: Color32 = Color32::from_rgb(0xD3, 0x2F, 0x2F);
pub const GRIP: Color32 = Color32::from_rgb(0x6C, 0x75, 0x7D);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x21, 0x25, 0x29);
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0x55, 0x5B, 0x4F);
pub const TEXT_ON_BAR: Color32 = Color32::WHITE;
pub const TEXT_ON_HEADER: Color32 = Color32::WHITE;

pub const DECISIVE_MARKER: Color32 = Color32::from_rgb(0xD3, 0x2F, 0x2F);
pub const DECISION_MARKER: Color32 = GOLD;
pub const MARKER_OUTLINE: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

pub const TOOLTIP_BG: Color32 = Color32::from_rgba_premultiplied(0x21, 0x96, 0xF3, 0xF2);

// ── Sizes ────────────────────────────────────────────────────────────────────

pub const AXIS_HEIGHT: f32 = 40.0;
pub const BAR_ROUNDING: f32 = 3.0;

// ── Fonts ────────────────────────────────────────────────────────────────────

pub fn font_objective() -> FontId {
    FontId::proportional(13.0)
}

pub fn font_header() -> FontId {
    FontId::proportional(11.5)
}

pub fn font_bar() -> FontId {
    FontId::proportional(9.0)
}

pub fn font_small() -> FontId {
    FontId::proportional(9.5)
}

// ── Domain colours ───────────────────────────────────────────────────────────

pub const DEFAULT_BAR: Color32 = Color32::from_rgb(0x6C, 0x75, 0x7D);

pub fn domain_color(domain: Option<Domain>) -> Color32 {
    match domain {
        Some(Domain::Land) => Color32::from_rgb(0x6B, 0x8E, 0x23),
        Some(Domain::Sea) => Color32::from_rgb(0x46, 0x82, 0xB4),
        Some(Domain::Air) => Color32::from_rgb(0x70, 0x80, 0x90),
        Some(Domain::Cyber) => Color32::from_rgb(0x55, 0x6B, 0x2F),
        Some(Domain::Space) => Color32::from_rgb(0x2F, 0x4F, 0x4F),
        None => DEFAULT_BAR,
    }
}

// ── Apply custom visuals ─────────────────────────────────────────────────────

pub fn apply_theme(ctx: &egui::Context) {
    let mut visuals = Visuals::light();

    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = IVORY;
    visuals.extreme_bg_color = Color32::WHITE;
    visuals.faint_bg_color = BEIGE;

    visuals.widgets.noninteractive.bg_fill = BG_PANEL;
    visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, GRID_LINE);
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(4.0);

    visuals.widgets.inactive.bg_fill = BEIGE;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, OLIVE);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(4.0);

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(0xE8, 0xE8, 0xD0);
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ARMY_GREEN);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);

    visuals.widgets.active.bg_fill = ARMY_GREEN;
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, ARMY_GREEN);
    visuals.widgets.active.fg_stroke = Stroke::new(2.0, Color32::WHITE);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    visuals.selection.bg_fill = Color32::from_rgba_premultiplied(0x3C, 0x5A, 0x3C, 60);
    visuals.selection.stroke = Stroke::new(1.0, ARMY_GREEN);

    visuals.window_rounding = Rounding::same(6.0);
    visuals.window_stroke = Stroke::new(1.0, KHAKI);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    ctx.set_style(style);
}
