use chrono::NaiveDate;
use egui::{Align2, Color32, CursorIcon, Mesh, Painter, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use uuid::Uuid;

use crate::engine::drag::DragState;
use crate::engine::layout::{ActivityRow, Band, BandLevel, PointMarker, LOE_INDENT};
use crate::engine::{ChartEvent, ChartLayout, DragMachine, LayoutParams, RegionKind};
use crate::model::{Activity, PointKind, TimelineMapper};
use crate::ui::theme;

/// Result details from interactions in the Gantt chart.
#[derive(Debug, Clone)]
pub struct ChartInteraction {
    pub event: ChartEvent,
}

impl Default for ChartInteraction {
    fn default() -> Self {
        Self {
            event: ChartEvent::None,
        }
    }
}

/// Render the timeline and route pointer input through `machine`.
pub fn show_gantt_chart(
    activities: &[Activity],
    horizon_year: i32,
    machine: &mut DragMachine,
    selected: Option<Uuid>,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();
    let today = chrono::Local::now().date_naive();
    // Leave room for the vertical scroll bar.
    let width = (available.x - 14.0).max(200.0);
    let mapper = TimelineMapper::for_activities(activities, horizon_year, today, 0.0, width);
    let params = LayoutParams {
        mapper: mapper.clone(),
        viewport_height: available.y,
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .drag_to_scroll(false)
        .show(ui, |ui| {
            let preview = machine.preview();
            let mut layout = ChartLayout::compute(activities, &params, preview.as_ref());

            let (response, painter) =
                ui.allocate_painter(Vec2::new(width, layout.total_height), Sense::click_and_drag());
            let origin = response.rect.min;

            let (pointer, pressed, released) = ui.input(|i| {
                (
                    i.pointer.interact_pos(),
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                )
            });
            let local = pointer.map(|p| (p - origin).to_pos2());
            let visible = ui.clip_rect().intersect(response.rect);
            let inside = pointer.is_some_and(|p| visible.contains(p));

            if ui.input(|i| i.key_pressed(egui::Key::Escape)) && machine.is_dragging() {
                interaction.event = machine.pointer_leave();
            } else if let (Some(pos), true) = (local, inside) {
                machine.pointer_move(pos, &layout.regions);
                if pressed {
                    machine.pointer_down(pos, &layout.regions, &mapper);
                }
                if released {
                    interaction.event = machine.pointer_up(pos, &mapper);
                }
            } else if !matches!(machine.state(), DragState::Idle) {
                interaction.event = machine.pointer_leave();
            }

            let current = machine.preview();
            if current != preview {
                layout = ChartLayout::compute(activities, &params, current.as_ref());
            }

            paint(&painter, origin, &layout, &mapper, today, selected);
            update_cursor(ui, machine);

            if let Some((heading, date)) = machine.projected_date(&mapper) {
                egui::show_tooltip_at_pointer(
                    ui.ctx(),
                    ui.layer_id(),
                    egui::Id::new("drag-date-tip"),
                    |ui| {
                        ui.strong(heading);
                        ui.monospace(date.format("%d %b %Y").to_string());
                    },
                );
            } else if let Some(region) = machine.hovered() {
                if let (RegionKind::Point { kind, .. }, Some(date)) = (region.kind, region.date) {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new("point-tip"),
                        |ui| {
                            ui.strong(region.label.as_deref().unwrap_or(kind.label()));
                            ui.label(date.format("%d %b %Y").to_string());
                        },
                    );
                }
            }
        });

    interaction
}

fn update_cursor(ui: &Ui, machine: &DragMachine) {
    let kind = match machine.state() {
        DragState::DraggingHorizontal(_) => Some(CursorIcon::Grabbing),
        DragState::DraggingVertical(_) => Some(CursorIcon::ResizeVertical),
        _ => machine.hovered().map(|region| match region.kind {
            RegionKind::HandleStart | RegionKind::HandleEnd => CursorIcon::ResizeHorizontal,
            RegionKind::Point { .. } => CursorIcon::Grab,
            RegionKind::ActivityDragHandle | RegionKind::ImoDragHandle | RegionKind::LoeDragHandle => {
                CursorIcon::ResizeVertical
            }
            RegionKind::Bar => CursorIcon::PointingHand,
        }),
    };
    if let Some(icon) = kind {
        ui.ctx().set_cursor_icon(icon);
    }
}

fn paint(
    painter: &Painter,
    origin: Pos2,
    layout: &ChartLayout,
    mapper: &TimelineMapper,
    today: NaiveDate,
    selected: Option<Uuid>,
) {
    let offset = origin.to_vec2();
    let canvas = Rect::from_min_size(origin, Vec2::new(mapper.right(), layout.total_height));
    painter.rect_filled(canvas, 0.0, theme::BG_CANVAS);

    draw_year_axis(painter, origin, mapper, layout.total_height);

    for band in layout.bands.iter().filter(|b| b.level != BandLevel::Objective) {
        draw_band(painter, band, offset);
    }
    for band in layout.bands.iter().filter(|b| b.level == BandLevel::Objective) {
        draw_objective_header(painter, band, offset);
    }

    draw_today_line(painter, origin, mapper, today, layout.total_height);

    for row in &layout.rows {
        draw_row(painter, row, offset, selected == Some(row.activity));
    }
    for marker in &layout.markers {
        draw_marker(painter, marker, offset);
    }

    // Objective outlines sit above everything they enclose.
    for band in layout.bands.iter().filter(|b| b.level == BandLevel::Objective) {
        painter.rect_stroke(
            band.rect.translate(offset),
            Rounding::ZERO,
            Stroke::new(2.0, theme::OBJECTIVE_BORDER),
        );
    }
}

fn draw_year_axis(painter: &Painter, origin: Pos2, mapper: &TimelineMapper, height: f32) {
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(mapper.right(), theme::AXIS_HEIGHT)),
        0.0,
        theme::BG_AXIS,
    );
    for (year, x) in mapper.year_marks() {
        let x = origin.x + x;
        painter.line_segment(
            [
                Pos2::new(x, origin.y + theme::AXIS_HEIGHT),
                Pos2::new(x, origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        painter.text(
            Pos2::new(x + 4.0, origin.y + theme::AXIS_HEIGHT / 2.0),
            Align2::LEFT_CENTER,
            year.to_string(),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }
}

fn draw_today_line(painter: &Painter, origin: Pos2, mapper: &TimelineMapper, today: NaiveDate, height: f32) {
    if today < mapper.start || today > mapper.end {
        return;
    }
    let x = origin.x + mapper.date_to_x(today);
    painter.line_segment(
        [
            Pos2::new(x, origin.y + theme::AXIS_HEIGHT),
            Pos2::new(x, origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );
    let badge = Rect::from_center_size(
        Pos2::new(x, origin.y + theme::AXIS_HEIGHT - 6.0),
        Vec2::new(42.0, 14.0),
    );
    painter.rect_filled(badge, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_objective_header(painter: &Painter, band: &Band, offset: Vec2) {
    let header = band.header.translate(offset);
    painter.rect_filled(header, 0.0, theme::ARMY_GREEN);
    painter.with_clip_rect(header).text(
        Pos2::new(header.left() + 10.0, header.center().y),
        Align2::LEFT_CENTER,
        &band.label,
        theme::font_objective(),
        theme::TEXT_ON_HEADER,
    );
}

fn draw_band(painter: &Painter, band: &Band, offset: Vec2) {
    let rect = band.rect.translate(offset);
    let header = band.header.translate(offset);
    let (header_fill, font) = match band.level {
        BandLevel::Loe => (theme::LOE_FILL, theme::font_header()),
        _ => (theme::IMO_FILL, theme::font_small()),
    };

    if band.level == BandLevel::Imo {
        let body = if band.index % 2 == 0 {
            theme::BG_IMO_EVEN
        } else {
            theme::BG_IMO_ODD
        };
        painter.rect_filled(rect, 0.0, body);
    }
    painter.rect_filled(header, 0.0, header_fill);
    if band.dragged {
        painter.rect_filled(rect, 0.0, theme::BG_DRAGGED);
        painter.rect_stroke(rect, Rounding::ZERO, Stroke::new(1.5, theme::ARMY_GREEN));
    }

    if let Some(grip) = band.grip {
        draw_grip(painter, grip.translate(offset), theme::TEXT_ON_HEADER);
    }
    let text_left = header.left() + LOE_INDENT + 12.0;
    painter.with_clip_rect(header).text(
        Pos2::new(text_left, header.center().y),
        Align2::LEFT_CENTER,
        &band.label,
        font,
        theme::TEXT_ON_HEADER,
    );
}

fn draw_grip(painter: &Painter, rect: Rect, color: Color32) {
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        egui_phosphor::regular::DOTS_SIX_VERTICAL,
        theme::font_header(),
        color,
    );
}

fn draw_row(painter: &Painter, row: &ActivityRow, offset: Vec2, is_selected: bool) {
    let rect = row.rect.translate(offset);
    painter.line_segment(
        [rect.left_bottom(), rect.right_bottom()],
        Stroke::new(0.5, theme::GRID_LINE),
    );
    if row.dragged {
        painter.rect_filled(rect, 0.0, theme::BG_DRAGGED);
    }
    draw_grip(painter, row.grip.translate(offset), theme::GRIP);

    let Some(bar) = &row.bar else {
        return;
    };
    let bar_rect = bar.rect.translate(offset);
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let fill = theme::domain_color(row.domain);
    let fill = if row.dragged { fill.gamma_multiply(0.7) } else { fill };

    painter.rect_filled(bar_rect.translate(Vec2::new(1.0, 1.5)), rounding, Color32::from_black_alpha(30));
    painter.rect_filled(bar_rect, rounding, fill);
    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::GOLD),
        );
    }

    if let Some(label) = &bar.label {
        let clipped = painter.with_clip_rect(bar_rect);
        let id_galley = painter.layout_no_wrap(
            label.id.clone(),
            egui::FontId::monospace(theme::font_bar().size),
            theme::TEXT_ON_BAR,
        );
        let id_width = id_galley.size().x;
        let text_pos = Pos2::new(bar_rect.left() + 5.0, bar_rect.center().y - id_galley.size().y / 2.0);
        clipped.galley(text_pos, id_galley, theme::TEXT_ON_BAR);
        if let Some(description) = &label.description {
            clipped.text(
                Pos2::new(text_pos.x + id_width, bar_rect.center().y),
                Align2::LEFT_CENTER,
                format!(" - {description}"),
                theme::font_bar(),
                theme::TEXT_ON_BAR,
            );
        }
    }
}

fn draw_marker(painter: &Painter, marker: &PointMarker, offset: Vec2) {
    let center = marker.center + offset;
    let size = marker.size;
    match marker.kind {
        PointKind::Decisive => {
            let points = vec![
                Pos2::new(center.x, center.y - size),
                Pos2::new(center.x + size, center.y + size * 0.8),
                Pos2::new(center.x - size, center.y + size * 0.8),
            ];
            painter.add(Shape::convex_polygon(
                points,
                theme::DECISIVE_MARKER,
                Stroke::new(1.0, theme::MARKER_OUTLINE),
            ));
        }
        PointKind::Decision => {
            let points = star_points(center, size, size * 0.4);
            let mut mesh = Mesh::default();
            mesh.colored_vertex(center, theme::DECISION_MARKER);
            for p in &points {
                mesh.colored_vertex(*p, theme::DECISION_MARKER);
            }
            let n = points.len() as u32;
            for i in 0..n {
                mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
            }
            painter.add(Shape::mesh(mesh));
            painter.add(Shape::closed_line(points, Stroke::new(1.0, theme::MARKER_OUTLINE)));
        }
    }
}

/// Five-point star, first tip pointing up.
fn star_points(center: Pos2, outer: f32, inner: f32) -> Vec<Pos2> {
    (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
            Pos2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_alternates_outer_and_inner_radius() {
        let center = Pos2::new(100.0, 50.0);
        let points = star_points(center, 10.0, 4.0);
        assert_eq!(points.len(), 10);
        assert!((points[0].y - 40.0).abs() < 1e-4);
        assert!((points[0].x - 100.0).abs() < 1e-4);
        assert!(((points[1] - center).length() - 4.0).abs() < 1e-4);
    }
}
