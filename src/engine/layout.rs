//! Hierarchical timeline layout.
//!
//! [`ChartLayout::compute`] is a pure function of the activity list, the
//! timeline mapping and an optional drag preview. It is re-run from scratch
//! on every frame; nothing is cached between calls.

use chrono::NaiveDate;
use egui::{pos2, vec2, Pos2, Rect};
use uuid::Uuid;

use super::drag::{DragPreview, HorizontalTarget};
use super::hierarchy::{group_activities, ImoGroup, LoeGroup, ObjectiveGroup};
use super::regions::{
    IdChain, Region, RegionIndex, RegionKind, ReorderHandle, ReorderSubject,
};
use crate::model::activity::Domain;
use crate::model::{Activity, PointKind, PointSlot, TimelineMapper};

pub const CONTENT_TOP: f32 = 50.0;
pub const BOTTOM_PADDING: f32 = 30.0;
pub const OBJECTIVE_HEADER: f32 = 35.0;
pub const LOE_HEADER: f32 = 30.0;
pub const IMO_HEADER: f32 = 25.0;
pub const ROW_HEIGHT: f32 = 28.0;
pub const HEADER_GAP: f32 = 2.0;
pub const IMO_GAP: f32 = 3.0;
pub const LOE_GAP: f32 = 3.0;
pub const OBJECTIVE_GAP: f32 = 5.0;
pub const LOE_INDENT: f32 = 15.0;
pub const IMO_INDENT: f32 = 30.0;
pub const DRAG_HANDLE_WIDTH: f32 = 20.0;
pub const RESIZE_HANDLE_WIDTH: f32 = 8.0;
pub const BAR_HEIGHT_RATIO: f32 = 0.6;
pub const MIN_BAR_WIDTH: f32 = 50.0;
pub const DECISIVE_MARKER_SIZE: f32 = 12.0;
pub const DECISION_MARKER_SIZE: f32 = 10.0;
pub const LABEL_MIN_WIDTH: f32 = 30.0;
pub const DESCRIPTION_MIN_WIDTH: f32 = 40.0;
/// Approximate advance of one character in the bar font.
pub const GLYPH_WIDTH: f32 = 5.0;
const OBJECTIVE_LABEL_CHARS: usize = 85;
const LOE_LABEL_CHARS: usize = 85;
const IMO_LABEL_CHARS: usize = 75;

/// Inputs that are not part of the data itself.
#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub mapper: TimelineMapper,
    /// Visible height; the content height never drops below it.
    pub viewport_height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandLevel {
    Objective,
    Loe,
    Imo,
}

/// A header band at one of the three grouping levels.
#[derive(Debug, Clone)]
pub struct Band {
    pub level: BandLevel,
    /// The whole band, header and body.
    pub rect: Rect,
    pub header: Rect,
    /// Reorder grip, absent for objectives.
    pub grip: Option<Rect>,
    pub label: String,
    /// Position among its siblings, used for alternating fills.
    pub index: usize,
    pub dragged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarLabel {
    pub id: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Bar {
    pub rect: Rect,
    pub label: Option<BarLabel>,
}

#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub activity: Uuid,
    pub rect: Rect,
    pub grip: Rect,
    /// `None` when the bar is suppressed (zero or negative width).
    pub bar: Option<Bar>,
    pub domain: Option<Domain>,
    pub dragged: bool,
}

#[derive(Debug, Clone)]
pub struct PointMarker {
    pub activity: Uuid,
    pub kind: PointKind,
    pub slot: PointSlot,
    pub center: Pos2,
    pub size: f32,
    pub label: String,
    pub date: NaiveDate,
}

/// Result of one layout pass.
#[derive(Debug, Clone, Default)]
pub struct ChartLayout {
    pub bands: Vec<Band>,
    pub rows: Vec<ActivityRow>,
    pub markers: Vec<PointMarker>,
    pub regions: RegionIndex,
    pub total_height: f32,
}

/// Sibling index the pointer implies for a reorder drag.
pub fn target_index(dragged: usize, count: usize, delta: f32, extent: f32) -> usize {
    if count == 0 || extent <= 0.0 {
        return dragged;
    }
    let moved = (delta / extent).round() as i64;
    (dragged as i64 + moved).clamp(0, count as i64 - 1) as usize
}

/// Vertical offset of sibling `index` while `dragged` is previewed at `target`.
pub fn reorder_offset(index: usize, dragged: usize, target: usize, extent: f32, delta: f32) -> f32 {
    if index == dragged {
        delta
    } else if dragged < target && index > dragged && index <= target {
        -extent
    } else if dragged > target && index >= target && index < dragged {
        extent
    } else {
        0.0
    }
}

pub fn imo_extent(activity_count: usize) -> f32 {
    IMO_HEADER + activity_count as f32 * ROW_HEIGHT + IMO_GAP
}

pub fn loe_extent(loe: &LoeGroup<'_>) -> f32 {
    LOE_HEADER
        + HEADER_GAP
        + loe
            .imos
            .iter()
            .map(|i| imo_extent(i.activities.len()))
            .sum::<f32>()
        + LOE_GAP
}

/// Offsets for every sibling given the dragged sibling's index and extent.
fn sibling_offsets(count: usize, dragged: Option<(usize, f32, f32)>) -> Vec<f32> {
    match dragged {
        Some((dragged, extent, delta)) => {
            let target = target_index(dragged, count, delta, extent);
            (0..count)
                .map(|i| reorder_offset(i, dragged, target, extent, delta))
                .collect()
        }
        None => vec![0.0; count],
    }
}

/// Cut `text` to roughly `max_width` pixels, ending in `...` when shortened.
pub fn fit_text(text: &str, max_width: f32) -> String {
    let max_chars = (max_width / GLYPH_WIDTH).floor().max(0.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

fn header_label(id: &str, name: &str, limit: usize) -> String {
    let label = if id.is_empty() {
        name.to_string()
    } else {
        format!("{} - {}", id, name)
    };
    if label.chars().count() > limit {
        let mut cut: String = label.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        label
    }
}

/// Decide what text fits inside a bar of `width` pixels.
pub fn bar_label(activity: &Activity, width: f32) -> Option<BarLabel> {
    if width <= LABEL_MIN_WIDTH {
        return None;
    }
    let id = if activity.activity_id.is_empty() {
        "OAI".to_string()
    } else {
        activity.activity_id.clone()
    };
    let id_width = id.chars().count() as f32 * GLYPH_WIDTH;
    let available = width - id_width - 12.0;
    let description = (available > DESCRIPTION_MIN_WIDTH && !activity.description.is_empty())
        .then(|| fit_text(&activity.description, available));
    Some(BarLabel { id, description })
}

const POINT_ORDER: [(PointKind, PointSlot); 8] = [
    (PointKind::Decisive, PointSlot::Legacy),
    (PointKind::Decision, PointSlot::Legacy),
    (PointKind::Decision, PointSlot::Numbered(1)),
    (PointKind::Decision, PointSlot::Numbered(2)),
    (PointKind::Decisive, PointSlot::Numbered(1)),
    (PointKind::Decisive, PointSlot::Numbered(2)),
    (PointKind::Decision, PointSlot::Numbered(3)),
    (PointKind::Decisive, PointSlot::Numbered(3)),
];

struct Pass<'p> {
    params: &'p LayoutParams,
    preview: Option<&'p DragPreview>,
    out: ChartLayout,
}

impl ChartLayout {
    pub fn compute(
        activities: &[Activity],
        params: &LayoutParams,
        preview: Option<&DragPreview>,
    ) -> ChartLayout {
        let groups = group_activities(activities);
        let mut pass = Pass {
            params,
            preview,
            out: ChartLayout::default(),
        };

        let mut y = CONTENT_TOP;
        for (obj_idx, objective) in groups.iter().enumerate() {
            y = pass.objective(objective, obj_idx, y);
        }

        pass.out.total_height = (y + BOTTOM_PADDING).max(params.viewport_height);
        pass.out
    }

    pub fn row(&self, activity: Uuid) -> Option<&ActivityRow> {
        self.rows.iter().find(|r| r.activity == activity)
    }
}

impl Pass<'_> {
    fn left(&self) -> f32 {
        self.params.mapper.left
    }

    fn width(&self) -> f32 {
        self.params.mapper.width
    }

    fn objective(&mut self, objective: &ObjectiveGroup<'_>, obj_idx: usize, top: f32) -> f32 {
        let mut y = top;
        let header = Rect::from_min_size(pos2(self.left(), y), vec2(self.width(), OBJECTIVE_HEADER));
        let band_idx = self.out.bands.len();
        self.out.bands.push(Band {
            level: BandLevel::Objective,
            rect: header,
            header,
            grip: None,
            label: header_label(
                &objective.id.to_string(),
                &objective.name,
                OBJECTIVE_LABEL_CHARS,
            ),
            index: obj_idx,
            dragged: false,
        });
        y += OBJECTIVE_HEADER + HEADER_GAP;

        let extents: Vec<f32> = objective.loes.iter().map(|l| loe_extent(l)).collect();
        let dragged = match self.preview {
            Some(DragPreview::Vertical {
                subject: ReorderSubject::Loe(key),
                delta_y,
                ..
            }) if key.objective == objective.name => objective
                .loes
                .iter()
                .position(|l| l.key == *key)
                .map(|i| (i, extents[i], *delta_y)),
            _ => None,
        };
        let offsets = sibling_offsets(objective.loes.len(), dragged);

        for (loe_idx, loe) in objective.loes.iter().enumerate() {
            let is_dragged = dragged.is_some_and(|(d, _, _)| d == loe_idx);
            let chain = IdChain {
                objective: objective.id.clone(),
                loe: loe.id.clone(),
                imo: Default::default(),
            };
            self.loe(
                loe,
                loe_idx,
                objective.loes.len(),
                y,
                offsets[loe_idx],
                extents[loe_idx],
                is_dragged,
                chain,
            );
            y += extents[loe_idx];
        }

        let outline = Rect::from_min_max(pos2(self.left(), top), pos2(self.left() + self.width(), y));
        self.out.bands[band_idx].rect = outline;
        y + OBJECTIVE_GAP
    }

    #[allow(clippy::too_many_arguments)]
    fn loe(
        &mut self,
        loe: &LoeGroup<'_>,
        loe_idx: usize,
        sibling_count: usize,
        top: f32,
        offset: f32,
        extent: f32,
        dragged: bool,
        chain: IdChain,
    ) {
        let x = self.left() + LOE_INDENT;
        let shown_top = top + offset;
        let header = Rect::from_min_size(pos2(x, shown_top), vec2(self.width() - LOE_INDENT, LOE_HEADER));
        let grip = Rect::from_min_size(pos2(x, shown_top), vec2(DRAG_HANDLE_WIDTH, LOE_HEADER));
        self.out.bands.push(Band {
            level: BandLevel::Loe,
            rect: Rect::from_min_size(header.min, vec2(header.width(), extent - LOE_GAP)),
            header,
            grip: Some(grip),
            label: header_label(&loe.id.to_string(), &loe.key.loe, LOE_LABEL_CHARS),
            index: loe_idx,
            dragged,
        });
        self.out.regions.push(Region::reorder_handle(
            grip,
            RegionKind::LoeDragHandle,
            ReorderHandle {
                subject: ReorderSubject::Loe(loe.key.clone()),
                index: loe_idx,
                sibling_count,
                extent,
                chain: chain.clone(),
            },
        ));

        let mut y = top + LOE_HEADER + HEADER_GAP;
        let dragged_imo = match self.preview {
            Some(DragPreview::Vertical {
                subject: ReorderSubject::Imo(key),
                delta_y,
                ..
            }) if key.loe_key() == loe.key => loe
                .imos
                .iter()
                .position(|i| i.key == *key)
                .map(|i| (i, imo_extent(loe.imos[i].activities.len()), *delta_y)),
            _ => None,
        };
        let offsets = sibling_offsets(loe.imos.len(), dragged_imo);

        for (imo_idx, imo) in loe.imos.iter().enumerate() {
            let imo_dragged = dragged || dragged_imo.is_some_and(|(d, _, _)| d == imo_idx);
            let chain = IdChain {
                imo: imo.id.clone(),
                ..chain.clone()
            };
            self.imo(
                imo,
                imo_idx,
                loe.imos.len(),
                y,
                offset + offsets[imo_idx],
                imo_dragged,
                chain,
            );
            y += imo_extent(imo.activities.len());
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn imo(
        &mut self,
        imo: &ImoGroup<'_>,
        imo_idx: usize,
        sibling_count: usize,
        top: f32,
        offset: f32,
        dragged: bool,
        chain: IdChain,
    ) {
        let x = self.left() + IMO_INDENT;
        let right = self.left() + self.width();
        let shown_top = top + offset;
        let body_height = imo.activities.len() as f32 * ROW_HEIGHT;
        let header = Rect::from_min_size(pos2(x, shown_top), vec2(right - x, IMO_HEADER));
        let grip = Rect::from_min_size(pos2(x, shown_top), vec2(DRAG_HANDLE_WIDTH, IMO_HEADER));
        self.out.bands.push(Band {
            level: BandLevel::Imo,
            rect: Rect::from_min_size(header.min, vec2(header.width(), IMO_HEADER + body_height)),
            header,
            grip: Some(grip),
            label: header_label(&imo.id.to_string(), &imo.key.imo, IMO_LABEL_CHARS),
            index: imo_idx,
            dragged,
        });
        self.out.regions.push(Region::reorder_handle(
            grip,
            RegionKind::ImoDragHandle,
            ReorderHandle {
                subject: ReorderSubject::Imo(imo.key.clone()),
                index: imo_idx,
                sibling_count,
                extent: imo_extent(imo.activities.len()),
                chain: chain.clone(),
            },
        ));

        let dragged_row = match self.preview {
            Some(DragPreview::Vertical {
                subject: ReorderSubject::Activity { id, imo: key },
                delta_y,
                ..
            }) if *key == imo.key => imo
                .activities
                .iter()
                .position(|a| a.id == *id)
                .map(|i| (i, ROW_HEIGHT, *delta_y)),
            _ => None,
        };
        let offsets = sibling_offsets(imo.activities.len(), dragged_row);

        let mut row_mids = Vec::with_capacity(imo.activities.len());
        let mut grips = Vec::with_capacity(imo.activities.len());
        for (row_idx, activity) in imo.activities.iter().enumerate() {
            let row_top = shown_top + IMO_HEADER + row_idx as f32 * ROW_HEIGHT + offsets[row_idx];
            let row_dragged = dragged || dragged_row.is_some_and(|(d, _, _)| d == row_idx);
            let grip = self.activity_row(
                activity,
                row_idx,
                imo.activities.len(),
                row_top,
                row_dragged,
                &imo.key,
                chain.clone(),
            );
            grips.push(grip);
            row_mids.push((activity, row_top + ROW_HEIGHT / 2.0));
        }

        // Markers go after every bar of the IMO so they sit on top, and the
        // row grips after the markers so a bar clamped to the IMO edge never
        // hides them.
        for (activity, mid_y) in row_mids {
            self.markers(activity, mid_y);
        }
        for grip in grips {
            self.out.regions.push(grip);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn activity_row(
        &mut self,
        activity: &Activity,
        row_idx: usize,
        sibling_count: usize,
        row_top: f32,
        dragged: bool,
        imo_key: &super::hierarchy::ImoKey,
        chain: IdChain,
    ) -> Region {
        let mapper = &self.params.mapper;
        let imo_left = self.left() + IMO_INDENT;
        let imo_right = self.left() + self.width();
        let rect = Rect::from_min_max(pos2(imo_left, row_top), pos2(imo_right, row_top + ROW_HEIGHT));
        let grip = Rect::from_min_size(pos2(imo_left + 2.0, row_top), vec2(DRAG_HANDLE_WIDTH, ROW_HEIGHT));

        let grip_region = Region::reorder_handle(
            grip,
            RegionKind::ActivityDragHandle,
            ReorderHandle {
                subject: ReorderSubject::Activity {
                    id: activity.id,
                    imo: imo_key.clone(),
                },
                index: row_idx,
                sibling_count,
                extent: ROW_HEIGHT,
                chain,
            },
        );

        let raw_x1 = activity
            .start_date
            .map(|d| mapper.date_to_x(d))
            .unwrap_or(mapper.left);
        let raw_x2 = activity
            .end_date
            .map(|d| mapper.date_to_x(d))
            .unwrap_or(raw_x1 + MIN_BAR_WIDTH);
        let start_anchor = activity.start_date.unwrap_or_else(|| mapper.x_to_date(raw_x1));
        let end_anchor = activity.end_date.unwrap_or_else(|| mapper.x_to_date(raw_x2));

        let (mut x1, mut x2) = (raw_x1, raw_x2);
        if let Some(DragPreview::Horizontal {
            activity: dragged_id,
            target,
            delta_x,
        }) = self.preview
        {
            if *dragged_id == activity.id {
                match target {
                    HorizontalTarget::Start => x1 += delta_x,
                    HorizontalTarget::End => x2 += delta_x,
                    HorizontalTarget::Point { .. } => {}
                }
            }
        }
        let x1 = x1.max(imo_left);
        let x2 = x2.min(imo_right);

        let bar = if x2 <= x1 || x1 >= imo_right {
            None
        } else {
            let bar_height = ROW_HEIGHT * BAR_HEIGHT_RATIO;
            let bar_top = row_top + (ROW_HEIGHT - bar_height) / 2.0;
            let bar_rect = Rect::from_min_max(pos2(x1, bar_top), pos2(x2, bar_top + bar_height));
            let half = RESIZE_HANDLE_WIDTH / 2.0;
            self.out.regions.push(Region::for_activity(bar_rect, RegionKind::Bar, activity.id, None));
            self.out.regions.push(Region::for_activity(
                Rect::from_min_size(pos2(x1 - half, bar_top), vec2(RESIZE_HANDLE_WIDTH, bar_height)),
                RegionKind::HandleStart,
                activity.id,
                Some(start_anchor),
            ));
            self.out.regions.push(Region::for_activity(
                Rect::from_min_size(pos2(x2 - half, bar_top), vec2(RESIZE_HANDLE_WIDTH, bar_height)),
                RegionKind::HandleEnd,
                activity.id,
                Some(end_anchor),
            ));
            Some(Bar {
                rect: bar_rect,
                label: bar_label(activity, x2 - x1),
            })
        };

        self.out.rows.push(ActivityRow {
            activity: activity.id,
            rect,
            grip,
            bar,
            domain: activity.primary_domain(),
            dragged,
        });
        grip_region
    }

    fn markers(&mut self, activity: &Activity, mid_y: f32) {
        let mapper = &self.params.mapper;
        for (kind, slot) in POINT_ORDER {
            let Some((date, label)) = activity.point(kind, slot) else {
                continue;
            };
            if !activity.contains_date(date) {
                continue;
            }
            let mut x = mapper.date_to_x(date);
            if let Some(DragPreview::Horizontal {
                activity: dragged_id,
                target: HorizontalTarget::Point { kind: k, slot: s },
                delta_x,
            }) = self.preview
            {
                if *dragged_id == activity.id && *k == kind && *s == slot {
                    x += delta_x;
                }
            }
            let size = match kind {
                PointKind::Decisive => DECISIVE_MARKER_SIZE,
                PointKind::Decision => DECISION_MARKER_SIZE,
            };
            let center = pos2(x, mid_y);
            self.out.regions.push(
                Region::for_activity(
                    Rect::from_center_size(center, vec2(size * 2.0, size * 2.0)),
                    RegionKind::Point { kind, slot },
                    activity.id,
                    Some(date),
                )
                .with_label(label.clone()),
            );
            self.out.markers.push(PointMarker {
                activity: activity.id,
                kind,
                slot,
                center,
                size,
                label,
                date,
            });
        }
    }
}
