//! Pointer gesture state machine for the timeline canvas.
//!
//! One [`DragMachine`] lives in the application and is fed raw pointer
//! events together with the region index of the current frame. It never
//! mutates activities; releases produce a [`ChartEvent`] the caller acts on.

use chrono::NaiveDate;
use egui::Pos2;
use tracing::debug;
use uuid::Uuid;

use super::layout::target_index;
use super::regions::{Region, RegionIndex, RegionKind, ReorderHandle, ReorderSubject};
use super::renumber::ReorderRequest;
use crate::model::{FieldValue, PointKind, PointSlot, TimelineMapper};

pub const DEFAULT_DRAG_THRESHOLD: f32 = 2.0;

/// Which date a horizontal drag edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalTarget {
    Start,
    End,
    Point { kind: PointKind, slot: PointSlot },
}

impl HorizontalTarget {
    pub fn from_kind(kind: RegionKind) -> Option<Self> {
        match kind {
            RegionKind::HandleStart => Some(HorizontalTarget::Start),
            RegionKind::HandleEnd => Some(HorizontalTarget::End),
            RegionKind::Point { kind, slot } => Some(HorizontalTarget::Point { kind, slot }),
            _ => None,
        }
    }

    pub fn field(&self, date: NaiveDate) -> FieldValue {
        match *self {
            HorizontalTarget::Start => FieldValue::StartDate(date),
            HorizontalTarget::End => FieldValue::EndDate(date),
            HorizontalTarget::Point { kind, slot } => FieldValue::PointDate { kind, slot, date },
        }
    }
}

/// Offsets the layout applies while a drag is engaged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragPreview {
    Horizontal {
        activity: Uuid,
        target: HorizontalTarget,
        delta_x: f32,
    },
    Vertical {
        subject: ReorderSubject,
        delta_y: f32,
        extent: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalDrag {
    pub activity: Uuid,
    pub target: HorizontalTarget,
    /// Date under the dragged handle or marker at pointer-down.
    pub anchor: NaiveDate,
    pub label: Option<String>,
    pub origin_x: f32,
    pub delta_x: f32,
    /// Set once the pointer has moved past the threshold.
    pub engaged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalDrag {
    pub handle: ReorderHandle,
    pub origin_y: f32,
    pub delta_y: f32,
    pub engaged: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Hovering(Region),
    /// Pointer went down on a region that only supports clicking.
    Pressed { region: Region, origin: Pos2 },
    DraggingHorizontal(HorizontalDrag),
    DraggingVertical(VerticalDrag),
}

/// Outcome of a pointer release or leave.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    None,
    Selected(Uuid),
    CommitDate { activity: Uuid, value: FieldValue },
    CommitReorder(ReorderRequest),
    Cancelled,
}

/// Movement along one axis that turns a press into a drag.
fn past_threshold(delta: f32, threshold: f32) -> bool {
    delta.abs() > threshold
}

#[derive(Debug, Clone)]
pub struct DragMachine {
    state: DragState,
    threshold: f32,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl DragMachine {
    pub fn new(threshold: f32) -> Self {
        Self {
            state: DragState::Idle,
            threshold: threshold.max(0.0),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.state,
            DragState::DraggingHorizontal(_) | DragState::DraggingVertical(_)
        )
    }

    /// Region under the pointer while no gesture is in progress.
    pub fn hovered(&self) -> Option<&Region> {
        match &self.state {
            DragState::Hovering(region) | DragState::Pressed { region, .. } => Some(region),
            _ => None,
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2, regions: &RegionIndex) {
        if matches!(self.state, DragState::Idle | DragState::Hovering(_)) {
            self.state = match regions.hit_test(pos) {
                Some(region) => DragState::Hovering(region.clone()),
                None => DragState::Idle,
            };
            return;
        }
        let threshold = self.threshold;
        match &mut self.state {
            DragState::Idle | DragState::Hovering(_) | DragState::Pressed { .. } => {}
            DragState::DraggingHorizontal(drag) => {
                drag.delta_x = pos.x - drag.origin_x;
                if !drag.engaged && past_threshold(drag.delta_x, threshold) {
                    drag.engaged = true;
                    debug!(activity = %drag.activity, target = ?drag.target, "horizontal drag engaged");
                }
            }
            DragState::DraggingVertical(drag) => {
                drag.delta_y = pos.y - drag.origin_y;
                if !drag.engaged && past_threshold(drag.delta_y, threshold) {
                    drag.engaged = true;
                    debug!(
                        level = drag.handle.subject.level().label(),
                        subject = %drag.handle.subject.describe(),
                        index = drag.handle.index,
                        "reorder drag engaged"
                    );
                }
            }
        }
    }

    /// Starts a gesture on the region under `pos`. Ignored mid-gesture.
    pub fn pointer_down(&mut self, pos: Pos2, regions: &RegionIndex, mapper: &TimelineMapper) {
        if !matches!(self.state, DragState::Idle | DragState::Hovering(_)) {
            return;
        }
        let Some(region) = regions.hit_test(pos).cloned() else {
            self.state = DragState::Idle;
            return;
        };

        if let (Some(target), Some(activity)) = (HorizontalTarget::from_kind(region.kind), region.activity) {
            let anchor = region.date.unwrap_or_else(|| mapper.x_to_date(region.rect.center().x));
            self.state = DragState::DraggingHorizontal(HorizontalDrag {
                activity,
                target,
                anchor,
                label: region.label.clone(),
                origin_x: pos.x,
                delta_x: 0.0,
                engaged: false,
            });
        } else if let Some(handle) = region.reorder.clone() {
            self.state = DragState::DraggingVertical(VerticalDrag {
                handle,
                origin_y: pos.y,
                delta_y: 0.0,
                engaged: false,
            });
        } else {
            self.state = DragState::Pressed { region, origin: pos };
        }
    }

    /// Ends the current gesture and reports what it amounts to.
    pub fn pointer_up(&mut self, pos: Pos2, mapper: &TimelineMapper) -> ChartEvent {
        let threshold = self.threshold;
        let state = std::mem::take(&mut self.state);
        match state {
            DragState::Idle | DragState::Hovering(_) => {
                self.state = state;
                ChartEvent::None
            }
            DragState::Pressed { region, origin } => {
                let moved = pos - origin;
                if !past_threshold(moved.x, threshold) && !past_threshold(moved.y, threshold) {
                    region.activity.map_or(ChartEvent::None, ChartEvent::Selected)
                } else {
                    ChartEvent::None
                }
            }
            DragState::DraggingHorizontal(drag) => {
                let delta_x = pos.x - drag.origin_x;
                if !drag.engaged && !past_threshold(delta_x, threshold) {
                    return ChartEvent::Selected(drag.activity);
                }
                let days = mapper.days_for_delta(delta_x);
                if days == 0 {
                    debug!(activity = %drag.activity, "date drag released without a whole-day change");
                    return ChartEvent::None;
                }
                let date = drag.anchor + chrono::Duration::days(days);
                let value = drag.target.field(date);
                debug!(activity = %drag.activity, field = %value.field_name(), %date, "date drag committed");
                ChartEvent::CommitDate {
                    activity: drag.activity,
                    value,
                }
            }
            DragState::DraggingVertical(drag) => {
                let delta_y = pos.y - drag.origin_y;
                let handle = drag.handle;
                if !drag.engaged && !past_threshold(delta_y, threshold) {
                    return match handle.subject {
                        ReorderSubject::Activity { id, .. } => ChartEvent::Selected(id),
                        _ => ChartEvent::None,
                    };
                }
                if delta_y.abs() < handle.extent / 2.0 {
                    debug!(subject = %handle.subject.describe(), "reorder released under half a slot");
                    return ChartEvent::None;
                }
                let target = target_index(handle.index, handle.sibling_count, delta_y, handle.extent);
                if target == handle.index {
                    return ChartEvent::None;
                }
                debug!(
                    level = handle.subject.level().label(),
                    from = handle.index,
                    to = target,
                    "reorder drag committed"
                );
                ChartEvent::CommitReorder(ReorderRequest {
                    subject: handle.subject,
                    chain: handle.chain,
                    source_index: handle.index,
                    target_index: target,
                })
            }
        }
    }

    /// Pointer left the canvas: abandon any gesture.
    pub fn pointer_leave(&mut self) -> ChartEvent {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        if was_dragging {
            debug!("drag cancelled");
            ChartEvent::Cancelled
        } else {
            ChartEvent::None
        }
    }

    /// Offsets to feed into the next layout pass, once past the threshold.
    pub fn preview(&self) -> Option<DragPreview> {
        match &self.state {
            DragState::DraggingHorizontal(drag) if drag.engaged => Some(DragPreview::Horizontal {
                activity: drag.activity,
                target: drag.target,
                delta_x: drag.delta_x,
            }),
            DragState::DraggingVertical(drag) if drag.engaged => Some(DragPreview::Vertical {
                subject: drag.handle.subject.clone(),
                delta_y: drag.delta_y,
                extent: drag.handle.extent,
            }),
            _ => None,
        }
    }

    /// Heading and the date a release would commit, for the drag tooltip.
    pub fn projected_date(&self, mapper: &TimelineMapper) -> Option<(String, NaiveDate)> {
        let DragState::DraggingHorizontal(drag) = &self.state else {
            return None;
        };
        if !drag.engaged {
            return None;
        }
        let heading = match drag.target {
            HorizontalTarget::Start => "Adjusting Start Date".to_string(),
            HorizontalTarget::End => "Adjusting End Date".to_string(),
            HorizontalTarget::Point { kind, .. } => format!(
                "Moving {}",
                drag.label.as_deref().unwrap_or(kind.label())
            ),
        };
        Some((heading, mapper.shift_date(drag.anchor, drag.delta_x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hierarchy::ImoKey;
    use crate::engine::layout::{ChartLayout, LayoutParams, ROW_HEIGHT};
    use crate::model::Activity;
    use egui::{pos2, vec2};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mapper() -> TimelineMapper {
        // 2191 days over 2191 pixels: one pixel per day.
        TimelineMapper::new(date(2025, 1, 1), date(2030, 12, 31), 0.0, 2190.0)
    }

    fn activities() -> Vec<Activity> {
        (1..=3)
            .map(|n| {
                let mut a = Activity::new("Obj", "Maritime", "Patrol", format!("1.1.1.{n}"));
                a.objective_id = "1".into();
                a.loe_id = "1.1".into();
                a.imo_id = "1.1.1".into();
                a.start_date = Some(date(2026, 1, 1));
                a.end_date = Some(date(2026, 12, 31));
                a.decision_points[0].date = Some(date(2026, 6, 1));
                a
            })
            .collect()
    }

    fn layout(acts: &[Activity]) -> ChartLayout {
        let params = LayoutParams {
            mapper: mapper(),
            viewport_height: 400.0,
        };
        ChartLayout::compute(acts, &params, None)
    }

    #[test]
    fn click_without_movement_selects() {
        let acts = activities();
        let layout = layout(&acts);
        let bar = layout.rows[0].bar.as_ref().unwrap().rect;
        let mut machine = DragMachine::default();
        machine.pointer_move(bar.center(), &layout.regions);
        assert!(matches!(machine.state(), DragState::Hovering(r) if r.kind == RegionKind::Bar));
        machine.pointer_down(bar.center(), &layout.regions, &mapper());
        let event = machine.pointer_up(bar.center() + egui::vec2(1.0, 0.0), &mapper());
        assert_eq!(event, ChartEvent::Selected(acts[0].id));
        assert_eq!(machine.state(), &DragState::Idle);
    }

    #[test]
    fn sub_threshold_handle_drag_is_a_click() {
        let acts = activities();
        let layout = layout(&acts);
        let marker = &layout.markers[0];
        let mut machine = DragMachine::default();
        machine.pointer_down(marker.center, &layout.regions, &mapper());
        machine.pointer_move(marker.center + egui::vec2(1.5, 0.0), &layout.regions);
        assert!(machine.preview().is_none());
        let event = machine.pointer_up(marker.center + egui::vec2(1.5, 0.0), &mapper());
        assert_eq!(event, ChartEvent::Selected(marker.activity));
    }

    #[test]
    fn bar_and_handle_share_the_click_tolerance() {
        let acts = activities();
        let layout = layout(&acts);
        let bar = layout.rows[0].bar.as_ref().unwrap().rect;
        let limit = vec2(DEFAULT_DRAG_THRESHOLD, DEFAULT_DRAG_THRESHOLD);

        let mut machine = DragMachine::default();
        machine.pointer_down(bar.center(), &layout.regions, &mapper());
        assert_eq!(
            machine.pointer_up(bar.center() + limit, &mapper()),
            ChartEvent::Selected(acts[0].id)
        );

        let grab = pos2(bar.right(), bar.center().y);
        machine.pointer_down(grab, &layout.regions, &mapper());
        machine.pointer_move(grab + vec2(DEFAULT_DRAG_THRESHOLD, 0.0), &layout.regions);
        assert!(machine.preview().is_none());
        assert_eq!(
            machine.pointer_up(grab + vec2(DEFAULT_DRAG_THRESHOLD, 0.0), &mapper()),
            ChartEvent::Selected(acts[0].id)
        );

        let beyond = vec2(DEFAULT_DRAG_THRESHOLD + 1.0, 0.0);
        machine.pointer_down(bar.center(), &layout.regions, &mapper());
        assert_eq!(machine.pointer_up(bar.center() + beyond, &mapper()), ChartEvent::None);
    }

    #[test]
    fn end_handle_drag_commits_shifted_date() {
        let acts = activities();
        let layout = layout(&acts);
        let bar = layout.rows[0].bar.as_ref().unwrap().rect;
        let grab = pos2(bar.right(), bar.center().y);
        let mut machine = DragMachine::default();
        machine.pointer_down(grab, &layout.regions, &mapper());
        machine.pointer_move(grab + egui::vec2(30.0, 0.0), &layout.regions);
        assert_eq!(
            machine.preview(),
            Some(DragPreview::Horizontal {
                activity: acts[0].id,
                target: HorizontalTarget::End,
                delta_x: 30.0,
            })
        );
        let (heading, projected) = machine.projected_date(&mapper()).unwrap();
        assert_eq!(heading, "Adjusting End Date");
        assert_eq!(projected, date(2027, 1, 30));
        let event = machine.pointer_up(grab + egui::vec2(30.0, 0.0), &mapper());
        assert_eq!(
            event,
            ChartEvent::CommitDate {
                activity: acts[0].id,
                value: FieldValue::EndDate(date(2027, 1, 30)),
            }
        );
    }

    #[test]
    fn point_drag_targets_numbered_field() {
        let acts = activities();
        let layout = layout(&acts);
        let marker = layout.markers[0].clone();
        let mut machine = DragMachine::default();
        machine.pointer_down(marker.center, &layout.regions, &mapper());
        machine.pointer_move(marker.center - egui::vec2(10.0, 0.0), &layout.regions);
        let event = machine.pointer_up(marker.center - egui::vec2(10.0, 0.0), &mapper());
        let ChartEvent::CommitDate { value, .. } = event else {
            panic!("expected a date commit, got {event:?}");
        };
        assert_eq!(value.field_name(), "decisionPoint1Date");
        assert_eq!(
            value,
            FieldValue::PointDate {
                kind: PointKind::Decision,
                slot: PointSlot::Numbered(1),
                date: date(2026, 5, 22),
            }
        );
    }

    #[test]
    fn reorder_drag_commits_clamped_target() {
        let acts = activities();
        let layout = layout(&acts);
        let grip = layout.row(acts[2].id).unwrap().grip.center();
        let mut machine = DragMachine::default();
        machine.pointer_down(grip, &layout.regions, &mapper());
        let released = grip - egui::vec2(0.0, 5.0 * ROW_HEIGHT);
        machine.pointer_move(released, &layout.regions);
        assert!(matches!(machine.preview(), Some(DragPreview::Vertical { .. })));
        let event = machine.pointer_up(released, &mapper());
        let ChartEvent::CommitReorder(request) = event else {
            panic!("expected a reorder, got {event:?}");
        };
        assert_eq!(request.source_index, 2);
        assert_eq!(request.target_index, 0);
        assert_eq!(
            request.subject,
            ReorderSubject::Activity {
                id: acts[2].id,
                imo: ImoKey::of(&acts[2]),
            }
        );
    }

    #[test]
    fn reorder_under_half_a_row_is_a_no_op() {
        let acts = activities();
        let layout = layout(&acts);
        let grip = layout.row(acts[0].id).unwrap().grip.center();
        let mut machine = DragMachine::default();
        machine.pointer_down(grip, &layout.regions, &mapper());
        machine.pointer_move(grip + egui::vec2(0.0, 10.0), &layout.regions);
        assert_eq!(machine.pointer_up(grip + egui::vec2(0.0, 10.0), &mapper()), ChartEvent::None);
    }

    #[test]
    fn leaving_the_canvas_cancels() {
        let acts = activities();
        let layout = layout(&acts);
        let grip = layout.row(acts[0].id).unwrap().grip.center();
        let mut machine = DragMachine::default();
        machine.pointer_down(grip, &layout.regions, &mapper());
        machine.pointer_move(grip + egui::vec2(0.0, 40.0), &layout.regions);
        assert_eq!(machine.pointer_leave(), ChartEvent::Cancelled);
        assert_eq!(machine.state(), &DragState::Idle);
        assert!(machine.preview().is_none());
    }

    #[test]
    fn pointer_down_is_ignored_mid_gesture() {
        let acts = activities();
        let layout = layout(&acts);
        let grip = layout.row(acts[0].id).unwrap().grip.center();
        let bar = layout.rows[1].bar.as_ref().unwrap().rect.center();
        let mut machine = DragMachine::default();
        machine.pointer_down(grip, &layout.regions, &mapper());
        let before = machine.state().clone();
        machine.pointer_down(bar, &layout.regions, &mapper());
        assert_eq!(machine.state(), &before);
    }
}
