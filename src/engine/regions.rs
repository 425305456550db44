//! Pointer-interactive rectangles recorded during layout.

use chrono::NaiveDate;
use egui::{Pos2, Rect};
use uuid::Uuid;

use super::hierarchy::{ImoKey, LoeKey};
use crate::model::{DottedId, PointKind, PointSlot};

/// What an interactive rectangle represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Bar,
    HandleStart,
    HandleEnd,
    Point { kind: PointKind, slot: PointSlot },
    ActivityDragHandle,
    ImoDragHandle,
    LoeDragHandle,
}

impl RegionKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RegionKind::Bar => "bar",
            RegionKind::HandleStart => "handle-start",
            RegionKind::HandleEnd => "handle-end",
            RegionKind::Point { kind: PointKind::Decisive, .. } => "decisivePoint",
            RegionKind::Point { kind: PointKind::Decision, .. } => "decisionPoint",
            RegionKind::ActivityDragHandle => "oai-drag-handle",
            RegionKind::ImoDragHandle => "imo-drag-handle",
            RegionKind::LoeDragHandle => "loe-drag-handle",
        }
    }

    /// Resize handles and point markers start horizontal date drags.
    pub fn is_horizontal_drag(&self) -> bool {
        matches!(
            self,
            RegionKind::HandleStart | RegionKind::HandleEnd | RegionKind::Point { .. }
        )
    }

    pub fn is_vertical_drag(&self) -> bool {
        matches!(
            self,
            RegionKind::ActivityDragHandle | RegionKind::ImoDragHandle | RegionKind::LoeDragHandle
        )
    }
}

/// Hierarchy level a reorder drag operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderLevel {
    Activity,
    Imo,
    Loe,
}

impl ReorderLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ReorderLevel::Activity => "activity",
            ReorderLevel::Imo => "IMO",
            ReorderLevel::Loe => "LOE",
        }
    }
}

/// The entity a reorder handle moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderSubject {
    Activity { id: Uuid, imo: ImoKey },
    Imo(ImoKey),
    Loe(LoeKey),
}

impl ReorderSubject {
    pub fn level(&self) -> ReorderLevel {
        match self {
            ReorderSubject::Activity { .. } => ReorderLevel::Activity,
            ReorderSubject::Imo(_) => ReorderLevel::Imo,
            ReorderSubject::Loe(_) => ReorderLevel::Loe,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ReorderSubject::Activity { id, .. } => id.to_string(),
            ReorderSubject::Imo(key) => key.imo.clone(),
            ReorderSubject::Loe(key) => key.loe.clone(),
        }
    }
}

/// Dotted ids of the hierarchy chain as they were when the layout ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdChain {
    pub objective: DottedId,
    pub loe: DottedId,
    pub imo: DottedId,
}

/// Everything a vertical drag needs to preview and commit a reorder.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderHandle {
    pub subject: ReorderSubject,
    /// Position within the sibling ordering at layout time.
    pub index: usize,
    pub sibling_count: usize,
    /// Height of the dragged row or band, spacing included.
    pub extent: f32,
    pub chain: IdChain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub rect: Rect,
    pub kind: RegionKind,
    /// Owning activity, absent for IMO / LOE handles.
    pub activity: Option<Uuid>,
    /// Date a horizontal drag from this region starts from.
    pub date: Option<NaiveDate>,
    pub label: Option<String>,
    pub reorder: Option<ReorderHandle>,
}

impl Region {
    pub fn for_activity(rect: Rect, kind: RegionKind, activity: Uuid, date: Option<NaiveDate>) -> Self {
        Self {
            rect,
            kind,
            activity: Some(activity),
            date,
            label: None,
            reorder: None,
        }
    }

    pub fn reorder_handle(rect: Rect, kind: RegionKind, handle: ReorderHandle) -> Self {
        let activity = match &handle.subject {
            ReorderSubject::Activity { id, .. } => Some(*id),
            _ => None,
        };
        Self {
            rect,
            kind,
            activity,
            date: None,
            label: None,
            reorder: Some(handle),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Append-only list of regions in draw order; later regions sit on top.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    regions: Vec<Region>,
}

impl RegionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-area or inverted rectangles are not hit-testable and are dropped.
    pub fn push(&mut self, region: Region) {
        if region.rect.width() > 0.0 && region.rect.height() > 0.0 {
            self.regions.push(region);
        }
    }

    /// Topmost region containing `pos`, edges inclusive.
    pub fn hit_test(&self, pos: Pos2) -> Option<&Region> {
        self.regions.iter().rev().find(|r| r.rect.contains(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn later_regions_win_overlaps() {
        let id = Uuid::new_v4();
        let mut index = RegionIndex::new();
        index.push(Region::for_activity(
            Rect::from_min_size(Pos2::new(100.0, 10.0), vec2(200.0, 16.0)),
            RegionKind::Bar,
            id,
            None,
        ));
        index.push(Region::for_activity(
            Rect::from_min_size(Pos2::new(96.0, 10.0), vec2(8.0, 16.0)),
            RegionKind::HandleStart,
            id,
            None,
        ));
        let hit = index.hit_test(Pos2::new(101.0, 15.0)).unwrap();
        assert_eq!(hit.kind, RegionKind::HandleStart);
        let hit = index.hit_test(Pos2::new(150.0, 15.0)).unwrap();
        assert_eq!(hit.kind, RegionKind::Bar);
        assert!(index.hit_test(Pos2::new(150.0, 40.0)).is_none());
    }

    #[test]
    fn degenerate_rectangles_are_not_indexed() {
        let mut index = RegionIndex::new();
        index.push(Region::for_activity(
            Rect::from_min_max(Pos2::new(50.0, 0.0), Pos2::new(50.0, 10.0)),
            RegionKind::Bar,
            Uuid::new_v4(),
            None,
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn tags_match_region_kinds() {
        assert_eq!(RegionKind::ActivityDragHandle.tag(), "oai-drag-handle");
        let star = RegionKind::Point {
            kind: PointKind::Decision,
            slot: PointSlot::Numbered(1),
        };
        assert_eq!(star.tag(), "decisionPoint");
        assert!(star.is_horizontal_drag());
        assert!(!RegionKind::Bar.is_horizontal_drag());
        assert!(RegionKind::LoeDragHandle.is_vertical_drag());
    }
}
