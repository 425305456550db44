//! Rendering-independent timeline core: grouping, layout, hit regions,
//! pointer gestures and reorder renumbering.

pub mod drag;
pub mod hierarchy;
pub mod layout;
pub mod regions;
pub mod renumber;

pub use drag::{ChartEvent, DragMachine, DragPreview, DragState};
pub use layout::{ChartLayout, LayoutParams};
pub use regions::{Region, RegionIndex, RegionKind};
pub use renumber::{renumber, ReorderRequest};
