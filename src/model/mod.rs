pub mod activity;
pub mod dataset;
pub mod dotted_id;
pub mod timeline;

pub use activity::{Activity, ActivityPatch, FieldValue, PointKind, PointSlot};
pub use dataset::Dataset;
pub use dotted_id::DottedId;
pub use timeline::TimelineMapper;
