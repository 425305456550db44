pub mod activity_panel;
pub mod dialogs;
pub mod gantt_chart;
pub mod narrative;
pub mod theme;
pub mod toolbar;
