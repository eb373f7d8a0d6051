//! Custom TUI widgets.

pub mod activity;
pub mod bundle_popup;
pub mod status_indicator;

pub use activity::{
    ActivityLogWidget, MAX_OUTPUT_LINES, OutputLine, OutputLineType, calculate_visual_line_count,
};
pub use bundle_popup::{BundlePopup, PopupState};
pub use status_indicator::{StatusIndicatorWidget, step_progress};
