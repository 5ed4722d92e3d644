mod capture_buffer;
mod match_policy;
mod monitor_config;
mod reference_templates;
mod screen_region;

pub use capture_buffer::CaptureBuffer;
pub use match_policy::{CycleOutcome, MatchThresholds, RegionReport, RegionVerdict};
pub use monitor_config::MonitorConfig;
pub use reference_templates::ReferenceTemplates;
pub use screen_region::{MonitoredRegion, RegionName, ScreenRegion};
