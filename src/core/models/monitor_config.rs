use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::models::{MatchThresholds, MonitoredRegion, RegionName, ScreenRegion};
use crate::global_constants;

/// Immutable monitor settings, built once at startup from the fixed constants and
/// shared with the monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub regions: Vec<MonitoredRegion>,
    pub template_directory: PathBuf,
    pub output_directory: PathBuf,
    pub thresholds: MatchThresholds,
    pub min_wait_seconds: u64,
    pub max_wait_seconds: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from_constants()
    }
}

impl MonitorConfig {
    pub fn from_constants() -> Self {
        Self {
            regions: vec![
                MonitoredRegion::new(
                    RegionName::Header,
                    ScreenRegion::from_rectangle(global_constants::HEADER_REGION),
                ),
                MonitoredRegion::new(
                    RegionName::Footer,
                    ScreenRegion::from_rectangle(global_constants::FOOTER_REGION),
                ),
                MonitoredRegion::new(
                    RegionName::Logo,
                    ScreenRegion::from_rectangle(global_constants::LOGO_REGION),
                ),
            ],
            template_directory: PathBuf::from(global_constants::DEFAULT_TEMPLATE_DIRECTORY),
            output_directory: PathBuf::from(global_constants::DEFAULT_OUTPUT_DIRECTORY),
            thresholds: MatchThresholds::default(),
            min_wait_seconds: global_constants::MIN_WAIT_SECONDS,
            max_wait_seconds: global_constants::MAX_WAIT_SECONDS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen_names = HashSet::new();

        for monitored in &self.regions {
            if !monitored.region.has_area() {
                anyhow::bail!(
                    "region {} must have a width and height greater than zero",
                    monitored.name
                );
            }
            if !seen_names.insert(monitored.name) {
                anyhow::bail!("region {} is configured more than once", monitored.name);
            }
        }

        if self.min_wait_seconds > self.max_wait_seconds {
            anyhow::bail!(
                "min_wait_seconds ({}) exceeds max_wait_seconds ({})",
                self.min_wait_seconds,
                self.max_wait_seconds
            );
        }

        if self.thresholds.calibration_divisor <= 0.0 {
            anyhow::bail!("calibration divisor must be positive");
        }

        log::debug!(
            "{} {} regions, wait {}-{}s, output {:?}",
            global_constants::LOG_TAG_CONFIG,
            self.regions.len(),
            self.min_wait_seconds,
            self.max_wait_seconds,
            self.output_directory
        );

        Ok(())
    }

    pub fn template_path_for(&self, name: RegionName) -> PathBuf {
        let file_name = match name {
            RegionName::Header => global_constants::HEADER_TEMPLATE_FILE,
            RegionName::Footer => global_constants::FOOTER_TEMPLATE_FILE,
            RegionName::Logo => global_constants::LOGO_TEMPLATE_FILE,
        };

        self.template_directory.join(file_name)
    }
}
