use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::core::interfaces::ports::FlaggedCaptureStore;
use crate::core::models::CaptureBuffer;
use crate::global_constants::{
    ERROR_CONTEXT_CREATE_OUTPUT_DIR, FLAGGED_FILE_EXTENSION, FLAGGED_FILE_PREFIX,
    FLAGGED_TIMESTAMP_FORMAT, LOG_TAG_FLAGGED,
};

/// Writes flagged captures as timestamped PNG files. Files are never removed.
pub struct FilesystemFlaggedStore {
    output_directory: PathBuf,
}

impl FilesystemFlaggedStore {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn file_path_for(&self, timestamp: &DateTime<Local>) -> PathBuf {
        let file_name = format!(
            "{}{}.{}",
            FLAGGED_FILE_PREFIX,
            timestamp.format(FLAGGED_TIMESTAMP_FORMAT),
            FLAGGED_FILE_EXTENSION
        );

        self.output_directory.join(file_name)
    }

    /// Same-second writes share a file name; the later write replaces the earlier one.
    pub fn persist_flagged_at(
        &self,
        capture: &CaptureBuffer,
        timestamp: &DateTime<Local>,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_directory)
            .with_context(|| ERROR_CONTEXT_CREATE_OUTPUT_DIR)?;

        let file_path = self.file_path_for(timestamp);
        let rgb_image = capture.to_rgb_image()?;

        rgb_image
            .save(&file_path)
            .with_context(|| format!("failed to write flagged capture {:?}", file_path))?;

        log::warn!(
            "{} Screenshot saved: {}",
            LOG_TAG_FLAGGED,
            file_path.display()
        );
        Ok(file_path)
    }
}

impl FlaggedCaptureStore for FilesystemFlaggedStore {
    fn persist_flagged(&self, capture: &CaptureBuffer) -> Result<PathBuf> {
        self.persist_flagged_at(capture, &Local::now())
    }
}
