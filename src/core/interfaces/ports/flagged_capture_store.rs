use std::path::PathBuf;

use anyhow::Result;

use crate::core::models::CaptureBuffer;

pub trait FlaggedCaptureStore: Send + Sync {
    /// Persists a capture from a failed cycle and returns where it was written.
    fn persist_flagged(&self, capture: &CaptureBuffer) -> Result<PathBuf>;
}
