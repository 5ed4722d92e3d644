use anyhow::Result;

use crate::core::models::CaptureBuffer;

pub trait ScreenCapturer: Send + Sync {
    fn capture_full_screen(&self) -> Result<CaptureBuffer>;
}
