use anyhow::{Context, Result};

use crate::core::interfaces::ports::ScreenCapturer;
use crate::core::models::CaptureBuffer;
use crate::global_constants::{
    ERROR_CONTEXT_CAPTURE_MONITOR, ERROR_CONTEXT_NO_MONITOR, LOG_TAG_CAPTURE,
};

pub struct XcapScreenCapturer;

impl XcapScreenCapturer {
    pub fn initialize() -> Self {
        log::debug!("{} initializing xcap screen capturer", LOG_TAG_CAPTURE);
        Self
    }

    fn get_primary_monitor(&self) -> Result<xcap::Monitor> {
        let monitors = xcap::Monitor::all().with_context(|| ERROR_CONTEXT_NO_MONITOR)?;

        let mut fallback = None;
        for monitor in monitors {
            if monitor.is_primary().unwrap_or(false) {
                return Ok(monitor);
            }
            fallback.get_or_insert(monitor);
        }

        fallback.with_context(|| ERROR_CONTEXT_NO_MONITOR)
    }

    fn capture_monitor_image(&self, monitor: &xcap::Monitor) -> Result<xcap::image::RgbaImage> {
        monitor
            .capture_image()
            .with_context(|| ERROR_CONTEXT_CAPTURE_MONITOR)
    }

    fn convert_image_to_capture_buffer(
        &self,
        image: xcap::image::RgbaImage,
    ) -> Result<CaptureBuffer> {
        let width_pixels = image.width();
        let height_pixels = image.height();
        let raw_rgba_data = image.into_raw();

        log::info!(
            "{} captured {}x{} screenshot",
            LOG_TAG_CAPTURE,
            width_pixels,
            height_pixels
        );

        CaptureBuffer::build_from_raw_data(width_pixels, height_pixels, raw_rgba_data)
    }
}

impl ScreenCapturer for XcapScreenCapturer {
    fn capture_full_screen(&self) -> Result<CaptureBuffer> {
        log::debug!("{} capturing primary monitor", LOG_TAG_CAPTURE);

        let monitor = self.get_primary_monitor()?;
        let captured_image = self.capture_monitor_image(&monitor)?;

        self.convert_image_to_capture_buffer(captured_image)
    }
}
