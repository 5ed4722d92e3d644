use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::core::models::ScreenRegion;

const BYTES_PER_PIXEL: usize = 4;

/// Full-screen raster for a single evaluation cycle, stored as tightly packed RGBA.
#[derive(Clone)]
pub struct CaptureBuffer {
    pub width: u32,
    pub height: u32,
    raw_data: Vec<u8>,
}

impl std::fmt::Debug for CaptureBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl CaptureBuffer {
    pub fn build_from_raw_data(
        width_pixels: u32,
        height_pixels: u32,
        raw_rgba_data: Vec<u8>,
    ) -> Result<Self> {
        let expected_length = width_pixels as usize * height_pixels as usize * BYTES_PER_PIXEL;
        if raw_rgba_data.len() != expected_length {
            anyhow::bail!(
                "RGBA buffer holds {} bytes, expected {} for {}x{}",
                raw_rgba_data.len(),
                expected_length,
                width_pixels,
                height_pixels
            );
        }

        log::debug!(
            "[CAPTURE_BUFFER] building buffer: {}x{}",
            width_pixels,
            height_pixels
        );

        Ok(Self {
            width: width_pixels,
            height: height_pixels,
            raw_data: raw_rgba_data,
        })
    }

    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let width = image.width();
        let height = image.height();

        Self {
            width,
            height,
            raw_data: image.into_raw(),
        }
    }

    #[allow(dead_code)]
    pub fn raw_data(&self) -> &[u8] {
        &self.raw_data
    }

    pub fn crop_region(&self, region: &ScreenRegion) -> Result<Self> {
        if !region.has_area() {
            anyhow::bail!("Crop dimensions must be greater than zero");
        }

        if !region.lies_within(self.width, self.height) {
            anyhow::bail!(
                "Region {} lies outside the {}x{} capture",
                region,
                self.width,
                self.height
            );
        }

        log::debug!(
            "[CAPTURE_BUFFER] Cropping region: {} from {}x{}",
            region,
            self.width,
            self.height
        );

        let stride = self.width as usize * BYTES_PER_PIXEL;
        let row_length = region.width as usize * BYTES_PER_PIXEL;
        let mut cropped_data = Vec::with_capacity(row_length * region.height as usize);

        for row in region.y_position..(region.y_position + region.height) {
            let row_start = row as usize * stride + region.x_position as usize * BYTES_PER_PIXEL;
            cropped_data.extend_from_slice(&self.raw_data[row_start..row_start + row_length]);
        }

        Self::build_from_raw_data(region.width, region.height, cropped_data)
    }

    pub fn to_rgba_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.raw_data.clone())
            .context("Failed to create image from raw data")
    }

    pub fn to_luma_image(&self) -> Result<GrayImage> {
        Ok(DynamicImage::ImageRgba8(self.to_rgba_image()?).to_luma8())
    }

    /// Drops the alpha channel for persistence formats that expect plain RGB.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        Ok(DynamicImage::ImageRgba8(self.to_rgba_image()?).to_rgb8())
    }
}
