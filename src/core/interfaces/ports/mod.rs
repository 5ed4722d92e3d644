mod flagged_capture_store;
mod screen_capturer;

pub use flagged_capture_store::FlaggedCaptureStore;
pub use screen_capturer::ScreenCapturer;
