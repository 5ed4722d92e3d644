mod xcap_screen_capturer;

pub use xcap_screen_capturer::XcapScreenCapturer;
