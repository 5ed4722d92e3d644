pub const APPLICATION_NAME: &str = "Screen Compliance Monitor";

pub const LOG_TAG_MAIN: &str = "[MAIN]";
pub const LOG_TAG_MONITOR: &str = "[MONITOR]";
pub const LOG_TAG_CAPTURE: &str = "[CAPTURE]";
pub const LOG_TAG_TEMPLATES: &str = "[TEMPLATES]";
pub const LOG_TAG_SIMILARITY: &str = "[SIMILARITY]";
pub const LOG_TAG_FLAGGED: &str = "[FLAGGED]";
pub const LOG_TAG_CONFIG: &str = "[CONFIG]";

pub const MESSAGE_SCREEN_MATCHES: &str = "Screen matches. No action needed.";
pub const MESSAGE_STOPPED_BY_USER: &str = "Stopped by user.";
pub const MESSAGE_INTERRUPT_RECEIVED: &str = "interrupt received, finishing current step";

pub const ERROR_CONTEXT_NO_MONITOR: &str = "Unable to find a monitor to capture";
pub const ERROR_CONTEXT_CAPTURE_MONITOR: &str = "Unable to capture Monitor";
pub const ERROR_CONTEXT_CREATE_OUTPUT_DIR: &str = "Unable to create flagged output directory";

pub const HEADER_TEMPLATE_FILE: &str = "header.jpg";
pub const FOOTER_TEMPLATE_FILE: &str = "footer.jpg";
pub const LOGO_TEMPLATE_FILE: &str = "logo.jpg";

pub const HEADER_REGION: (u32, u32, u32, u32) = (0, 0, 1920, 100);
pub const FOOTER_REGION: (u32, u32, u32, u32) = (0, 980, 1920, 100);
pub const LOGO_REGION: (u32, u32, u32, u32) = (50, 50, 200, 200);

pub const DEFAULT_TEMPLATE_DIRECTORY: &str = ".";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "flagged";

pub const FLAGGED_FILE_PREFIX: &str = "screen_";
pub const FLAGGED_FILE_EXTENSION: &str = "png";
pub const FLAGGED_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub const MISMATCH_SCORE_BELOW: f64 = 0.65;
pub const CONFIDENT_SCORE_AT_OR_ABOVE: f64 = 0.80;
// Opaque calibration constant, kept numerically as-is.
pub const SCORE_CALIBRATION_DIVISOR: f64 = 9.3;
pub const ADJUSTED_MISMATCH_BELOW: f64 = 0.95;

pub const MIN_WAIT_SECONDS: u64 = 10;
pub const MAX_WAIT_SECONDS: u64 = 30;

pub const STARTUP_BANNER: &str = r#"
╔════════════════════════════════════════════════════════╗
║  Screen Compliance Monitor                             ║
║                                                        ║
║  Sampling the screen at random intervals               ║
║  Mismatching screens are kept as flagged screenshots   ║
║                                                        ║
║  Press Ctrl+C to stop                                  ║
║                                                        ║
╚════════════════════════════════════════════════════════╝
"#;
