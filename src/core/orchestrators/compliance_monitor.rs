use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::core::interfaces::adapters::SimilarityScorer;
use crate::core::interfaces::ports::{FlaggedCaptureStore, ScreenCapturer};
use crate::core::models::{
    CaptureBuffer, CycleOutcome, MonitorConfig, MonitoredRegion, ReferenceTemplates,
    RegionReport, RegionVerdict,
};
use crate::global_constants::{LOG_TAG_MONITOR, MESSAGE_SCREEN_MATCHES};

/// Samples the screen at random intervals and keeps a copy whenever a region stops
/// looking like its reference template.
pub struct ComplianceMonitor {
    config: Arc<MonitorConfig>,
    templates: Arc<ReferenceTemplates>,
    screen_capturer: Arc<dyn ScreenCapturer>,
    similarity_scorer: Arc<dyn SimilarityScorer>,
    flagged_store: Arc<dyn FlaggedCaptureStore>,
}

impl ComplianceMonitor {
    pub fn build(
        config: Arc<MonitorConfig>,
        templates: Arc<ReferenceTemplates>,
        screen_capturer: Arc<dyn ScreenCapturer>,
        similarity_scorer: Arc<dyn SimilarityScorer>,
        flagged_store: Arc<dyn FlaggedCaptureStore>,
    ) -> Self {
        Self {
            config,
            templates,
            screen_capturer,
            similarity_scorer,
            flagged_store,
        }
    }

    /// Compares every configured region of `capture` against its template, stopping at
    /// the first region that fails.
    pub fn evaluate_cycle(&self, capture: &CaptureBuffer) -> Result<CycleOutcome> {
        let mut reports = Vec::with_capacity(self.config.regions.len());

        for monitored in &self.config.regions {
            let verdict = self.evaluate_region(capture, monitored)?;
            self.report_verdict(monitored, &verdict);

            reports.push(RegionReport {
                name: monitored.name,
                verdict,
            });

            if verdict.fails_cycle() {
                return Ok(CycleOutcome {
                    matched: false,
                    reports,
                });
            }
        }

        Ok(CycleOutcome {
            matched: true,
            reports,
        })
    }

    fn evaluate_region(
        &self,
        capture: &CaptureBuffer,
        monitored: &MonitoredRegion,
    ) -> Result<RegionVerdict> {
        let region = &monitored.region;

        let Some(template) =
            self.templates
                .prepared_for(monitored.name, region.width, region.height)
        else {
            return Ok(RegionVerdict::MissingTemplate);
        };

        let screen_region = capture
            .crop_region(region)
            .with_context(|| format!("failed to extract {} region", monitored.name))?
            .to_luma_image()?;

        let score = self
            .similarity_scorer
            .score(&template, &screen_region)
            .with_context(|| format!("failed to score {} region", monitored.name))?;

        Ok(self.config.thresholds.classify(score))
    }

    fn report_verdict(&self, monitored: &MonitoredRegion, verdict: &RegionVerdict) {
        match verdict {
            RegionVerdict::MissingTemplate => {
                log::warn!("{} Template missing: {}", LOG_TAG_MONITOR, monitored.name);
            }
            RegionVerdict::Mismatch { adjusted_score, .. }
            | RegionVerdict::CalibratedPass { adjusted_score, .. } => {
                log::info!(
                    "{} Similarity ({}): {:.2}",
                    LOG_TAG_MONITOR,
                    monitored.name,
                    adjusted_score
                );
            }
            RegionVerdict::ConfidentMatch { .. } => {
                log::info!(
                    "{} Similarity ({}) is above 80. No flagging required.",
                    LOG_TAG_MONITOR,
                    monitored.name
                );
            }
            RegionVerdict::Indeterminate { score } => {
                log::debug!(
                    "{} Similarity ({}) {:.2} is between thresholds, no action taken",
                    LOG_TAG_MONITOR,
                    monitored.name,
                    score
                );
            }
        }
    }

    fn capture_and_evaluate(&self) -> Result<(CaptureBuffer, CycleOutcome)> {
        let capture = self.screen_capturer.capture_full_screen()?;
        let outcome = self.evaluate_cycle(&capture)?;

        Ok((capture, outcome))
    }

    /// Persists the capture when the cycle failed. Returns the written path, if any.
    fn handle_outcome(
        &self,
        capture: &CaptureBuffer,
        outcome: &CycleOutcome,
    ) -> Result<Option<PathBuf>> {
        if outcome.matched {
            log::info!("{} {}", LOG_TAG_MONITOR, MESSAGE_SCREEN_MATCHES);
            return Ok(None);
        }

        if let Some(failing) = outcome.failing_region() {
            log::debug!(
                "{} cycle failed on {} region",
                LOG_TAG_MONITOR,
                failing.name
            );
        }

        let written_path = self.flagged_store.persist_flagged(capture)?;
        Ok(Some(written_path))
    }

    /// Capture, evaluate, and persist on failure. A cancellation that arrives while
    /// capturing or evaluating skips the persistence step.
    pub fn run_cycle(&self, cancel_token: &CancellationToken) -> Result<CycleOutcome> {
        let (capture, outcome) = self.capture_and_evaluate()?;

        if cancel_token.is_cancelled() {
            log::debug!("{} cancelled before handling outcome", LOG_TAG_MONITOR);
            return Ok(outcome);
        }

        self.handle_outcome(&capture, &outcome)?;
        Ok(outcome)
    }

    pub fn draw_wait(&self) -> Duration {
        let seconds = rand::thread_rng()
            .gen_range(self.config.min_wait_seconds..=self.config.max_wait_seconds);

        Duration::from_secs(seconds)
    }

    /// Alternates between a randomized wait and an evaluation until `cancel_token` fires.
    /// Cancellation is observed between blocking steps, never in the middle of one.
    pub async fn run_loop(&self, cancel_token: CancellationToken) -> Result<()> {
        loop {
            let wait = self.draw_wait();
            log::info!("{} Waiting {} seconds...", LOG_TAG_MONITOR, wait.as_secs());

            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }

            self.run_cycle(&cancel_token)?;
        }

        log::info!("{} monitor loop shutting down", LOG_TAG_MONITOR);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FilesystemFlaggedStore, SsimSimilarityScorer};
    use crate::core::models::{RegionName, ScreenRegion};
    use image::{DynamicImage, GrayImage, RgbaImage};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedCapturer {
        capture: CaptureBuffer,
        calls: AtomicUsize,
        cancel_on_call: Option<(usize, CancellationToken)>,
    }

    impl FixedCapturer {
        fn returning(capture: CaptureBuffer) -> Self {
            Self {
                capture,
                calls: AtomicUsize::new(0),
                cancel_on_call: None,
            }
        }

        fn cancelling_on_call(mut self, call: usize, token: CancellationToken) -> Self {
            self.cancel_on_call = Some((call, token));
            self
        }
    }

    impl ScreenCapturer for FixedCapturer {
        fn capture_full_screen(&self) -> Result<CaptureBuffer> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((cancel_call, token)) = &self.cancel_on_call {
                if call == *cancel_call {
                    token.cancel();
                }
            }
            Ok(self.capture.clone())
        }
    }

    struct FailingCapturer;

    impl ScreenCapturer for FailingCapturer {
        fn capture_full_screen(&self) -> Result<CaptureBuffer> {
            anyhow::bail!("capture device unavailable")
        }
    }

    struct ScriptedScorer {
        scores: Mutex<VecDeque<f64>>,
        calls: AtomicUsize,
    }

    impl ScriptedScorer {
        fn with_scores(scores: &[f64]) -> Self {
            Self {
                scores: Mutex::new(scores.iter().copied().collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SimilarityScorer for ScriptedScorer {
        fn score(&self, template: &GrayImage, region: &GrayImage) -> Result<f64> {
            assert_eq!(template.dimensions(), region.dimensions());
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.scores
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted score left"))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        persisted: Mutex<Vec<(u32, u32)>>,
    }

    impl RecordingStore {
        fn persisted_count(&self) -> usize {
            self.persisted.lock().unwrap().len()
        }
    }

    impl FlaggedCaptureStore for RecordingStore {
        fn persist_flagged(&self, capture: &CaptureBuffer) -> Result<PathBuf> {
            self.persisted
                .lock()
                .unwrap()
                .push((capture.width, capture.height));
            Ok(PathBuf::from("flagged/screen_test.png"))
        }
    }

    fn small_screen_config() -> MonitorConfig {
        MonitorConfig {
            regions: vec![
                MonitoredRegion::new(
                    RegionName::Header,
                    ScreenRegion::from_rectangle((0, 0, 64, 8)),
                ),
                MonitoredRegion::new(
                    RegionName::Footer,
                    ScreenRegion::from_rectangle((0, 40, 64, 8)),
                ),
                MonitoredRegion::new(
                    RegionName::Logo,
                    ScreenRegion::from_rectangle((8, 16, 16, 16)),
                ),
            ],
            min_wait_seconds: 0,
            max_wait_seconds: 0,
            ..MonitorConfig::default()
        }
    }

    fn checkerboard_screen() -> RgbaImage {
        RgbaImage::from_fn(64, 48, |x, y| {
            let shade = if ((x / 4) + (y / 4)) % 2 == 0 { 230 } else { 25 };
            image::Rgba([shade, shade / 2, 255 - shade, 255])
        })
    }

    fn templates_cropped_from(screen: &RgbaImage, regions: &[MonitoredRegion]) -> ReferenceTemplates {
        ReferenceTemplates::from_images(regions.iter().map(|monitored| {
            let region = monitored.region;
            let crop = image::imageops::crop_imm(
                screen,
                region.x_position,
                region.y_position,
                region.width,
                region.height,
            )
            .to_image();
            (monitored.name, DynamicImage::ImageRgba8(crop))
        }))
    }

    fn all_templates(config: &MonitorConfig) -> ReferenceTemplates {
        templates_cropped_from(&checkerboard_screen(), &config.regions)
    }

    fn build_monitor(
        config: MonitorConfig,
        templates: ReferenceTemplates,
        capturer: Arc<dyn ScreenCapturer>,
        scorer: Arc<dyn SimilarityScorer>,
        store: Arc<dyn FlaggedCaptureStore>,
    ) -> ComplianceMonitor {
        ComplianceMonitor::build(
            Arc::new(config),
            Arc::new(templates),
            capturer,
            scorer,
            store,
        )
    }

    fn screen_capture() -> CaptureBuffer {
        CaptureBuffer::from_rgba_image(checkerboard_screen())
    }

    #[test]
    fn test_evaluate_cycle_all_confident_scores_match() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let scorer = Arc::new(ScriptedScorer::with_scores(&[0.80, 0.95, 1.0]));
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            scorer.clone(),
            Arc::new(RecordingStore::default()),
        );

        let outcome = monitor.evaluate_cycle(&screen_capture()).unwrap();

        assert!(outcome.matched);
        assert_eq!(outcome.reports.len(), 3);
        assert_eq!(scorer.call_count(), 3);
    }

    #[test]
    fn test_evaluate_cycle_short_circuits_on_first_mismatch() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let scorer = Arc::new(ScriptedScorer::with_scores(&[0.9, 0.3, 1.0]));
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            scorer.clone(),
            Arc::new(RecordingStore::default()),
        );

        let outcome = monitor.evaluate_cycle(&screen_capture()).unwrap();

        assert!(!outcome.matched);
        assert_eq!(scorer.call_count(), 2);
        assert_eq!(outcome.reports.len(), 2);
        let failing = outcome.failing_region().unwrap();
        assert_eq!(failing.name, RegionName::Footer);
        let adjusted = failing.verdict.adjusted_score().unwrap();
        assert!((adjusted - 0.3 / 9.3).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_cycle_indeterminate_band_passes() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let scorer = Arc::new(ScriptedScorer::with_scores(&[0.65, 0.7, 0.79]));
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            scorer.clone(),
            Arc::new(RecordingStore::default()),
        );

        let outcome = monitor.evaluate_cycle(&screen_capture()).unwrap();

        assert!(outcome.matched);
        assert!(outcome
            .reports
            .iter()
            .all(|report| matches!(report.verdict, RegionVerdict::Indeterminate { .. })));
    }

    #[test]
    fn test_evaluate_cycle_missing_template_fails_regardless_of_scores() {
        let config = small_screen_config();
        let templates = templates_cropped_from(&checkerboard_screen(), &config.regions[..2]);
        let scorer = Arc::new(ScriptedScorer::with_scores(&[1.0, 1.0, 1.0]));
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            scorer.clone(),
            Arc::new(RecordingStore::default()),
        );

        let outcome = monitor.evaluate_cycle(&screen_capture()).unwrap();

        assert!(!outcome.matched);
        assert_eq!(scorer.call_count(), 2);
        let failing = outcome.failing_region().unwrap();
        assert_eq!(failing.name, RegionName::Logo);
        assert_eq!(failing.verdict, RegionVerdict::MissingTemplate);
    }

    #[test]
    fn test_evaluate_cycle_region_outside_capture_is_an_error() {
        let config = MonitorConfig::default();
        let templates = all_templates(&small_screen_config());
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            Arc::new(ScriptedScorer::with_scores(&[1.0, 1.0, 1.0])),
            Arc::new(RecordingStore::default()),
        );

        let result = monitor.evaluate_cycle(&screen_capture());

        assert!(result.is_err());
    }

    #[test]
    fn test_run_cycle_persists_only_on_failure() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let store = Arc::new(RecordingStore::default());
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            Arc::new(ScriptedScorer::with_scores(&[0.9, 0.9, 0.9, 0.1])),
            store.clone(),
        );

        let first = monitor.run_cycle(&CancellationToken::new()).unwrap();
        assert!(first.matched);
        assert_eq!(store.persisted_count(), 0);

        let second = monitor.run_cycle(&CancellationToken::new()).unwrap();
        assert!(!second.matched);
        assert_eq!(store.persisted_count(), 1);
        assert_eq!(store.persisted.lock().unwrap()[0], (64, 48));
    }

    #[test]
    fn test_run_cycle_propagates_capture_failure() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FailingCapturer),
            Arc::new(ScriptedScorer::with_scores(&[])),
            Arc::new(RecordingStore::default()),
        );

        assert!(monitor.run_cycle(&CancellationToken::new()).is_err());
    }

    #[test]
    fn test_run_cycle_skips_persistence_once_cancelled() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let cancel_token = CancellationToken::new();
        let capturer = Arc::new(
            FixedCapturer::returning(screen_capture()).cancelling_on_call(1, cancel_token.clone()),
        );
        let store = Arc::new(RecordingStore::default());
        let monitor = build_monitor(
            config,
            templates,
            capturer,
            Arc::new(ScriptedScorer::with_scores(&[0.1])),
            store.clone(),
        );

        let outcome = monitor.run_cycle(&cancel_token).unwrap();

        assert!(!outcome.matched);
        assert_eq!(store.persisted_count(), 0);
    }

    #[test]
    fn test_draw_wait_stays_within_configured_bounds() {
        let config = MonitorConfig::default();
        let templates = all_templates(&small_screen_config());
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FailingCapturer),
            Arc::new(ScriptedScorer::with_scores(&[])),
            Arc::new(RecordingStore::default()),
        );

        for _ in 0..200 {
            let wait = monitor.draw_wait().as_secs();
            assert!((10..=30).contains(&wait), "wait was {}", wait);
        }
    }

    #[test]
    fn test_identical_screen_matches_and_writes_nothing() {
        let output_directory = std::env::temp_dir().join(format!(
            "screen-compliance-monitor-identical-{}",
            std::process::id()
        ));
        std::fs::remove_dir_all(&output_directory).ok();
        let config = MonitorConfig {
            output_directory: output_directory.clone(),
            ..small_screen_config()
        };
        let templates = all_templates(&config);
        let store = Arc::new(FilesystemFlaggedStore::new(&output_directory));
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(screen_capture())),
            Arc::new(SsimSimilarityScorer::new()),
            store,
        );

        let outcome = monitor.run_cycle(&CancellationToken::new()).unwrap();

        assert!(outcome.matched);
        assert!(outcome
            .reports
            .iter()
            .all(|report| matches!(report.verdict, RegionVerdict::ConfidentMatch { .. })));
        assert!(!output_directory.exists());
    }

    #[test]
    fn test_blank_header_is_flagged_and_written_to_disk() {
        let output_directory = std::env::temp_dir().join(format!(
            "screen-compliance-monitor-blank-header-{}",
            std::process::id()
        ));
        std::fs::remove_dir_all(&output_directory).ok();
        let config = MonitorConfig {
            output_directory: output_directory.clone(),
            ..small_screen_config()
        };
        let templates = all_templates(&config);
        let mut screen = checkerboard_screen();
        for y in 0..8 {
            for x in 0..64 {
                screen.put_pixel(x, y, image::Rgba([0, 0, 0, 255]));
            }
        }
        let store = Arc::new(FilesystemFlaggedStore::new(&output_directory));
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FixedCapturer::returning(CaptureBuffer::from_rgba_image(screen))),
            Arc::new(SsimSimilarityScorer::new()),
            store,
        );

        let outcome = monitor.run_cycle(&CancellationToken::new()).unwrap();

        assert!(!outcome.matched);
        assert_eq!(outcome.reports.len(), 1);
        let header = &outcome.reports[0];
        assert_eq!(header.name, RegionName::Header);
        assert!(header.verdict.adjusted_score().unwrap() < 0.95);

        let written: Vec<_> = std::fs::read_dir(&output_directory)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("screen_"));
        assert!(written[0].ends_with(".png"));
        assert_eq!(written[0].len(), "screen_YYYYMMDD_HHMMSS.png".len());
        std::fs::remove_dir_all(&output_directory).ok();
    }

    #[tokio::test]
    async fn test_run_loop_returns_immediately_when_already_cancelled() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let capturer = Arc::new(FixedCapturer::returning(screen_capture()));
        let monitor = build_monitor(
            config,
            templates,
            capturer.clone(),
            Arc::new(ScriptedScorer::with_scores(&[])),
            Arc::new(RecordingStore::default()),
        );
        let cancel_token = CancellationToken::new();
        cancel_token.cancel();

        monitor.run_loop(cancel_token).await.unwrap();

        assert_eq!(capturer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_loop_flags_until_cancelled_between_steps() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let cancel_token = CancellationToken::new();
        let capturer = Arc::new(
            FixedCapturer::returning(screen_capture()).cancelling_on_call(2, cancel_token.clone()),
        );
        let store = Arc::new(RecordingStore::default());
        let monitor = build_monitor(
            config,
            templates,
            capturer.clone(),
            Arc::new(ScriptedScorer::with_scores(&[0.1, 0.1])),
            store.clone(),
        );

        monitor.run_loop(cancel_token).await.unwrap();

        assert_eq!(capturer.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.persisted_count(), 1);
    }

    #[tokio::test]
    async fn test_run_loop_propagates_capture_failure() {
        let config = small_screen_config();
        let templates = all_templates(&config);
        let monitor = build_monitor(
            config,
            templates,
            Arc::new(FailingCapturer),
            Arc::new(ScriptedScorer::with_scores(&[])),
            Arc::new(RecordingStore::default()),
        );

        let result = monitor.run_loop(CancellationToken::new()).await;

        assert!(result.is_err());
    }
}
