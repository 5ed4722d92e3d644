use crate::core::models::RegionName;
use crate::global_constants;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    pub mismatch_below: f64,
    pub confident_at_or_above: f64,
    pub calibration_divisor: f64,
    pub adjusted_mismatch_below: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            mismatch_below: global_constants::MISMATCH_SCORE_BELOW,
            confident_at_or_above: global_constants::CONFIDENT_SCORE_AT_OR_ABOVE,
            calibration_divisor: global_constants::SCORE_CALIBRATION_DIVISOR,
            adjusted_mismatch_below: global_constants::ADJUSTED_MISMATCH_BELOW,
        }
    }
}

impl MatchThresholds {
    pub fn classify(&self, score: f64) -> RegionVerdict {
        if score < self.mismatch_below {
            let adjusted_score = score / self.calibration_divisor;
            if adjusted_score < self.adjusted_mismatch_below {
                return RegionVerdict::Mismatch {
                    score,
                    adjusted_score,
                };
            }
            return RegionVerdict::CalibratedPass {
                score,
                adjusted_score,
            };
        }

        if score >= self.confident_at_or_above {
            return RegionVerdict::ConfidentMatch { score };
        }

        // Scores between the two thresholds are neither flagged nor confirmed.
        RegionVerdict::Indeterminate { score }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionVerdict {
    ConfidentMatch { score: f64 },
    Indeterminate { score: f64 },
    CalibratedPass { score: f64, adjusted_score: f64 },
    Mismatch { score: f64, adjusted_score: f64 },
    MissingTemplate,
}

impl RegionVerdict {
    pub fn fails_cycle(&self) -> bool {
        matches!(
            self,
            RegionVerdict::Mismatch { .. } | RegionVerdict::MissingTemplate
        )
    }

    #[allow(dead_code)]
    pub fn adjusted_score(&self) -> Option<f64> {
        match self {
            RegionVerdict::Mismatch { adjusted_score, .. }
            | RegionVerdict::CalibratedPass { adjusted_score, .. } => Some(*adjusted_score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionReport {
    pub name: RegionName,
    pub verdict: RegionVerdict,
}

/// Result of one evaluation cycle. `reports` stops at the first failing region.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub matched: bool,
    pub reports: Vec<RegionReport>,
}

impl CycleOutcome {
    pub fn failing_region(&self) -> Option<&RegionReport> {
        self.reports.iter().find(|report| report.verdict.fails_cycle())
    }
}
