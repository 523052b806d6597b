//! Progress reporting for the two conversion phases.
//!
//! Font analysis covers the first 70% of a run and conversion the last
//! 30%, so `percentage` never goes backwards between phases.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CallbackError, Error, Result};

/// Share of the overall percentage taken by the analysis phase.
pub const ANALYSIS_SHARE: f32 = 70.0;

/// Which pass over the document is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessPhase {
    /// Collecting font sizes
    Analysis,
    /// Emitting Markdown
    Conversion,
}

impl fmt::Display for ProcessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessPhase::Analysis => write!(f, "analysis"),
            ProcessPhase::Conversion => write!(f, "conversion"),
        }
    }
}

/// One progress checkpoint, reported after each page of each phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub phase: ProcessPhase,
    /// Page just finished (1-indexed)
    pub current_page: u32,
    pub total_pages: u32,
    /// Progress of the whole run, 0-100
    pub percentage: f32,
    /// Progress within the current phase, 0-100
    pub phase_percentage: f32,
    pub message: String,
}

impl ProgressInfo {
    /// Build a checkpoint, deriving both percentages from the page counts.
    pub fn new(
        phase: ProcessPhase,
        current_page: u32,
        total_pages: u32,
        message: impl Into<String>,
    ) -> Self {
        let (percentage, phase_percentage) = percentages(phase, current_page, total_pages);
        Self {
            phase,
            current_page,
            total_pages,
            percentage,
            phase_percentage,
            message: message.into(),
        }
    }
}

fn percentages(phase: ProcessPhase, current: u32, total: u32) -> (f32, f32) {
    if total == 0 {
        let overall = match phase {
            ProcessPhase::Analysis => ANALYSIS_SHARE,
            ProcessPhase::Conversion => 100.0,
        };
        return (overall, 100.0);
    }

    let current = current.min(total) as f32;
    let total = total as f32;
    let phase_pct = 100.0 * current / total;
    let overall = match phase {
        ProcessPhase::Analysis => ANALYSIS_SHARE * current / total,
        ProcessPhase::Conversion => {
            (ANALYSIS_SHARE * total + (100.0 - ANALYSIS_SHARE) * current) / total
        }
    };
    (overall, phase_pct)
}

/// Hands checkpoints to a caller's callback and turns its errors into
/// [`Error::Callback`].
pub struct ProgressReporter<F> {
    callback: F,
    total_pages: u32,
    last_percentage: f32,
}

impl<F> ProgressReporter<F>
where
    F: FnMut(&ProgressInfo) -> std::result::Result<(), CallbackError>,
{
    pub fn new(callback: F, total_pages: u32) -> Self {
        Self {
            callback,
            total_pages,
            last_percentage: 0.0,
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Report that `page` of `phase` is done.
    pub fn page_done(&mut self, phase: ProcessPhase, page: u32, message: impl Into<String>) -> Result<()> {
        let mut info = ProgressInfo::new(phase, page, self.total_pages, message);
        info.percentage = info.percentage.max(self.last_percentage);
        self.last_percentage = info.percentage;

        log::debug!(
            "{} {}/{} ({:.1}%)",
            info.phase,
            info.current_page,
            info.total_pages,
            info.percentage
        );
        (self.callback)(&info).map_err(Error::Callback)
    }
}

/// A callback that ignores progress.
pub fn ignore_progress(_: &ProgressInfo) -> std::result::Result<(), CallbackError> {
    Ok(())
}
