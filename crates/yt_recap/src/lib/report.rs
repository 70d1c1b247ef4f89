use std::{
    fmt,
    path::{Path, PathBuf},
};

use itertools::Itertools;

use crate::{Error, TaskStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptOrigin {
    Reused,
    Downloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOrigin {
    Reused,
    Generated,
}

/// A video that made it all the way to a persisted summary.
#[derive(Debug, Clone)]
pub struct VideoOutcome {
    pub video_id: String,
    pub title: String,
    pub transcript: TranscriptOrigin,
    pub transcript_path: PathBuf,
    pub summary: SummaryOrigin,
    pub summary_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureScope {
    /// Enumeration of a whole channel failed
    Channel(String),
    Video(String),
}

#[derive(Debug)]
pub struct Failure {
    pub scope: FailureScope,
    /// Last stage the task reached; `None` when it failed before a task existed
    pub stage: Option<TaskStage>,
    /// Set when a transcript reached the run folder before the task failed
    pub transcript: Option<TranscriptOrigin>,
    pub error: Error,
}

#[derive(Debug)]
pub struct RunReport {
    pub run_folder: PathBuf,
    pub outcomes: Vec<VideoOutcome>,
    pub failures: Vec<Failure>,
    pub live_skipped: Vec<String>,
}

impl RunReport {
    pub fn new(run_folder: &Path) -> Self {
        RunReport {
            run_folder: run_folder.to_path_buf(),
            outcomes: Vec::new(),
            failures: Vec::new(),
            live_skipped: Vec::new(),
        }
    }

    pub(crate) fn record_failure(
        &mut self,
        scope: FailureScope,
        stage: Option<TaskStage>,
        transcript: Option<TranscriptOrigin>,
        error: Error,
    ) {
        self.failures.push(Failure {
            scope,
            stage,
            transcript,
            error,
        });
    }

    /// Videos that were attempted: successes plus per-video failures
    pub fn total_considered(&self) -> usize {
        self.outcomes.len() + self.video_failures().count()
    }

    /// Transcripts copied from earlier runs, whether or not a summary followed
    pub fn transcripts_reused(&self) -> usize {
        self.count_transcripts(TranscriptOrigin::Reused)
    }

    pub fn transcripts_downloaded(&self) -> usize {
        self.count_transcripts(TranscriptOrigin::Downloaded)
    }

    pub fn summaries_reused(&self) -> usize {
        self.count_outcomes(|o| o.summary == SummaryOrigin::Reused)
    }

    pub fn summaries_generated(&self) -> usize {
        self.count_outcomes(|o| o.summary == SummaryOrigin::Generated)
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn video_failures(&self) -> impl Iterator<Item = &Failure> {
        self.failures
            .iter()
            .filter(|f| matches!(f.scope, FailureScope::Video(_)))
    }

    /// The failure recorded for `video_id`, if any
    pub fn failure_for(&self, video_id: &str) -> Option<&Failure> {
        self.video_failures()
            .find(|f| f.scope == FailureScope::Video(video_id.to_string()))
    }

    pub fn summarized_ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|o| o.video_id.as_str())
    }

    fn count_transcripts(&self, origin: TranscriptOrigin) -> usize {
        let from_failures = self
            .failures
            .iter()
            .filter(|f| f.transcript == Some(origin))
            .count();
        self.count_outcomes(|o| o.transcript == origin) + from_failures
    }

    fn count_outcomes(&self, predicate: impl Fn(&VideoOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(o)).count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);

        writeln!(f, "{rule}")?;
        writeln!(f, "PROCESSING RESULTS:")?;
        writeln!(f, "Run folder: {}", self.run_folder.display())?;
        writeln!(f, "Videos considered: {}", self.total_considered())?;
        writeln!(f, "Transcripts reused: {}", self.transcripts_reused())?;
        writeln!(f, "Transcripts downloaded: {}", self.transcripts_downloaded())?;
        writeln!(f, "Summaries reused: {}", self.summaries_reused())?;
        writeln!(f, "Summaries generated: {}", self.summaries_generated())?;
        writeln!(f, "Live videos skipped: {}", self.live_skipped.len())?;
        writeln!(f, "Failures: {}", self.failure_count())?;

        if !self.outcomes.is_empty() {
            writeln!(f, "\nSUMMARIZED VIDEO IDs:")?;
            writeln!(f, "{}", self.summarized_ids().join(","))?;
        }

        if !self.failures.is_empty() {
            writeln!(f, "\nFAILURES:")?;
            for failure in &self.failures {
                match &failure.scope {
                    FailureScope::Channel(handle) => {
                        writeln!(f, "  channel {handle}: {}", failure.error)?
                    }
                    FailureScope::Video(video_id) => {
                        writeln!(f, "  video {video_id}: {}", failure.error)?
                    }
                }
            }
        }

        write!(f, "{rule}")
    }
}
