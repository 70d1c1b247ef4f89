pub mod builder;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Local, Utc};
use itertools::Itertools;
use recap_store::{reuse_sources, ArtifactKind, ReuseIndex, RunFolder, Video};

use crate::{
    parser::{normalize_handle, parse_inputs},
    report::{FailureScope, RunReport, SummaryOrigin, TranscriptOrigin, VideoOutcome},
    yt::{ChannelLister, SubtitleDownloader},
    Error, Result, Summarizer,
};

/// How positional inputs are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Inputs are channel handles; uploads from the last `since_days` days are considered
    Channels { since_days: u32 },
    /// Inputs are video ids, processed regardless of age
    VideoIds,
}

/// Lifecycle of one video within a run. Stages only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskStage {
    Pending,
    TranscriptAcquired,
    Summarized,
    Persisted,
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            TaskStage::Pending => "pending",
            TaskStage::TranscriptAcquired => "transcript_acquired",
            TaskStage::Summarized => "summarized",
            TaskStage::Persisted => "persisted",
        };
        f.write_str(stage)
    }
}

/// Per-video working state
#[derive(Debug)]
struct VideoTask {
    video: Video,
    stage: TaskStage,
    transcript: Option<(PathBuf, TranscriptOrigin)>,
    summary: Option<(PathBuf, SummaryOrigin)>,
}

impl VideoTask {
    fn new(video: Video) -> Self {
        Self {
            video,
            stage: TaskStage::Pending,
            transcript: None,
            summary: None,
        }
    }

    fn advance(&mut self, stage: TaskStage) {
        debug_assert!(stage > self.stage);
        self.stage = stage;
    }

    fn into_outcome(self) -> Option<VideoOutcome> {
        let (transcript_path, transcript) = self.transcript?;
        let (summary_path, summary) = self.summary?;
        Some(VideoOutcome {
            video_id: self.video.video_id,
            title: self.video.title,
            transcript,
            transcript_path,
            summary,
            summary_path,
        })
    }
}

/// Everything gathered before any task runs
#[derive(Default)]
struct Candidates {
    videos: Vec<Video>,
    live_skipped: Vec<String>,
    failures: Vec<(FailureScope, Option<TaskStage>, Error)>,
}

/// Turns channel handles or video ids into persisted transcripts and summaries
/// inside a fresh run folder, reusing artifacts from earlier runs.
pub struct RecapProcessor<L, D, S>
where
    L: ChannelLister,
    D: SubtitleDownloader,
    S: Summarizer,
{
    output_root: PathBuf,
    legacy_root: PathBuf,
    lister: L,
    downloader: D,
    summarizer: S,
    model: String,
    prompt: String,
    mode: InputMode,
    include_previous: bool,
}

impl<L, D, S> RecapProcessor<L, D, S>
where
    L: ChannelLister,
    D: SubtitleDownloader,
    S: Summarizer,
{
    const HEADER_RULE_WIDTH: usize = 50;

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Runs once against the current local time
    pub async fn run(&self, inputs: &[String]) -> Result<RunReport> {
        self.run_at(inputs, Local::now()).await
    }

    /// Only [`Error::InvalidArguments`] and [`Error::RunFolderCreationFailed`]
    /// are returned; every other failure lands in the report.
    #[tracing::instrument(skip(self, inputs), fields(mode = ?self.mode, include_previous = self.include_previous))]
    pub async fn run_at(&self, inputs: &[String], now: DateTime<Local>) -> Result<RunReport> {
        let inputs = parse_inputs(inputs);
        if inputs.is_empty() {
            return Err(Error::InvalidArguments(
                "at least one channel handle or video id is required".into(),
            ));
        }

        let run_folder = RunFolder::create(&self.output_root, now.naive_local())
            .map_err(Error::RunFolderCreationFailed)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to create run folder"))?;
        tracing::info!(run_folder = %run_folder.path().display(), "Created run folder");

        let sources = reuse_sources(&self.output_root, &self.legacy_root, Some(run_folder.id()));
        let reuse = ReuseIndex::build(&sources, self.include_previous);

        let mut report = RunReport::new(run_folder.path());

        let candidates = self.collect_videos(&inputs, now.with_timezone(&Utc)).await;
        report.live_skipped = candidates.live_skipped;
        for (scope, stage, error) in candidates.failures {
            report.record_failure(scope, stage, None, error);
        }

        let videos = candidates
            .videos
            .into_iter()
            .unique_by(|v| v.video_id.clone())
            .collect::<Vec<_>>();
        tracing::info!(count = videos.len(), "Processing videos");

        for video in videos {
            let mut task = VideoTask::new(video);

            match self.process_task(&mut task, &run_folder, &reuse).await {
                Ok(()) => {
                    tracing::info!(video_id = %task.video.video_id, "Video processed");
                    if let Some(outcome) = task.into_outcome() {
                        report.outcomes.push(outcome);
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        video_id = %task.video.video_id,
                        stage = %task.stage,
                        error = %error,
                        "Video failed"
                    );
                    report.record_failure(
                        FailureScope::Video(task.video.video_id.clone()),
                        Some(task.stage),
                        task.transcript.as_ref().map(|(_, origin)| *origin),
                        error,
                    );
                }
            }
        }

        Ok(report)
    }

    async fn collect_videos(&self, inputs: &[String], now: DateTime<Utc>) -> Candidates {
        let mut candidates = Candidates::default();
        let mut found = Vec::new();

        match self.mode {
            InputMode::Channels { since_days } => {
                let cutoff = now - Duration::days(i64::from(since_days));
                for handle in inputs.iter().map(|i| normalize_handle(i)).unique() {
                    match self.recent_videos(&handle, cutoff).await {
                        Ok(videos) => found.extend(videos),
                        Err(e) => {
                            tracing::warn!(channel = %handle, error = %e, "Skipping channel");
                            candidates
                                .failures
                                .push((FailureScope::Channel(handle), None, e));
                        }
                    }
                }
            }
            InputMode::VideoIds => {
                for video_id in inputs.iter().unique() {
                    match self.video_with_handle(video_id).await {
                        Ok(video) => found.push(video),
                        Err(e) => {
                            tracing::warn!(video_id = %video_id, error = %e, "Video lookup failed");
                            candidates.failures.push((
                                FailureScope::Video(video_id.clone()),
                                Some(TaskStage::Pending),
                                e,
                            ));
                        }
                    }
                }
            }
        }

        for video in found {
            if video.is_live_content {
                tracing::info!(video_id = %video.video_id, "Skipping live content");
                candidates.live_skipped.push(video.video_id);
            } else {
                candidates.videos.push(video);
            }
        }

        candidates
    }

    /// Uploads of `handle` published at or after `cutoff`
    #[tracing::instrument(skip(self))]
    async fn recent_videos(&self, handle: &str, cutoff: DateTime<Utc>) -> Result<Vec<Video>> {
        let channel_id = self.lister.resolve_channel_id(handle).await?;
        let uploads = self.lister.channel_uploads(&channel_id, cutoff).await?;

        let recent = uploads
            .into_iter()
            .filter(|v| v.published_at >= cutoff)
            .map(|v| Video {
                channel_handle: Some(handle.to_string()),
                ..v
            })
            .collect::<Vec<_>>();

        tracing::info!(count = recent.len(), "Found recent uploads");
        Ok(recent)
    }

    #[tracing::instrument(skip(self))]
    async fn video_with_handle(&self, video_id: &str) -> Result<Video> {
        let mut video = self.lister.video_details(video_id).await?;

        if video.channel_handle.is_none() {
            if let Some(channel_id) = video.channel_id.clone() {
                video.channel_handle = self
                    .lister
                    .channel_handle(&channel_id)
                    .await
                    .inspect_err(|e| tracing::warn!(error = %e, "Channel handle lookup failed"))
                    .unwrap_or(None);
            }
        }

        Ok(video)
    }

    #[tracing::instrument(skip_all, fields(video_id = %task.video.video_id))]
    async fn process_task(
        &self,
        task: &mut VideoTask,
        run_folder: &RunFolder,
        reuse: &ReuseIndex,
    ) -> Result<()> {
        let video_id = task.video.video_id.clone();

        let transcript = match reuse.transcript(&video_id) {
            Some(prior) => {
                tracing::debug!(from = %prior.display(), "Reusing transcript");
                let path = run_folder.copy_artifact(ArtifactKind::Transcript, &video_id, prior)?;
                (path, TranscriptOrigin::Reused)
            }
            None => {
                let text = self.downloader.fetch_transcript(&task.video).await?;
                if text.trim().is_empty() {
                    return Err(Error::NoSubtitlesAvailable(video_id));
                }
                let path = run_folder.write_artifact(ArtifactKind::Transcript, &video_id, &text)?;
                (path, TranscriptOrigin::Downloaded)
            }
        };
        task.transcript = Some(transcript.clone());
        task.advance(TaskStage::TranscriptAcquired);

        if let Some(prior) = reuse.summary(&video_id) {
            tracing::debug!(from = %prior.display(), "Reusing summary");
            let path = run_folder.copy_artifact(ArtifactKind::Summary, &video_id, prior)?;
            task.advance(TaskStage::Summarized);
            task.summary = Some((path, SummaryOrigin::Reused));
            task.advance(TaskStage::Persisted);
            return Ok(());
        }

        let transcript_text = fs::read_to_string(&transcript.0)?;
        if transcript_text.trim().is_empty() {
            return Err(Error::NoSubtitlesAvailable(video_id));
        }

        let response = self
            .summarizer
            .summarize(&self.model, &self.prompt, &transcript_text)
            .await
            .map_err(|e| Error::SummarizationFailed(e.to_string()))?;

        let body = response.summary.trim();
        if body.is_empty() {
            return Err(Error::SummarizationFailed(format!(
                "model returned an empty summary for {video_id}"
            )));
        }
        task.advance(TaskStage::Summarized);

        let contents = self.summary_document(&task.video, body, Local::now());
        let path = run_folder.write_artifact(ArtifactKind::Summary, &video_id, &contents)?;
        task.summary = Some((path, SummaryOrigin::Generated));
        task.advance(TaskStage::Persisted);

        Ok(())
    }

    /// Header lines in fixed order, a rule, then the summary body
    fn summary_document(&self, video: &Video, body: &str, generated_at: DateTime<Local>) -> String {
        let mut doc = String::new();
        doc.push_str(&format!("Video Title: {}\n", video.title));
        if let Some(handle) = &video.channel_handle {
            doc.push_str(&format!("Channel Handle: {handle}\n"));
        }
        doc.push_str(&format!("Video ID: {}\n", video.video_id));
        doc.push_str(&format!(
            "Published At: {}\n",
            video.published_at.format("%Y-%m-%d %H:%M:%S%:z")
        ));
        doc.push_str(&format!(
            "Summary Generated At: {}\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));
        doc.push_str(&"-".repeat(Self::HEADER_RULE_WIDTH));
        doc.push_str("\n\n");
        doc.push_str(body);
        doc.push('\n');
        doc
    }
}
