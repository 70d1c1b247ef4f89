mod mocks;

use std::{fs, path::Path};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mocks::{
    channel_lister::MockChannelLister, subtitle_downloader::MockSubtitleDownloader,
    summarizer::MockSummarizer,
};
use tempfile::TempDir;
use yt_recap::{
    Error, FailureScope, RecapProcessor, RecapProcessorBuilder, SummaryOrigin, TaskStage,
    TranscriptOrigin, Video,
};

type TestProcessor = RecapProcessor<MockChannelLister, MockSubtitleDownloader, MockSummarizer>;

const PROMPT: &str = "Summarize the key points.";

fn video(video_id: &str, days_ago: i64) -> Video {
    Video {
        video_id: video_id.to_string(),
        title: format!("Video {video_id}"),
        published_at: Utc::now() - Duration::days(days_ago),
        ..Default::default()
    }
}

fn local(hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 10, 19, hour, minute, 0)
        .earliest()
        .unwrap()
}

fn inputs(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

fn builder(tmp: &TempDir) -> RecapProcessorBuilder {
    RecapProcessorBuilder::new(tmp.path().join("processed"))
        .legacy_root(tmp.path().join("legacy"))
        .model("mock-model")
        .prompt(PROMPT)
}

fn build_processor(
    tmp: &TempDir,
    lister: MockChannelLister,
    downloader: MockSubtitleDownloader,
    summarizer: MockSummarizer,
) -> TestProcessor {
    builder(tmp)
        .video_ids()
        .channel_lister(lister)
        .subtitle_downloader(downloader)
        .summarizer(summarizer)
        .build()
}

fn two_video_lister() -> MockChannelLister {
    MockChannelLister::new().with_channel(
        "@rustlang",
        "UC_rust",
        vec![video("abc123", 3), video("def456", 4)],
    )
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_video_ids_create_transcripts_and_summaries() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader =
        MockSubtitleDownloader::new(&[("abc123", "first transcript"), ("def456", "second transcript")]);
    let summarizer = MockSummarizer::new("## Summary\nKey points.");
    let summarizer_calls = summarizer.calls.clone();

    let processor = build_processor(&tmp, two_video_lister(), downloader, summarizer);
    let report = processor.run(&inputs(&["abc123,def456"])).await.unwrap();

    assert_eq!(report.total_considered(), 2);
    assert_eq!(report.transcripts_downloaded(), 2);
    assert_eq!(report.summaries_generated(), 2);
    assert_eq!(report.failure_count(), 0);

    let run = &report.run_folder;
    let mut transcripts = fs::read_dir(run.join("transcripts"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    transcripts.sort();
    assert_eq!(
        transcripts,
        vec!["abc123_transcript.txt", "def456_transcript.txt"]
    );

    let mut summaries = fs::read_dir(run.join("summaries"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    summaries.sort();
    assert_eq!(summaries, vec!["abc123_summary.md", "def456_summary.md"]);

    assert_eq!(
        read(&run.join("transcripts/abc123_transcript.txt")),
        "first transcript"
    );

    let calls = summarizer_calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    let (model, prompt, transcript) = &calls[0];
    assert_eq!(model, "mock-model");
    assert_eq!(prompt, PROMPT);
    assert_eq!(transcript, "first transcript");
}

#[tokio::test]
async fn test_summary_header_order() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);
    let summarizer = MockSummarizer::new("Body of the summary.");

    let processor = build_processor(&tmp, two_video_lister(), downloader, summarizer);
    let report = processor.run(&inputs(&["abc123"])).await.unwrap();

    let outcome = &report.outcomes[0];
    let summary = read(&outcome.summary_path);
    let lines = summary.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "Video Title: Video abc123");
    assert_eq!(lines[1], "Channel Handle: @rustlang");
    assert_eq!(lines[2], "Video ID: abc123");
    assert!(lines[3].starts_with("Published At: "), "{}", lines[3]);
    assert!(lines[4].starts_with("Summary Generated At: "), "{}", lines[4]);
    assert_eq!(lines[5], "-".repeat(50));
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "Body of the summary.");
}

#[tokio::test]
async fn test_duplicate_ids_processed_once() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);
    let downloader_calls = downloader.calls.clone();
    let summarizer = MockSummarizer::new("summary");

    let processor = build_processor(&tmp, two_video_lister(), downloader, summarizer);
    let report = processor
        .run(&inputs(&["abc123, abc123", ",abc123"]))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(downloader_calls.lock().unwrap().len(), 1);
}

// ─── Reuse ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_include_previous_second_run_makes_no_llm_calls() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader =
        MockSubtitleDownloader::new(&[("abc123", "first transcript"), ("def456", "second transcript")]);
    let downloader_calls = downloader.calls.clone();
    let summarizer = MockSummarizer::new("## Summary\nKey points.");
    let summarizer_calls = summarizer.calls.clone();

    let processor = builder(&tmp)
        .video_ids()
        .include_previous(true)
        .channel_lister(two_video_lister())
        .subtitle_downloader(downloader)
        .summarizer(summarizer)
        .build();
    let ids = inputs(&["abc123,def456"]);

    let first = processor.run_at(&ids, local(8, 30)).await.unwrap();
    assert_eq!(summarizer_calls.lock().unwrap().len(), 2);
    assert_eq!(downloader_calls.lock().unwrap().len(), 2);

    let second = processor.run_at(&ids, local(9, 15)).await.unwrap();
    assert_eq!(summarizer_calls.lock().unwrap().len(), 2, "no new LLM calls");
    assert_eq!(downloader_calls.lock().unwrap().len(), 2, "no new downloads");

    assert_ne!(first.run_folder, second.run_folder);
    assert_eq!(second.transcripts_reused(), 2);
    assert_eq!(second.summaries_reused(), 2);

    for video_id in ["abc123", "def456"] {
        let name = format!("summaries/{video_id}_summary.md");
        assert_eq!(
            fs::read(first.run_folder.join(&name)).unwrap(),
            fs::read(second.run_folder.join(&name)).unwrap(),
            "summary for {video_id} should be byte-identical"
        );
    }
}

#[tokio::test]
async fn test_transcript_reuse_without_include_previous_still_summarizes() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);
    let downloader_calls = downloader.calls.clone();
    let summarizer = MockSummarizer::new("summary");
    let summarizer_calls = summarizer.calls.clone();

    let processor = build_processor(&tmp, two_video_lister(), downloader, summarizer);
    let ids = inputs(&["abc123"]);

    processor.run_at(&ids, local(8, 30)).await.unwrap();
    let second = processor.run_at(&ids, local(8, 31)).await.unwrap();

    assert_eq!(downloader_calls.lock().unwrap().len(), 1);
    assert_eq!(summarizer_calls.lock().unwrap().len(), 2);
    assert_eq!(second.outcomes[0].transcript, TranscriptOrigin::Reused);
    assert_eq!(second.outcomes[0].summary, SummaryOrigin::Generated);
}

#[tokio::test]
async fn test_blank_prior_transcript_is_downloaded_again() {
    let tmp = tempfile::tempdir().unwrap();
    let legacy = tmp.path().join("legacy/transcripts");
    fs::create_dir_all(&legacy).unwrap();
    fs::write(legacy.join("abc123_transcript.txt"), "  \n").unwrap();
    fs::write(legacy.join("def456_transcript.txt"), "\n\n").unwrap();

    // abc123 has captions to fall back on, def456 has none
    let downloader = MockSubtitleDownloader::new(&[("abc123", "fresh transcript")]);
    let downloader_calls = downloader.calls.clone();
    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::new("summary"),
    );
    let report = processor.run(&inputs(&["abc123,def456"])).await.unwrap();

    assert_eq!(downloader_calls.lock().unwrap().len(), 2);
    assert_eq!(report.outcomes[0].transcript, TranscriptOrigin::Downloaded);
    assert_eq!(
        read(&report.outcomes[0].transcript_path),
        "fresh transcript"
    );

    let failure = report.failure_for("def456").unwrap();
    assert!(matches!(failure.error, Error::NoSubtitlesAvailable(_)));
    assert_eq!(failure.transcript, None);

    let run = &report.run_folder;
    assert!(!run.join("transcripts/def456_transcript.txt").exists());
    assert!(!run.join("summaries/def456_summary.md").exists());
}

#[tokio::test]
async fn test_legacy_layout_is_reused() {
    let tmp = tempfile::tempdir().unwrap();
    let legacy = tmp.path().join("legacy");
    fs::create_dir_all(legacy.join("transcripts")).unwrap();
    fs::create_dir_all(legacy.join("summaries")).unwrap();
    fs::write(legacy.join("transcripts/abc123_transcript.txt"), "legacy transcript").unwrap();
    fs::write(legacy.join("summaries/abc123_summary.md"), "legacy summary").unwrap();

    // nothing available to download: only the legacy copy can satisfy the task
    let downloader = MockSubtitleDownloader::new(&[]);
    let summarizer = MockSummarizer::new("fresh summary");
    let summarizer_calls = summarizer.calls.clone();

    let processor = builder(&tmp)
        .video_ids()
        .include_previous(true)
        .channel_lister(two_video_lister())
        .subtitle_downloader(downloader)
        .summarizer(summarizer)
        .build();
    let report = processor.run(&inputs(&["abc123"])).await.unwrap();

    assert_eq!(report.failure_count(), 0);
    assert_eq!(report.transcripts_reused(), 1);
    assert_eq!(report.summaries_reused(), 1);
    assert!(summarizer_calls.lock().unwrap().is_empty());
    assert_eq!(read(&report.outcomes[0].summary_path), "legacy summary");
}

#[tokio::test]
async fn test_newest_run_folder_wins_over_older_and_legacy() {
    let tmp = tempfile::tempdir().unwrap();
    let processed = tmp.path().join("processed");
    for (folder, text) in [
        ("101825_0900", "older run"),
        ("101825_0900_2", "newer run"),
    ] {
        let dir = processed.join(folder).join("transcripts");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("abc123_transcript.txt"), text).unwrap();
    }
    let legacy = tmp.path().join("legacy/transcripts");
    fs::create_dir_all(&legacy).unwrap();
    fs::write(legacy.join("abc123_transcript.txt"), "legacy").unwrap();

    let summarizer = MockSummarizer::new("summary");
    let summarizer_calls = summarizer.calls.clone();
    let processor = build_processor(
        &tmp,
        two_video_lister(),
        MockSubtitleDownloader::new(&[]),
        summarizer,
    );
    processor.run_at(&inputs(&["abc123"]), local(8, 30)).await.unwrap();

    let calls = summarizer_calls.lock().unwrap();
    assert_eq!(calls[0].2, "newer run");
}

// ─── Channel mode ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_channel_mode_filters_by_days() {
    let tmp = tempfile::tempdir().unwrap();
    let lister = MockChannelLister::new().with_channel(
        "@rustlang",
        "UC_rust",
        vec![video("recent", 2), video("stale", 10)],
    );
    let downloader = MockSubtitleDownloader::new(&[("recent", "t1"), ("stale", "t2")]);
    let downloader_calls = downloader.calls.clone();

    let processor = builder(&tmp)
        .since_days(5)
        .channel_lister(lister)
        .subtitle_downloader(downloader)
        .summarizer(MockSummarizer::new("summary"))
        .build();
    // handle without the leading @ is normalized
    let report = processor.run(&inputs(&["rustlang"])).await.unwrap();

    assert_eq!(report.summarized_ids().collect::<Vec<_>>(), vec!["recent"]);
    assert_eq!(*downloader_calls.lock().unwrap(), vec!["recent".to_string()]);

    let summary = read(&report.outcomes[0].summary_path);
    assert!(summary.contains("Channel Handle: @rustlang\n"));
}

#[tokio::test]
async fn test_unknown_channel_is_not_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "t1"), ("def456", "t2")]);

    let processor = builder(&tmp)
        .since_days(7)
        .channel_lister(two_video_lister())
        .subtitle_downloader(downloader)
        .summarizer(MockSummarizer::new("summary"))
        .build();
    let report = processor
        .run(&inputs(&["@missing, @rustlang"]))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failure_count(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.scope, FailureScope::Channel("@missing".into()));
    assert!(matches!(failure.error, Error::ChannelNotFound(_)));
}

#[tokio::test]
async fn test_quota_exceeded_is_reported_per_channel() {
    let tmp = tempfile::tempdir().unwrap();

    let processor = builder(&tmp)
        .since_days(1)
        .channel_lister(MockChannelLister::failing("daily limit"))
        .subtitle_downloader(MockSubtitleDownloader::new(&[]))
        .summarizer(MockSummarizer::new("summary"))
        .build();
    let report = processor.run(&inputs(&["@a", ",@b"])).await.unwrap();

    assert_eq!(report.failure_count(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f.error, Error::QuotaExceeded(_))));
    assert!(report.run_folder.is_dir());
}

#[tokio::test]
async fn test_live_content_is_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let live = Video {
        is_live_content: true,
        ..video("live1", 0)
    };
    let lister = MockChannelLister::new().with_channel("@news", "UC_news", vec![live, video("vod1", 1)]);
    let downloader = MockSubtitleDownloader::new(&[("live1", "t"), ("vod1", "t")]);
    let downloader_calls = downloader.calls.clone();

    let processor = builder(&tmp)
        .since_days(3)
        .channel_lister(lister)
        .subtitle_downloader(downloader)
        .summarizer(MockSummarizer::new("summary"))
        .build();
    let report = processor.run(&inputs(&["@news"])).await.unwrap();

    assert_eq!(report.live_skipped, vec!["live1".to_string()]);
    assert_eq!(*downloader_calls.lock().unwrap(), vec!["vod1".to_string()]);
}

// ─── Per-video failures ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_captions_fail_only_that_video() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("def456", "transcript")]);

    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::new("summary"),
    );
    let report = processor.run(&inputs(&["abc123,def456"])).await.unwrap();

    assert_eq!(report.summarized_ids().collect::<Vec<_>>(), vec!["def456"]);
    let failure = report.failure_for("abc123").unwrap();
    assert!(matches!(failure.error, Error::NoSubtitlesAvailable(ref id) if id == "abc123"));
    assert_eq!(failure.stage, Some(TaskStage::Pending));

    let run = &report.run_folder;
    assert!(!run.join("transcripts/abc123_transcript.txt").exists());
    assert!(!run.join("summaries/abc123_summary.md").exists());
    assert!(run.join("summaries/def456_summary.md").exists());
}

#[tokio::test]
async fn test_summarization_failure_keeps_transcript() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);

    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::failing("rate limited"),
    );
    let report = processor.run(&inputs(&["abc123"])).await.unwrap();

    let failure = report.failure_for("abc123").unwrap();
    assert!(matches!(failure.error, Error::SummarizationFailed(_)));
    assert_eq!(failure.stage, Some(TaskStage::TranscriptAcquired));

    let run = &report.run_folder;
    assert!(run.join("transcripts/abc123_transcript.txt").exists());
    assert!(!run.join("summaries/abc123_summary.md").exists());
}

#[tokio::test]
async fn test_transcripts_of_failed_summaries_are_counted() {
    let tmp = tempfile::tempdir().unwrap();
    let legacy = tmp.path().join("legacy/transcripts");
    fs::create_dir_all(&legacy).unwrap();
    fs::write(legacy.join("def456_transcript.txt"), "legacy transcript").unwrap();

    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);
    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::failing("rate limited"),
    );
    let report = processor.run(&inputs(&["abc123,def456"])).await.unwrap();

    assert_eq!(report.failure_count(), 2);
    assert_eq!(report.transcripts_downloaded(), 1);
    assert_eq!(report.transcripts_reused(), 1);
    assert_eq!(
        report.failure_for("abc123").unwrap().transcript,
        Some(TranscriptOrigin::Downloaded)
    );
    assert_eq!(report.summaries_generated(), 0);
}

#[tokio::test]
async fn test_empty_summary_is_a_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);

    let processor = build_processor(&tmp, two_video_lister(), downloader, MockSummarizer::new("  \n"));
    let report = processor.run(&inputs(&["abc123"])).await.unwrap();

    assert!(matches!(
        report.failure_for("abc123").unwrap().error,
        Error::SummarizationFailed(_)
    ));
    assert!(!report.run_folder.join("summaries/abc123_summary.md").exists());
}

#[tokio::test]
async fn test_unknown_video_id_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::failing("should not be called");
    let downloader_calls = downloader.calls.clone();

    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::new("summary"),
    );
    let report = processor.run(&inputs(&["nope"])).await.unwrap();

    assert!(matches!(
        report.failure_for("nope").unwrap().error,
        Error::VideoNotFound(_)
    ));
    assert_eq!(report.total_considered(), 1);
    assert!(downloader_calls.lock().unwrap().is_empty());
}

// ─── Fatal errors ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_inputs_are_invalid_arguments() {
    let tmp = tempfile::tempdir().unwrap();
    let processor = build_processor(
        &tmp,
        two_video_lister(),
        MockSubtitleDownloader::new(&[]),
        MockSummarizer::new("summary"),
    );

    let result = processor.run(&inputs(&[" , ", ""])).await;
    assert!(matches!(result, Err(Error::InvalidArguments(_))));
    assert!(!tmp.path().join("processed").exists());
}

#[tokio::test]
async fn test_run_folder_failure_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    // output root is a regular file, so no run folder can be created under it
    fs::write(tmp.path().join("processed"), "not a directory").unwrap();

    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);
    let downloader_calls = downloader.calls.clone();
    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::new("summary"),
    );

    let err = processor.run(&inputs(&["abc123"])).await.unwrap_err();
    assert!(matches!(err, Error::RunFolderCreationFailed(_)));
    assert!(err.is_fatal());
    assert!(downloader_calls.lock().unwrap().is_empty());
}

// ─── Run folders ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_same_minute_runs_get_distinct_folders() {
    let tmp = tempfile::tempdir().unwrap();
    let downloader = MockSubtitleDownloader::new(&[("abc123", "transcript")]);
    let processor = build_processor(
        &tmp,
        two_video_lister(),
        downloader,
        MockSummarizer::new("summary"),
    );
    let ids = inputs(&["abc123"]);

    let first = processor.run_at(&ids, local(7, 5)).await.unwrap();
    let second = processor.run_at(&ids, local(7, 5)).await.unwrap();
    let third = processor.run_at(&ids, local(7, 5)).await.unwrap();

    let name = |p: &Path| p.file_name().unwrap().to_str().unwrap().to_string();
    assert_eq!(name(&first.run_folder), "101925_0705");
    assert_eq!(name(&second.run_folder), "101925_0705_1");
    assert_eq!(name(&third.run_folder), "101925_0705_2");
}
