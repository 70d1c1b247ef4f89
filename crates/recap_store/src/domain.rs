use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub channel_id: Option<String>,
    /// Always `@`-prefixed when known
    pub channel_handle: Option<String>,
    /// Live streams and archived live sessions
    pub is_live_content: bool,
}

impl Video {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// The two kinds of files a run produces per video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Transcript,
    Summary,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Transcript, ArtifactKind::Summary];

    /// Subdirectory of a run folder (or of the legacy root) holding this kind
    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "transcripts",
            ArtifactKind::Summary => "summaries",
        }
    }

    fn file_suffix(self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "_transcript.txt",
            ArtifactKind::Summary => "_summary.md",
        }
    }

    pub fn file_name(self, video_id: &str) -> String {
        format!("{video_id}{}", self.file_suffix())
    }

    /// Inverse of [`ArtifactKind::file_name`]
    pub fn video_id_from_file_name(self, file_name: &str) -> Option<&str> {
        file_name
            .strip_suffix(self.file_suffix())
            .filter(|video_id| !video_id.is_empty())
    }
}
