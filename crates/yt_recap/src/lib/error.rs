use recap_store::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),
    #[error("YouTube API quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Video not found: {0}")]
    VideoNotFound(String),
    #[error("No English subtitles available for video {0}")]
    NoSubtitlesAvailable(String),
    #[error("Subtitle download failed: {0}")]
    Downloader(String),
    #[error("Summarization failed: {0}")]
    SummarizationFailed(String),
    #[error("Could not create run folder: {0}")]
    RunFolderCreationFailed(#[source] StoreError),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("YouTube API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("HTTP error: {0}")]
    Response(#[from] reqwest::Error),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Fatal errors abort the whole run; everything else is scoped to one
    /// channel or one video.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::RunFolderCreationFailed(_) | Error::InvalidArguments(_)
        )
    }
}
