pub mod data_api;
pub mod subtitles;

use std::future::Future;

use chrono::{DateTime, Utc};
use recap_store::Video;

use crate::Result;

/// Channel and video lookups against YouTube.
pub trait ChannelLister {
    /// Resolves a `@handle` to its channel id, or fails with
    /// [`Error::ChannelNotFound`](crate::Error::ChannelNotFound).
    fn resolve_channel_id(&self, handle: &str) -> impl Future<Output = Result<String>>;

    /// Uploads of a channel, newest first, down to roughly `cutoff`.
    ///
    /// Implementations may stop early once they reach videos older than
    /// `cutoff` but are not required to drop them; callers filter.
    fn channel_uploads(
        &self,
        channel_id: &str,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Video>>>;

    fn video_details(&self, video_id: &str) -> impl Future<Output = Result<Video>>;

    /// Best-effort `@handle` for a channel id
    fn channel_handle(&self, channel_id: &str) -> impl Future<Output = Result<Option<String>>>;
}

/// Fetches English captions for a video as plain text.
pub trait SubtitleDownloader {
    /// Fails with [`Error::NoSubtitlesAvailable`](crate::Error::NoSubtitlesAvailable)
    /// when the video has neither manual nor auto-generated English captions.
    fn fetch_transcript(&self, video: &Video) -> impl Future<Output = Result<String>>;
}
