use chrono::{DateTime, Utc};
use itertools::Itertools;
use recap_store::Video;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;

use crate::{
    http::retrying_client,
    parser::normalize_handle,
    types::{
        ApiErrorResponse, ChannelItem, ListResponse, PlaylistItem, SearchItem, VideoItem,
    },
    yt::ChannelLister,
    Config, Error, Result,
};

/// YouTube Data API v3 client.
pub struct YouTubeDataApi {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl YouTubeDataApi {
    const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com/youtube/v3";
    const PAGE_SIZE: &'static str = "50";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: retrying_client(),
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.youtube_api_key)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn get<T: DeserializeOwned>(&self, resource: &str, query: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .client
            .get(format!("{}/{resource}", self.base_url))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, resource, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();

            if let Ok(body) = serde_json::from_str::<ApiErrorResponse>(&message) {
                if body.error.is_quota_exceeded() {
                    return Err(Error::QuotaExceeded(body.error.message));
                }
            }
            return Err(Error::Api { status, message });
        }

        Ok(resp.json::<T>().await?)
    }

    async fn channel_id_by(&self, filter: &str, value: &str) -> Result<Option<String>> {
        let channels: ListResponse<ChannelItem> = self
            .get("channels", &[("part", "id"), (filter, value)])
            .await?;

        Ok(channels.items.into_iter().next().map(|c| c.id))
    }

    /// Flags live streams (and archived live sessions) in one batched lookup.
    async fn mark_live_content(&self, videos: &mut [Video]) -> Result<()> {
        if videos.is_empty() {
            return Ok(());
        }

        let ids = videos.iter().map(|v| v.video_id.as_str()).join(",");
        let details: ListResponse<VideoItem> = self
            .get("videos", &[("part", "liveStreamingDetails"), ("id", ids.as_str())])
            .await?;

        for item in details.items {
            if item.live_streaming_details.is_none() {
                continue;
            }
            if let Some(video) = videos.iter_mut().find(|v| v.video_id == item.id) {
                video.is_live_content = true;
            }
        }

        Ok(())
    }
}

impl ChannelLister for YouTubeDataApi {
    /// Tries `forHandle`, then `forUsername`, then falls back to a channel
    /// search, preferring a hit whose title contains the handle.
    #[tracing::instrument(skip(self))]
    async fn resolve_channel_id(&self, handle: &str) -> Result<String> {
        let handle = normalize_handle(handle);
        let username = handle.trim_start_matches('@');

        for (filter, value) in [("forHandle", handle.as_str()), ("forUsername", username)] {
            match self.channel_id_by(filter, value).await {
                Ok(Some(channel_id)) => return Ok(channel_id),
                Ok(None) => {}
                Err(e @ Error::QuotaExceeded(_)) => return Err(e),
                Err(e) => tracing::warn!(error = %e, filter, "Channel lookup failed"),
            }
        }

        let search: ListResponse<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", handle.as_str()),
                    ("type", "channel"),
                    ("maxResults", "10"),
                ],
            )
            .await?;

        let needle = username.to_lowercase();
        let best = search
            .items
            .iter()
            .find(|item| item.snippet.title.to_lowercase().contains(&needle))
            .or_else(|| {
                let first = search.items.first();
                if let Some(item) = first {
                    tracing::warn!(
                        closest = %item.snippet.title,
                        "No exact match for handle, using closest search result"
                    );
                }
                first
            });

        best.map(|item| item.snippet.channel_id.clone())
            .ok_or(Error::ChannelNotFound(handle))
    }

    #[tracing::instrument(skip(self))]
    async fn channel_uploads(&self, channel_id: &str, cutoff: DateTime<Utc>) -> Result<Vec<Video>> {
        let channels: ListResponse<ChannelItem> = self
            .get("channels", &[("part", "contentDetails"), ("id", channel_id)])
            .await?;

        let playlist_id = channels
            .items
            .into_iter()
            .next()
            .and_then(|c| c.content_details)
            .map(|d| d.related_playlists.uploads)
            .ok_or_else(|| Error::ChannelNotFound(channel_id.to_string()))?;

        let mut videos = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: ListResponse<PlaylistItem> = {
                let mut query = vec![
                    ("part", "snippet"),
                    ("playlistId", playlist_id.as_str()),
                    ("maxResults", Self::PAGE_SIZE),
                ];
                if let Some(token) = page_token.as_deref() {
                    query.push(("pageToken", token));
                }
                self.get("playlistItems", &query).await?
            };

            // uploads are listed newest first
            let mut reached_cutoff = false;
            let mut batch = Vec::new();
            for item in page.items {
                if item.snippet.published_at < cutoff {
                    reached_cutoff = true;
                    break;
                }
                batch.push(Video {
                    video_id: item.snippet.resource_id.video_id,
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                    channel_id: Some(channel_id.to_string()),
                    ..Default::default()
                });
            }

            self.mark_live_content(&mut batch).await?;
            videos.extend(batch);

            match page.next_page_token {
                Some(token) if !reached_cutoff => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = videos.len(), "Listed channel uploads");
        Ok(videos)
    }

    #[tracing::instrument(skip(self))]
    async fn video_details(&self, video_id: &str) -> Result<Video> {
        let videos: ListResponse<VideoItem> = self
            .get(
                "videos",
                &[("part", "snippet,liveStreamingDetails"), ("id", video_id)],
            )
            .await?;

        let item = videos
            .items
            .into_iter()
            .next()
            .ok_or_else(|| Error::VideoNotFound(video_id.to_string()))?;
        let snippet = item
            .snippet
            .ok_or_else(|| Error::VideoNotFound(video_id.to_string()))?;

        Ok(Video {
            video_id: item.id,
            title: snippet.title,
            published_at: snippet.published_at,
            channel_id: Some(snippet.channel_id),
            channel_handle: None,
            is_live_content: item.live_streaming_details.is_some(),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn channel_handle(&self, channel_id: &str) -> Result<Option<String>> {
        let channels: ListResponse<ChannelItem> = self
            .get("channels", &[("part", "snippet"), ("id", channel_id)])
            .await?;

        let handle = channels
            .items
            .into_iter()
            .next()
            .and_then(|c| c.snippet)
            .map(|snippet| match snippet.custom_url {
                Some(custom_url) => normalize_handle(&custom_url),
                None => normalize_handle(&snippet.title),
            });

        Ok(handle)
    }
}
