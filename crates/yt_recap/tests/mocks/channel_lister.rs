use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use yt_recap::{yt::ChannelLister, Error, Result, Video};

#[derive(Clone, Default)]
pub struct MockChannelLister {
    /// handle -> channel id
    pub channels: HashMap<String, String>,
    /// channel id -> uploads, newest first
    pub uploads: HashMap<String, Vec<Video>>,
    /// channel id -> handle, for video id lookups
    pub handles: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockChannelLister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup fails as if the API quota ran out
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, handle: &str, channel_id: &str, videos: Vec<Video>) -> Self {
        let videos = videos
            .into_iter()
            .map(|v| Video {
                channel_id: Some(channel_id.to_string()),
                ..v
            })
            .collect();
        self.channels.insert(handle.to_string(), channel_id.to_string());
        self.handles.insert(channel_id.to_string(), handle.to_string());
        self.uploads.insert(channel_id.to_string(), videos);
        self
    }

    fn check_quota(&self) -> Result<()> {
        match self.fail_with {
            Some(ref msg) => Err(Error::QuotaExceeded(msg.clone())),
            None => Ok(()),
        }
    }
}

impl ChannelLister for MockChannelLister {
    async fn resolve_channel_id(&self, handle: &str) -> Result<String> {
        self.calls.lock().unwrap().push(handle.to_string());
        self.check_quota()?;
        self.channels
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::ChannelNotFound(handle.to_string()))
    }

    async fn channel_uploads(&self, channel_id: &str, _cutoff: DateTime<Utc>) -> Result<Vec<Video>> {
        self.check_quota()?;
        Ok(self.uploads.get(channel_id).cloned().unwrap_or_default())
    }

    async fn video_details(&self, video_id: &str) -> Result<Video> {
        self.calls.lock().unwrap().push(video_id.to_string());
        self.check_quota()?;
        self.uploads
            .values()
            .flatten()
            .find(|v| v.video_id == video_id)
            .cloned()
            .ok_or_else(|| Error::VideoNotFound(video_id.to_string()))
    }

    async fn channel_handle(&self, channel_id: &str) -> Result<Option<String>> {
        self.check_quota()?;
        Ok(self.handles.get(channel_id).cloned())
    }
}
