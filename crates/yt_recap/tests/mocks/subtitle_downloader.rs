use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use yt_recap::{yt::SubtitleDownloader, Error, Result, Video};

#[derive(Clone, Default)]
pub struct MockSubtitleDownloader {
    /// video id -> transcript; anything missing has no captions
    pub transcripts: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockSubtitleDownloader {
    pub fn new(transcripts: &[(&str, &str)]) -> Self {
        Self {
            transcripts: transcripts
                .iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }
}

impl SubtitleDownloader for MockSubtitleDownloader {
    async fn fetch_transcript(&self, video: &Video) -> Result<String> {
        self.calls.lock().unwrap().push(video.video_id.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(Error::Downloader(msg.clone()));
        }
        self.transcripts
            .get(&video.video_id)
            .cloned()
            .ok_or_else(|| Error::NoSubtitlesAvailable(video.video_id.clone()))
    }
}
