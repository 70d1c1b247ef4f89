use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use recap_store::Video;
use tokio::process::Command;

use crate::{parser::vtt_to_text, yt::SubtitleDownloader, Config, Error, Result};

/// Downloads captions with the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlpSubtitles {
    binary: PathBuf,
    cookies_path: Option<PathBuf>,
}

impl Default for YtDlpSubtitles {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            cookies_path: None,
        }
    }
}

impl YtDlpSubtitles {
    const SUBTITLE_LANG: &'static str = "en";

    pub fn from_config(config: &Config) -> Self {
        Self {
            cookies_path: config.cookies_path.clone(),
            ..Default::default()
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Runs yt-dlp for captions only, writing `<id>.<lang>.vtt` into `workdir`
    async fn download_vtt(&self, video: &Video, workdir: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--skip-download")
            .arg("--write-sub")
            .arg("--write-auto-sub")
            .args(["--sub-lang", Self::SUBTITLE_LANG])
            .args(["--sub-format", "vtt"])
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("-o")
            .arg(workdir.join("%(id)s.%(ext)s"));

        if let Some(cookies) = &self.cookies_path {
            cmd.arg("--cookies").arg(cookies);
        }

        let output = cmd
            .arg(video.watch_url())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::Downloader(format!("failed to run {}: {e}", self.binary.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Downloader(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl SubtitleDownloader for YtDlpSubtitles {
    #[tracing::instrument(skip_all, fields(video_id = %video.video_id))]
    async fn fetch_transcript(&self, video: &Video) -> Result<String> {
        let workdir = tempfile::tempdir()?;

        self.download_vtt(video, workdir.path())
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to download subtitles"))?;

        // manual captions are written as `<id>.en.vtt`, same as auto ones;
        // yt-dlp prefers the manual track when both exist
        let vtt_path = fs::read_dir(workdir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("vtt"))
            .sorted()
            .next()
            .ok_or_else(|| Error::NoSubtitlesAvailable(video.video_id.clone()))?;

        let text = vtt_to_text(&fs::read_to_string(&vtt_path)?);
        if text.is_empty() {
            return Err(Error::NoSubtitlesAvailable(video.video_id.clone()));
        }

        tracing::debug!(chars = text.len(), "Converted captions to transcript");
        Ok(text)
    }
}
