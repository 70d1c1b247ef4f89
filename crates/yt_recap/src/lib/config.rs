use std::{fmt, path::PathBuf};

use crate::{Error, Result};

/// Process-wide settings, built once at startup and handed by reference to
/// every component that needs them.
#[derive(Clone)]
pub struct Config {
    pub youtube_api_key: String,
    pub openrouter_api_key: String,
    pub llm_base_url: String,
    pub model: String,
    /// Parent of the datetime run folders
    pub output_root: PathBuf,
    /// Holds the flat `transcripts/` and `summaries/` layout of older versions
    pub legacy_root: PathBuf,
    pub prompt_path: PathBuf,
    pub cookies_path: Option<PathBuf>,
    pub since_days: u32,
    pub video_ids: bool,
    pub include_previous: bool,
}

impl Config {
    pub const DEFAULT_MODEL: &'static str = "qwen/qwen3-30b-a3b-instruct-2507";
    pub const DEFAULT_LLM_BASE_URL: &'static str = "https://openrouter.ai/api/v1";
    pub const DEFAULT_OUTPUT_ROOT: &'static str = "processed";
    pub const DEFAULT_PROMPT_PATH: &'static str = "prompt.txt";

    /// Reads the summarization instruction from `prompt_path`.
    ///
    /// A missing or blank prompt file is an argument error and aborts the run
    /// before any folder is created.
    pub fn load_prompt(&self) -> Result<String> {
        let prompt = std::fs::read_to_string(&self.prompt_path).map_err(|e| {
            Error::InvalidArguments(format!(
                "cannot read prompt file {}: {e}",
                self.prompt_path.display()
            ))
        })?;

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::InvalidArguments(format!(
                "prompt file {} is empty",
                self.prompt_path.display()
            )));
        }

        Ok(prompt.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            youtube_api_key: String::new(),
            openrouter_api_key: String::new(),
            llm_base_url: Self::DEFAULT_LLM_BASE_URL.into(),
            model: Self::DEFAULT_MODEL.into(),
            output_root: Self::DEFAULT_OUTPUT_ROOT.into(),
            legacy_root: ".".into(),
            prompt_path: Self::DEFAULT_PROMPT_PATH.into(),
            cookies_path: None,
            since_days: 1,
            video_ids: false,
            include_previous: false,
        }
    }
}

// keys stay out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("youtube_api_key", &"<redacted>")
            .field("openrouter_api_key", &"<redacted>")
            .field("llm_base_url", &self.llm_base_url)
            .field("model", &self.model)
            .field("output_root", &self.output_root)
            .field("legacy_root", &self.legacy_root)
            .field("prompt_path", &self.prompt_path)
            .field("cookies_path", &self.cookies_path)
            .field("since_days", &self.since_days)
            .field("video_ids", &self.video_ids)
            .field("include_previous", &self.include_previous)
            .finish()
    }
}
