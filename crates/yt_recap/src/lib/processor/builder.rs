use std::path::PathBuf;

use crate::{
    yt::{ChannelLister, SubtitleDownloader},
    Config, InputMode, RecapProcessor, Summarizer,
};

pub struct RecapProcessorBuilder<L = (), D = (), S = ()> {
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

impl RecapProcessorBuilder {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            legacy_root: PathBuf::from("."),
            lister: (),
            downloader: (),
            summarizer: (),
            model: Config::DEFAULT_MODEL.into(),
            prompt: String::new(),
            mode: InputMode::Channels { since_days: 1 },
            include_previous: false,
        }
    }

    /// Everything but the collaborators and the prompt text
    pub fn from_config(config: &Config) -> Self {
        let mode = if config.video_ids {
            InputMode::VideoIds
        } else {
            InputMode::Channels {
                since_days: config.since_days,
            }
        };

        Self::new(&config.output_root)
            .legacy_root(&config.legacy_root)
            .model(&config.model)
            .mode(mode)
            .include_previous(config.include_previous)
    }
}

impl<L, D, S> RecapProcessorBuilder<L, D, S> {
    pub fn channel_lister<L2: ChannelLister>(self, lister: L2) -> RecapProcessorBuilder<L2, D, S> {
        RecapProcessorBuilder {
            output_root: self.output_root,
            legacy_root: self.legacy_root,
            lister,
            downloader: self.downloader,
            summarizer: self.summarizer,
            model: self.model,
            prompt: self.prompt,
            mode: self.mode,
            include_previous: self.include_previous,
        }
    }

    pub fn subtitle_downloader<D2: SubtitleDownloader>(
        self,
        downloader: D2,
    ) -> RecapProcessorBuilder<L, D2, S> {
        RecapProcessorBuilder {
            output_root: self.output_root,
            legacy_root: self.legacy_root,
            lister: self.lister,
            downloader,
            summarizer: self.summarizer,
            model: self.model,
            prompt: self.prompt,
            mode: self.mode,
            include_previous: self.include_previous,
        }
    }

    pub fn summarizer<S2: Summarizer>(self, summarizer: S2) -> RecapProcessorBuilder<L, D, S2> {
        RecapProcessorBuilder {
            output_root: self.output_root,
            legacy_root: self.legacy_root,
            lister: self.lister,
            downloader: self.downloader,
            summarizer,
            model: self.model,
            prompt: self.prompt,
            mode: self.mode,
            include_previous: self.include_previous,
        }
    }

    pub fn legacy_root(mut self, legacy_root: impl Into<PathBuf>) -> Self {
        self.legacy_root = legacy_root.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn since_days(self, since_days: u32) -> Self {
        self.mode(InputMode::Channels { since_days })
    }

    pub fn video_ids(self) -> Self {
        self.mode(InputMode::VideoIds)
    }

    pub fn mode(mut self, mode: InputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn include_previous(mut self, include_previous: bool) -> Self {
        self.include_previous = include_previous;
        self
    }
}

impl<L, D, S> RecapProcessorBuilder<L, D, S>
where
    L: ChannelLister,
    D: SubtitleDownloader,
    S: Summarizer,
{
    pub fn build(self) -> RecapProcessor<L, D, S> {
        RecapProcessor {
            output_root: self.output_root,
            legacy_root: self.legacy_root,
            lister: self.lister,
            downloader: self.downloader,
            summarizer: self.summarizer,
            model: self.model,
            prompt: self.prompt,
            mode: self.mode,
            include_previous: self.include_previous,
        }
    }
}
