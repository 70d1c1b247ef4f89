pub mod channel_lister;
pub mod subtitle_downloader;
pub mod summarizer;
