pub mod config;
mod error;
mod http;
mod llm;
pub mod parser;
mod processor;
mod report;
pub mod tracing;
pub mod types;
pub mod yt;

pub use config::Config;
pub use error::{Error, Result};
pub use llm::openai;
pub use llm::summarizer::{Summarizer, SummaryResponse};
pub use processor::{builder::RecapProcessorBuilder, InputMode, RecapProcessor, TaskStage};
pub use report::{Failure, FailureScope, RunReport, SummaryOrigin, TranscriptOrigin, VideoOutcome};

pub use recap_store::{ArtifactKind, RunFolder, RunId, Video};
