use std::{fmt::Display, future::Future};

use serde::Deserialize;

pub trait Summarizer {
    type Error: Display;

    /// Condenses `transcript` following the instructions in `prompt`.
    fn summarize(
        &self,
        model: &str,
        prompt: &str,
        transcript: &str,
    ) -> impl Future<Output = Result<SummaryResponse, Self::Error>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}
