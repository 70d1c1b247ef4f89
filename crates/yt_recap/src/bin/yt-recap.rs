use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use yt_recap::{
    openai::OpenAIClient,
    tracing::init_tracing_subscriber,
    yt::{data_api::YouTubeDataApi, subtitles::YtDlpSubtitles},
    Config, RecapProcessorBuilder,
};

#[derive(Parser)]
#[command(
    name = "yt-recap",
    about = "Summarize recent YouTube uploads from their English captions"
)]
struct Cli {
    /// Comma-separated channel handles, or video ids with --video-ids
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Only consider uploads from the last N days
    #[arg(short, long, default_value = "1")]
    days: u32,

    /// Treat inputs as video ids instead of channel handles
    #[arg(short, long)]
    video_ids: bool,

    /// File holding the summarization instructions
    #[arg(short, long, default_value = Config::DEFAULT_PROMPT_PATH)]
    prompt: PathBuf,

    /// LLM model identifier
    #[arg(short, long, env = "LLM_MODEL", default_value = Config::DEFAULT_MODEL)]
    model: String,

    /// Also reuse summaries from earlier runs, not just transcripts
    #[arg(long)]
    include_previous: bool,

    /// Parent directory of the per-run folders
    #[arg(long, env = "YT_RECAP_OUTPUT_ROOT", default_value = Config::DEFAULT_OUTPUT_ROOT)]
    output_root: PathBuf,

    /// Directory holding the flat transcripts/ and summaries/ layout of older versions
    #[arg(long, env = "YT_RECAP_LEGACY_ROOT", default_value = ".")]
    legacy_root: PathBuf,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: String,

    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: String,

    /// OpenAI-compatible chat completions base URL
    #[arg(long, env = "LLM_BASE_URL", default_value = Config::DEFAULT_LLM_BASE_URL)]
    llm_base_url: String,

    /// Path to a yt-dlp cookies file
    #[arg(long, env = "YTDLP_COOKIES_PATH")]
    cookies_path: Option<PathBuf>,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            youtube_api_key: cli.youtube_api_key,
            openrouter_api_key: cli.openrouter_api_key,
            llm_base_url: cli.llm_base_url,
            model: cli.model,
            output_root: cli.output_root,
            legacy_root: cli.legacy_root,
            prompt_path: cli.prompt,
            cookies_path: cli.cookies_path,
            since_days: cli.days,
            video_ids: cli.video_ids,
            include_previous: cli.include_previous,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    init_tracing_subscriber()?;

    let cli = Cli::parse();
    let inputs = cli.inputs.clone();
    let config = Config::from(cli);
    tracing::debug!(?config, "Loaded configuration");

    let prompt = config
        .load_prompt()
        .context("Failed to load summarization prompt")?;

    let processor = RecapProcessorBuilder::from_config(&config)
        .prompt(prompt)
        .channel_lister(YouTubeDataApi::from_config(&config))
        .subtitle_downloader(YtDlpSubtitles::from_config(&config))
        .summarizer(OpenAIClient::from_config(&config))
        .build();

    let report = processor
        .run(&inputs)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Run aborted"))?;

    println!("{report}");

    Ok(())
}
