//! deckgen CLI - generate a presentation from a prompt and download the export

use anyhow::{Context, Result};
use clap::Parser;
use deckgen::{
    Config, ExportFormat, GenerateRequest, Orchestrator, RunSummary, ToExitCode, build_prompt,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(about = "Generate a slide deck from a prompt and download the export", long_about = None)]
#[command(version)]
struct Cli {
    /// Prompt words, joined with single spaces
    prompt: Vec<String>,

    /// Read the prompt from standard input
    #[arg(long)]
    stdin: bool,

    /// Deck name
    #[arg(short, long)]
    name: Option<String>,

    /// Export format (pdf, pptx or png)
    #[arg(short, long, default_value = "pdf")]
    format: ExportFormat,

    /// Request upscaled slide images before export
    #[arg(long)]
    upscale: bool,

    /// Directory the exported file is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Output filename stem (defaults to deck-<id prefix>)
    #[arg(long)]
    filename: Option<String>,

    /// Create the deck only, without exporting
    #[arg(long)]
    no_export: bool,

    /// Seconds between deck status checks
    #[arg(long, value_parser = parse_seconds)]
    deck_poll_interval: Option<Duration>,

    /// Seconds between export status checks
    #[arg(long, value_parser = parse_seconds)]
    export_poll_interval: Option<Duration>,

    /// Deadline in seconds for each polling phase
    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long, env = "DECKGEN_BASE_URL")]
    base_url: Option<String>,

    /// Base URL for deck view links (defaults to the API base URL)
    #[arg(long, env = "DECKGEN_APP_URL")]
    app_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "DECKGEN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl Cli {
    /// Layer environment and flag values over the file (or default) config
    fn load_config(&self) -> deckgen::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(app_url) = &self.app_url {
            config.app_url = Some(app_url.clone());
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(interval) = self.deck_poll_interval {
            config.polling.deck_interval = interval;
        }
        if let Some(interval) = self.export_poll_interval {
            config.polling.export_interval = interval;
        }
        if let Some(timeout) = self.timeout {
            config.polling.timeout = timeout;
        }

        Ok(config)
    }
}

fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration '{value}': {e}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Progress goes to stderr; stdout carries only the result
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, error_code) = match err.downcast_ref::<deckgen::Error>() {
                Some(e) => (e.exit_code(), e.error_code().to_string()),
                None => (1, "internal_error".to_string()),
            };
            error!(error_code = %error_code, "{err:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let stdin = if cli.stdin {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read prompt from stdin")?;
        Some(text)
    } else {
        None
    };
    let prompt = build_prompt(&cli.prompt, stdin.as_deref())?;

    let config = cli.load_config()?;
    let orchestrator = Orchestrator::new(config)?;

    let request = GenerateRequest {
        prompt,
        name: cli.name,
        format: cli.format,
        upscale: cli.upscale,
        output_dir: cli.out_dir,
        filename: cli.filename,
        skip_export: cli.no_export,
    };

    let summary = orchestrator.run(&request).await?;
    print_summary(&summary)?;
    Ok(())
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    println!("{}", serde_json::to_string(summary)?);
    if let Some(file) = &summary.file {
        println!("FILE: {}", file.display());
    }
    Ok(())
}
