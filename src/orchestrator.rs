//! End-to-end run: create a deck, wait for it, export it, download the file
//!
//! [`Orchestrator::run`] is a straight sequence of awaits. Any failure ends the
//! run; nothing is salvaged from a partially completed flow.

use crate::client::ApiClient;
use crate::config::Config;
use crate::download::Downloader;
use crate::error::{DownloadError, Error, Result};
use crate::poller::{wait_for_deck, wait_for_export};
use crate::types::{ExportFormat, GenerateRequest, RunSummary};
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of id characters used in the default file name
const DEFAULT_STEM_ID_CHARS: usize = 8;

/// Build the deck prompt from positional words or drained standard input
///
/// Standard input wins when present. The result is trimmed and must not be
/// empty.
pub fn build_prompt(words: &[String], stdin: Option<&str>) -> Result<String> {
    let prompt = match stdin {
        Some(text) => text.trim().to_string(),
        None => words.join(" ").trim().to_string(),
    };

    if prompt.is_empty() {
        return Err(Error::Usage(
            "a prompt is required (pass it as arguments or use --stdin)".to_string(),
        ));
    }
    Ok(prompt)
}

/// Where the exported file for `deck_id` is written
///
/// Uses `filename` as the stem when given, otherwise `deck-<first 8 chars of id>`.
/// A stem that already carries the format's extension is used unchanged.
pub fn output_path(
    dir: &Path,
    filename: Option<&str>,
    deck_id: &str,
    format: ExportFormat,
) -> PathBuf {
    let ext = format.file_extension();
    let stem = match filename.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stem) => stem.to_string(),
        None => {
            let short: String = deck_id.chars().take(DEFAULT_STEM_ID_CHARS).collect();
            format!("deck-{short}")
        }
    };

    let suffix = format!(".{ext}");
    if stem.to_ascii_lowercase().ends_with(&suffix) {
        dir.join(stem)
    } else {
        dir.join(format!("{stem}{suffix}"))
    }
}

/// Drives one prompt through generation, export and download
#[derive(Clone, Debug)]
pub struct Orchestrator {
    config: Config,
    client: ApiClient,
    downloader: Downloader,
}

impl Orchestrator {
    /// Validate `config` and build the API and download clients
    ///
    /// # Errors
    /// [`Error::Config`] when the configuration is unusable, [`Error::Network`]
    /// if an HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(&config)?;
        let downloader = Downloader::new(&config)?;
        Ok(Self {
            config,
            client,
            downloader,
        })
    }

    /// The validated configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full flow for one request
    ///
    /// With `skip_export` the run stops once the deck is complete and the
    /// summary carries no file fields.
    pub async fn run(&self, request: &GenerateRequest) -> Result<RunSummary> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(Error::Usage("prompt must not be empty".to_string()));
        }

        info!(name = ?request.name, "creating deck");
        let created = self
            .client
            .create_deck(prompt, request.name.as_deref())
            .await?;
        if created.id.trim().is_empty() {
            return Err(Error::InvalidResponse(
                "create deck response has no deck id".to_string(),
            ));
        }
        let deck_id = created.id.clone();
        info!(deck_id = %deck_id, "deck created, waiting for slides");

        let deck = wait_for_deck(&self.client, &deck_id, &self.config.polling).await?;
        info!(deck_id = %deck_id, slides = deck.slides_count, "deck complete");

        let mut summary = RunSummary {
            id: deck_id.clone(),
            name: deck.name.or(created.name).or_else(|| request.name.clone()),
            slides: deck.slides_count,
            url: self.config.view_url(&deck_id),
            format: None,
            file: None,
            bytes: None,
        };

        if request.skip_export {
            info!(deck_id = %deck_id, "export skipped");
            return Ok(summary);
        }

        info!(deck_id = %deck_id, format = %request.format, upscale = request.upscale, "starting export");
        let export = self
            .client
            .start_export(&deck_id, request.format, request.upscale)
            .await?;
        let job = wait_for_export(
            &self.client,
            &deck_id,
            &export.export_id,
            &self.config.polling,
        )
        .await?;

        let Some(download_url) = job.download_url else {
            return Err(DownloadError::MissingDownloadUrl {
                deck_id,
                export_id: export.export_id,
            }
            .into());
        };

        let destination = output_path(
            &request.output_dir,
            request.filename.as_deref(),
            &deck_id,
            request.format,
        );
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(deck_id = %deck_id, path = %destination.display(), "downloading export");
        let artifact = self
            .downloader
            .download(&download_url, &destination, request.format)
            .await?;

        summary.format = Some(artifact.format);
        summary.file = Some(artifact.path);
        summary.bytes = Some(artifact.bytes);
        Ok(summary)
    }
}
