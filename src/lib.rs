//! # deckgen
//!
//! Client for a remote presentation-generation API.
//!
//! A run turns a natural-language prompt into a slide deck and, optionally, a
//! downloaded export file:
//!
//! 1. `POST /v1/decks` creates the deck
//! 2. the deck is polled until every slide is finished
//! 3. `POST /v1/decks/:id/export` starts an export job
//! 4. the export is polled until it publishes a download URL
//! 5. the file is streamed to disk, following redirects
//!
//! ## Quick Start
//!
//! ```no_run
//! use deckgen::{Config, GenerateRequest, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://api.example.com", "my-api-key");
//!     let orchestrator = Orchestrator::new(config)?;
//!
//!     let summary = orchestrator
//!         .run(&GenerateRequest::new("Quarterly update for the board"))
//!         .await?;
//!     println!("{}", serde_json::to_string(&summary)?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP client for the presentation API
pub mod client;
/// Configuration types
pub mod config;
/// Artifact downloader with manual redirect handling
pub mod download;
/// Error types
pub mod error;
/// Create, wait, export, download
pub mod orchestrator;
/// Polling of deck and export jobs
pub mod poller;
/// Transient failure classification
pub mod retry;
/// Core types
pub mod types;

pub use client::{ApiClient, ApiResponse};
pub use config::{Config, PollConfig};
pub use download::Downloader;
pub use error::{DownloadError, Error, RemoteError, Result, ToExitCode};
pub use orchestrator::{Orchestrator, build_prompt, output_path};
pub use types::{
    Artifact, Deck, ExportFormat, ExportJob, ExportStart, GenerateRequest, JobStatus, RunSummary,
};
