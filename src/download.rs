//! Artifact downloader
//!
//! Fetches an export's download URL to a local file. The destination is opened
//! before the network read starts and the body is streamed to disk chunk by
//! chunk. Redirects are followed here rather than by the HTTP stack: each 3xx
//! removes the partial file and the download starts over at the new location.
//!
//! A failed download can leave an empty or partial file behind; cleaning it up
//! is the caller's decision.

use crate::config::Config;
use crate::error::{DownloadError, Error, Result};
use crate::types::{Artifact, ExportFormat};
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Maximum number of redirects followed for one download
pub const MAX_REDIRECTS: usize = 10;

/// Streams remote files to disk
#[derive(Clone, Debug)]
pub struct Downloader {
    http: reqwest::Client,
}

impl Downloader {
    /// Build a downloader from the configuration
    ///
    /// Only the connect timeout applies; a large export may legitimately take
    /// longer than `request_timeout` to transfer.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(config.request_timeout)
            .user_agent(concat!("deckgen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Download `url` to `destination`, following redirects
    ///
    /// # Errors
    /// - [`DownloadError::HttpStatus`] if the final response is not 200
    /// - [`DownloadError::MissingLocation`] for a redirect without `Location`
    /// - [`DownloadError::TooManyRedirects`] after [`MAX_REDIRECTS`] hops
    /// - [`Error::Network`] / [`Error::Io`] for transport and disk failures
    pub async fn download(
        &self,
        url: &str,
        destination: &Path,
        format: ExportFormat,
    ) -> Result<Artifact> {
        if destination.file_name().is_none() {
            return Err(DownloadError::InvalidDestination {
                path: destination.to_path_buf(),
                reason: "path has no file name".to_string(),
            }
            .into());
        }

        let mut current = Url::parse(url)?;

        for hop in 0..=MAX_REDIRECTS {
            let mut file = File::create(destination).await?;
            let response = self.http.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| DownloadError::MissingLocation {
                        url: current.to_string(),
                        status: status.as_u16(),
                    })?;
                let next = current.join(location)?;

                drop(file);
                tokio::fs::remove_file(destination).await?;

                debug!(hop, status = status.as_u16(), from = %current, to = %next, "following redirect");
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(DownloadError::HttpStatus {
                    url: current.to_string(),
                    status: status.as_u16(),
                }
                .into());
            }

            let bytes = write_body(response, &mut file).await?;
            if bytes == 0 {
                warn!(path = %destination.display(), "download finished with an empty file");
            }
            info!(path = %destination.display(), bytes, "download complete");

            return Ok(Artifact {
                path: destination.to_path_buf(),
                bytes,
                format,
            });
        }

        Err(DownloadError::TooManyRedirects {
            url: url.to_string(),
            limit: MAX_REDIRECTS,
        }
        .into())
    }
}

/// Stream a response body into an open file, returning the byte count
async fn write_body(response: reqwest::Response, file: &mut File) -> Result<u64> {
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Error::Network)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}
