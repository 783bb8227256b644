//! Core types for deckgen

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle status reported by the service for a deck or an export job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, not started
    Pending,
    /// Slides are being generated
    Generating,
    /// Export is rendering
    Processing,
    /// Finished successfully
    Complete,
    /// Failed on the service side
    Error,
    /// Any status string this client does not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Generating => "generating",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A remote deck as returned by `POST /v1/decks` and `GET /v1/decks/:id`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Opaque deck identifier (status responses may omit it)
    #[serde(default)]
    pub id: String,

    /// Deck name, if one was given or generated
    #[serde(default)]
    pub name: Option<String>,

    /// Generation status
    #[serde(default)]
    pub status: JobStatus,

    /// Total number of slides (0 until the outline exists)
    #[serde(default)]
    pub slides_count: u32,

    /// Number of slides finished so far
    #[serde(default)]
    pub slides_complete: u32,

    /// Error message when `status` is `error`
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /v1/decks/:id/export`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportStart {
    /// Identifier of the new export job
    pub export_id: String,
}

/// An export job as returned by `GET /v1/decks/:id/export?export_id=ID`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    /// Export status
    #[serde(default)]
    pub status: JobStatus,

    /// Progress percentage (0-100)
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: f64,

    /// Pre-signed URL of the rendered file, present once rendering finished
    #[serde(default)]
    pub download_url: Option<String>,

    /// Error message when `status` is `error`
    #[serde(default)]
    pub error: Option<String>,
}

// Accepts a number, a numeric string or null
fn lenient_progress<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// Export file format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// PDF document
    #[default]
    Pdf,
    /// PowerPoint presentation
    Pptx,
    /// Slide images
    Png,
}

impl ExportFormat {
    /// Wire name sent to the export endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Pptx => "pptx",
            ExportFormat::Png => "png",
        }
    }

    /// Extension of the downloaded file
    ///
    /// Only PPTX gets its own extension; every other format is saved as `.pdf`.
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Pptx => "pptx",
            ExportFormat::Pdf | ExportFormat::Png => "pdf",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "pptx" => Ok(ExportFormat::Pptx),
            "png" => Ok(ExportFormat::Png),
            other => Err(format!("unsupported export format '{other}' (pdf|pptx|png)")),
        }
    }
}

/// A file written to disk by the downloader
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Where the file was written
    pub path: PathBuf,
    /// Number of bytes written
    pub bytes: u64,
    /// Format that was requested for the export
    pub format: ExportFormat,
}

/// Everything one run of the orchestrator needs besides the [`Config`](crate::config::Config)
#[derive(Clone, Debug)]
pub struct GenerateRequest {
    /// Natural-language prompt for the deck
    pub prompt: String,
    /// Optional deck name
    pub name: Option<String>,
    /// Export format
    pub format: ExportFormat,
    /// Ask for higher-resolution slide images before export
    pub upscale: bool,
    /// Directory the artifact is written into
    pub output_dir: PathBuf,
    /// Filename stem overriding the `deck-<id>` default
    pub filename: Option<String>,
    /// Stop after the deck is generated
    pub skip_export: bool,
}

impl GenerateRequest {
    /// Request with default options for the given prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            name: None,
            format: ExportFormat::default(),
            upscale: false,
            output_dir: PathBuf::from("."),
            filename: None,
            skip_export: false,
        }
    }
}

/// Machine-readable result of a run, printed as one JSON line on stdout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Deck id
    pub id: String,
    /// Deck name
    pub name: Option<String>,
    /// Number of slides generated
    pub slides: u32,
    /// Canonical view URL of the deck
    pub url: String,
    /// Export format (export mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    /// Path of the downloaded file (export mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Size of the downloaded file in bytes (export mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deck_tolerates_missing_counters() {
        let deck: Deck = serde_json::from_value(json!({
            "id": "d-1",
            "name": "Quarterly update",
            "status": "pending"
        }))
        .unwrap();
        assert_eq!(deck.status, JobStatus::Pending);
        assert_eq!(deck.slides_count, 0);
        assert_eq!(deck.slides_complete, 0);
        assert!(deck.error.is_none());
    }

    #[test]
    fn deck_status_body_without_id_parses() {
        let deck: Deck = serde_json::from_value(json!({
            "status": "complete",
            "slides_count": 3,
            "slides_complete": 3
        }))
        .unwrap();
        assert!(deck.id.is_empty());
        assert_eq!(deck.status, JobStatus::Complete);
        assert_eq!(deck.slides_complete, 3);
    }

    #[test]
    fn unknown_status_maps_to_unknown() {
        let deck: Deck = serde_json::from_value(json!({
            "id": "d-1",
            "status": "queued_for_review"
        }))
        .unwrap();
        assert_eq!(deck.status, JobStatus::Unknown);
    }

    #[test]
    fn export_job_reads_download_url_and_progress() {
        let job: ExportJob = serde_json::from_value(json!({
            "status": "processing",
            "progress": 72.5,
            "download_url": "https://files.test/out.pdf"
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 72.5);
        assert_eq!(job.download_url.as_deref(), Some("https://files.test/out.pdf"));
    }

    #[test]
    fn export_progress_accepts_null_and_strings() {
        let job: ExportJob =
            serde_json::from_value(json!({"status": "pending", "progress": null})).unwrap();
        assert_eq!(job.progress, 0.0);

        let job: ExportJob =
            serde_json::from_value(json!({"status": "processing", "progress": "64"})).unwrap();
        assert_eq!(job.progress, 64.0);
    }

    #[test]
    fn only_pptx_has_its_own_extension() {
        assert_eq!(ExportFormat::Pptx.file_extension(), "pptx");
        assert_eq!(ExportFormat::Pdf.file_extension(), "pdf");
        assert_eq!(ExportFormat::Png.file_extension(), "pdf");
    }

    #[test]
    fn export_format_parses_case_insensitively() {
        assert_eq!("PPTX".parse::<ExportFormat>().unwrap(), ExportFormat::Pptx);
        assert_eq!("png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn summary_without_export_omits_file_fields() {
        let summary = RunSummary {
            id: "d-1".into(),
            name: Some("Deck".into()),
            slides: 8,
            url: "https://app.test/decks/d-1".into(),
            format: None,
            file: None,
            bytes: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("file"));
        assert!(!obj.contains_key("format"));
        assert!(!obj.contains_key("bytes"));
        assert_eq!(obj["slides"], 8);
    }

    #[test]
    fn summary_with_export_includes_file() {
        let summary = RunSummary {
            id: "d-1".into(),
            name: None,
            slides: 3,
            url: "https://app.test/decks/d-1".into(),
            format: Some(ExportFormat::Pdf),
            file: Some(PathBuf::from("./deck-d-1.pdf")),
            bytes: Some(1024),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["file"], "./deck-d-1.pdf");
        assert_eq!(json["format"], "pdf");
        assert_eq!(json["bytes"], 1024);
    }
}
