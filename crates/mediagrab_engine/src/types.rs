use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

pub type JobId = u64;

/// Query parameters sent when opening a job's progress stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub url: String,
    /// `video` or `audio`.
    pub format: String,
    /// Maximum height; empty means best available.
    pub resolution: String,
    /// Container token; `best` means unconstrained.
    pub video_format: String,
}

/// Finalized artifact announced by a metadata event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactInfo {
    pub filename: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
}

/// One decoded, classified message from a progress stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    Progress { text: String, percent: Option<f64> },
    Metadata(ArtifactInfo),
    Completed,
}

/// One entry of the backend's file listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub mod_time: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A protocol event for a job, in stream order.
    Stream { job_id: JobId, event: ProtocolEvent },
    /// The job's stream ended without the terminal-success token.
    StreamFailed { job_id: JobId, error: FetchError },
    FilesListed(Result<Vec<FileEntry>, FetchError>),
    ArtifactSaved {
        job_id: JobId,
        result: Result<PathBuf, String>,
    },
    /// Every running task was cancelled by an interrupt.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    ClosedEarly,
    Cancelled,
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::ClosedEarly => write!(f, "stream closed before completion"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}
