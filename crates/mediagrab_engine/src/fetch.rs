use std::time::Duration;

use mediagrab_logging::mediagrab_debug;
use serde::Deserialize;

use crate::{FailureKind, FetchError, FileEntry, StreamRequest};

#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Backend origin, optionally with a path prefix such as `/api`.
    pub base_url: String,
    pub stream_path: String,
    pub files_path: String,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` lets a job stream for as long as the backend keeps it open.
    pub request_timeout: Option<Duration>,
    /// Limit for a whole `/files` request, body included.
    pub listing_timeout: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            stream_path: "/download/stream".to_string(),
            files_path: "/files".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            listing_timeout: Duration::from_secs(30),
        }
    }
}

#[async_trait::async_trait]
pub trait FileLister: Send + Sync {
    async fn list_files(&self) -> Result<Vec<FileEntry>, FetchError>;
}

#[derive(Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Option<Vec<FileEntry>>,
}

/// HTTP client for the download backend: progress streams, file listing and
/// artifact retrieval.
#[derive(Debug, Clone)]
pub struct BackendClient {
    pub(crate) settings: StreamSettings,
}

impl BackendClient {
    pub fn new(settings: StreamSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, FetchError> {
        let raw = format!("{}{}", self.settings.base_url.trim_end_matches('/'), path);
        reqwest::Url::parse(&raw).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Stream endpoint with the job parameters as query parameters.
    pub fn stream_url(&self, request: &StreamRequest) -> Result<reqwest::Url, FetchError> {
        let mut url = self.endpoint(&self.settings.stream_path)?;
        url.query_pairs_mut()
            .append_pair("url", &request.url)
            .append_pair("format", &request.format)
            .append_pair("resolution", &request.resolution)
            .append_pair("videoFormat", &request.video_format);
        Ok(url)
    }

    pub fn files_url(&self) -> Result<reqwest::Url, FetchError> {
        self.endpoint(&self.settings.files_path)
    }

    /// Resolves a `downloadUrl` locator such as `/files/x.mp4` against the backend.
    pub fn artifact_url(&self, locator: &str) -> Result<reqwest::Url, FetchError> {
        let base = reqwest::Url::parse(&self.settings.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        base.join(locator)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl FileLister for BackendClient {
    async fn list_files(&self) -> Result<Vec<FileEntry>, FetchError> {
        let url = self.files_url()?;
        let client = self.build_client()?;
        let response = client
            .get(url)
            .timeout(self.settings.listing_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let listing: FileListing = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidResponse, err.to_string()))?;
        let files = listing.files.unwrap_or_default();
        mediagrab_debug!("File listing returned {} entries", files.len());
        Ok(files)
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
