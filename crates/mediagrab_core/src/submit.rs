use std::fmt;

use thiserror::Error;

/// What the backend should produce for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Video,
    Audio,
}

impl MediaKind {
    /// Token sent as the `format` query parameter.
    pub fn as_query(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Container preference for video jobs. `Best` leaves the choice to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    Best,
    Mp4,
    Webm,
    Mkv,
    Avi,
    Mov,
    Flv,
    ThreeGp,
}

impl Container {
    pub fn from_token(token: &str) -> Option<Self> {
        let container = match token.trim().to_ascii_lowercase().as_str() {
            "" | "best" => Container::Best,
            "mp4" => Container::Mp4,
            "webm" => Container::Webm,
            "mkv" => Container::Mkv,
            "avi" => Container::Avi,
            "mov" => Container::Mov,
            "flv" => Container::Flv,
            "3gp" => Container::ThreeGp,
            _ => return None,
        };
        Some(container)
    }

    /// Token sent as the `videoFormat` query parameter.
    pub fn as_token(self) -> &'static str {
        match self {
            Container::Best => "best",
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
            Container::Mkv => "mkv",
            Container::Avi => "avi",
            Container::Mov => "mov",
            Container::Flv => "flv",
            Container::ThreeGp => "3gp",
        }
    }
}

/// Raw, unvalidated input as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitRequest {
    pub url: String,
    pub media_kind: MediaKind,
    /// Maximum height such as `720` or `720p`; empty means best available.
    pub resolution: String,
    /// Container token such as `mp4`; empty or `best` means unconstrained.
    pub container: String,
}

/// Validated job parameters. Immutable once a job record holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParams {
    pub url: String,
    pub media_kind: MediaKind,
    pub resolution: Option<u32>,
    pub container: Container,
}

impl JobParams {
    /// Value of the `resolution` query parameter; empty means best available.
    pub fn resolution_query(&self) -> String {
        self.resolution.map(|h| h.to_string()).unwrap_or_default()
    }

    pub fn container_query(&self) -> &'static str {
        self.container.as_token()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("please enter a valid URL")]
    EmptyUrl,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),
    #[error("unknown video format: {0}")]
    UnknownContainer(String),
}

/// Validates user input before a job record or connection exists.
///
/// Audio jobs ignore resolution and container preferences.
pub fn validate(request: &SubmitRequest) -> Result<JobParams, SubmitError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(SubmitError::EmptyUrl);
    }

    let parsed = url::Url::parse(url).map_err(|err| SubmitError::InvalidUrl(err.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SubmitError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(SubmitError::InvalidUrl("missing host".to_string()));
    }

    let (resolution, container) = match request.media_kind {
        MediaKind::Audio => (None, Container::Best),
        MediaKind::Video => (
            parse_resolution(&request.resolution)?,
            Container::from_token(&request.container)
                .ok_or_else(|| SubmitError::UnknownContainer(request.container.clone()))?,
        ),
    };

    Ok(JobParams {
        url: url.to_string(),
        media_kind: request.media_kind,
        resolution,
        container,
    })
}

fn parse_resolution(raw: &str) -> Result<Option<u32>, SubmitError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_suffix('p')
        .or_else(|| trimmed.strip_suffix('P'))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.eq_ignore_ascii_case("best") {
        return Ok(None);
    }
    match digits.parse::<u32>() {
        Ok(height) if height > 0 => Ok(Some(height)),
        _ => Err(SubmitError::InvalidResolution(raw.to_string())),
    }
}
