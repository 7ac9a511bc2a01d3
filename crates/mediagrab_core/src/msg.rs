use chrono::{DateTime, Utc};

use crate::{FileRow, JobId, SubmitRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted a download request.
    JobSubmitted {
        request: SubmitRequest,
        at: DateTime<Utc>,
    },
    /// Free-form progress line, with a percentage when one was found.
    JobProgress {
        job_id: JobId,
        text: String,
        percent: Option<f64>,
    },
    /// Backend announced the finalized artifact.
    JobMetadata {
        job_id: JobId,
        filename: String,
        download_locator: String,
    },
    /// Backend sent the terminal-success token.
    JobCompleted { job_id: JobId, at: DateTime<Utc> },
    /// Connection-level failure, including a stream that ended early.
    JobFailed {
        job_id: JobId,
        detail: String,
        at: DateTime<Utc>,
    },
    /// User asked for the file listing to be reloaded.
    RefreshFilesRequested,
    /// File listing collaborator answered.
    FilesLoaded(Vec<FileRow>),
    /// File listing collaborator failed.
    FilesFailed(String),
}
