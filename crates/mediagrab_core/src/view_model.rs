use crate::{FileRow, JobId, JobRecord, JobStatus, MediaKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub jobs: Vec<JobRowView>,
    pub job_count: usize,
    pub active_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub files: Vec<FileRow>,
    pub files_error: Option<String>,
    pub last_rejection: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub url: String,
    pub media_kind: MediaKind,
    pub resolution: Option<u32>,
    pub container: &'static str,
    pub status: JobStatus,
    pub progress_percent: f64,
    pub progress_text: Option<String>,
    pub output_filename: Option<String>,
    pub download_locator: Option<String>,
    pub error_detail: Option<String>,
    /// Whole seconds between start and terminal transition.
    pub elapsed_secs: Option<i64>,
}

impl JobRowView {
    /// Heading for the row: the announced filename once known.
    pub fn title(&self) -> &str {
        self.output_filename.as_deref().unwrap_or("Processing...")
    }
}

impl From<&JobRecord> for JobRowView {
    fn from(job: &JobRecord) -> Self {
        Self {
            job_id: job.id,
            url: job.params.url.clone(),
            media_kind: job.params.media_kind,
            resolution: job.params.resolution,
            container: job.params.container.as_token(),
            status: job.status,
            progress_percent: job.progress_percent,
            progress_text: job.progress_text.clone(),
            output_filename: job.output_filename.clone(),
            download_locator: job.download_locator.clone(),
            error_detail: job.error_detail.clone(),
            elapsed_secs: job
                .ended_at
                .map(|ended| (ended - job.started_at).num_seconds()),
        }
    }
}
