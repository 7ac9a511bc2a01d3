use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::submit::{JobParams, SubmitError};
use crate::view_model::{AppViewModel, JobRowView};

/// Client-assigned job identity. Never derived from server data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Downloading,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Downloading)
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Downloading => "Downloading",
            JobStatus::Completed => "Completed",
            JobStatus::Error => "Failed",
        }
    }
}

/// Everything known about one submitted download.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: JobId,
    pub params: JobParams,
    pub status: JobStatus,
    pub progress_percent: f64,
    pub progress_text: Option<String>,
    pub output_filename: Option<String>,
    pub download_locator: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error_detail: Option<String>,
}

impl JobRecord {
    fn new(id: JobId, params: JobParams, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            params,
            status: JobStatus::Downloading,
            progress_percent: 0.0,
            progress_text: None,
            output_filename: None,
            download_locator: None,
            started_at,
            ended_at: None,
            error_detail: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One entry of the backend's file listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub name: String,
    pub size: u64,
    pub kind: String,
    pub modified_at: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    jobs: BTreeMap<JobId, JobRecord>,
    next_job_id: u64,
    files: Vec<FileRow>,
    files_error: Option<String>,
    last_rejection: Option<SubmitError>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            jobs: BTreeMap::new(),
            next_job_id: 1,
            files: Vec::new(),
            files_error: None,
            last_rejection: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self, job_id: JobId) -> Option<&JobRecord> {
        self.jobs.get(&job_id)
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// True when no job is still downloading.
    pub fn all_terminal(&self) -> bool {
        self.jobs.values().all(JobRecord::is_terminal)
    }

    pub fn files(&self) -> &[FileRow] {
        &self.files
    }

    pub fn last_rejection(&self) -> Option<&SubmitError> {
        self.last_rejection.as_ref()
    }

    pub fn view(&self) -> AppViewModel {
        // Newest submission first.
        let jobs: Vec<JobRowView> = self.jobs.values().rev().map(JobRowView::from).collect();
        let count = |status: JobStatus| jobs.iter().filter(|job| job.status == status).count();

        AppViewModel {
            job_count: jobs.len(),
            active_count: count(JobStatus::Downloading),
            completed_count: count(JobStatus::Completed),
            failed_count: count(JobStatus::Error),
            jobs,
            files: self.files.clone(),
            files_error: self.files_error.clone(),
            last_rejection: self.last_rejection.as_ref().map(ToString::to_string),
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn insert_job(&mut self, params: JobParams, at: DateTime<Utc>) -> JobId {
        let id = JobId::new(self.next_job_id);
        self.next_job_id += 1;
        self.jobs.insert(id, JobRecord::new(id, params, at));
        self.last_rejection = None;
        self.mark_dirty();
        id
    }

    pub(crate) fn reject_submission(&mut self, err: SubmitError) {
        self.last_rejection = Some(err);
        self.mark_dirty();
    }

    /// Mutable access to a job that still accepts stream events.
    ///
    /// Unknown ids and terminal jobs yield `None`; the caller then does nothing.
    pub(crate) fn active_job_mut(&mut self, job_id: JobId) -> Option<&mut JobRecord> {
        self.jobs.get_mut(&job_id).filter(|job| !job.is_terminal())
    }

    pub(crate) fn set_files(&mut self, files: Vec<FileRow>) {
        self.files = files;
        self.files_error = None;
        self.mark_dirty();
    }

    pub(crate) fn set_files_error(&mut self, message: String) {
        self.files_error = Some(message);
        self.mark_dirty();
    }
}
