use crate::{JobId, JobParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the progress stream for a freshly created job.
    OpenStream { job_id: JobId, params: JobParams },
    /// Reload the file listing. Emitted once per completed job.
    RefreshFiles,
    /// A completed job announced where its artifact can be fetched.
    ArtifactReady {
        job_id: JobId,
        filename: Option<String>,
        download_locator: String,
    },
}
