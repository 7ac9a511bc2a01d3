use crate::{submit, AppState, Effect, JobStatus, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Job messages addressed to an unknown or terminal job are ignored, so a
/// completed or failed record never changes again.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::JobSubmitted { request, at } => match submit::validate(&request) {
            Ok(params) => {
                let job_id = state.insert_job(params.clone(), at);
                vec![Effect::OpenStream { job_id, params }]
            }
            Err(err) => {
                state.reject_submission(err);
                Vec::new()
            }
        },
        Msg::JobProgress {
            job_id,
            text,
            percent,
        } => {
            if let Some(job) = state.active_job_mut(job_id) {
                job.progress_text = Some(text);
                if let Some(percent) = percent.filter(|p| p.is_finite()) {
                    job.progress_percent = percent.clamp(0.0, 100.0);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::JobMetadata {
            job_id,
            filename,
            download_locator,
        } => {
            if let Some(job) = state.active_job_mut(job_id) {
                job.output_filename = Some(filename);
                job.download_locator = Some(download_locator);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::JobCompleted { job_id, at } => match state.active_job_mut(job_id) {
            Some(job) => {
                job.status = JobStatus::Completed;
                job.progress_percent = 100.0;
                job.ended_at = Some(at);

                let mut effects = vec![Effect::RefreshFiles];
                if let Some(download_locator) = job.download_locator.clone() {
                    effects.push(Effect::ArtifactReady {
                        job_id,
                        filename: job.output_filename.clone(),
                        download_locator,
                    });
                }
                state.mark_dirty();
                effects
            }
            None => Vec::new(),
        },
        Msg::JobFailed { job_id, detail, at } => {
            if let Some(job) = state.active_job_mut(job_id) {
                job.status = JobStatus::Error;
                job.error_detail = Some(detail);
                job.ended_at = Some(at);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RefreshFilesRequested => vec![Effect::RefreshFiles],
        Msg::FilesLoaded(files) => {
            state.set_files(files);
            Vec::new()
        }
        Msg::FilesFailed(message) => {
            state.set_files_error(message);
            Vec::new()
        }
    };

    (state, effects)
}
