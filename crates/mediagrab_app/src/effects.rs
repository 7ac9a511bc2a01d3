use std::path::PathBuf;

use chrono::{DateTime, Utc};
use mediagrab_core::{Effect, FileRow, JobId, JobParams, Msg};
use mediagrab_engine::{EngineEvent, EngineHandle, FileEntry, ProtocolEvent, StreamRequest};
use mediagrab_logging::{mediagrab_info, mediagrab_warn};

/// Executes effects returned by `update` against the engine and tracks the
/// requests still waiting for an answer.
pub struct EffectRunner<'a> {
    engine: &'a EngineHandle,
    save_to: Option<PathBuf>,
    pending_listings: usize,
    pending_saves: usize,
}

impl<'a> EffectRunner<'a> {
    pub fn new(engine: &'a EngineHandle, save_to: Option<PathBuf>) -> Self {
        Self {
            engine,
            save_to,
            pending_listings: 0,
            pending_saves: 0,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream { job_id, params } => {
                    mediagrab_info!(
                        "OpenStream job_id={} format={} url={}",
                        job_id,
                        params.media_kind,
                        params.url
                    );
                    self.engine
                        .open_stream(job_id.get(), stream_request(&params));
                }
                Effect::RefreshFiles => {
                    self.pending_listings += 1;
                    self.engine.list_files();
                }
                Effect::ArtifactReady {
                    job_id,
                    filename,
                    download_locator,
                } => {
                    if let Some(dir) = &self.save_to {
                        self.pending_saves += 1;
                        self.engine
                            .retrieve(job_id.get(), download_locator, filename, dir.clone());
                    }
                }
            }
        }
    }

    /// Books an engine answer against the outstanding requests.
    pub fn settle(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::FilesListed(_) => {
                self.pending_listings = self.pending_listings.saturating_sub(1);
            }
            EngineEvent::ArtifactSaved { .. } => {
                self.pending_saves = self.pending_saves.saturating_sub(1);
            }
            EngineEvent::Stream { .. }
            | EngineEvent::StreamFailed { .. }
            | EngineEvent::Interrupted => {}
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending_listings == 0 && self.pending_saves == 0
    }
}

pub fn stream_request(params: &JobParams) -> StreamRequest {
    StreamRequest {
        url: params.url.clone(),
        format: params.media_kind.as_query().to_string(),
        resolution: params.resolution_query(),
        video_format: params.container_query().to_string(),
    }
}

/// Translates an engine event into a state machine message.
///
/// Saved artifacts are only logged; they never change job state.
pub fn map_event(event: EngineEvent, at: DateTime<Utc>) -> Option<Msg> {
    match event {
        EngineEvent::Stream { job_id, event } => {
            let job_id = JobId::new(job_id);
            Some(match event {
                ProtocolEvent::Progress { text, percent } => Msg::JobProgress {
                    job_id,
                    text,
                    percent,
                },
                ProtocolEvent::Metadata(info) => Msg::JobMetadata {
                    job_id,
                    filename: info.filename,
                    download_locator: info.download_url,
                },
                ProtocolEvent::Completed => Msg::JobCompleted { job_id, at },
            })
        }
        EngineEvent::StreamFailed { job_id, error } => Some(Msg::JobFailed {
            job_id: JobId::new(job_id),
            detail: error.to_string(),
            at,
        }),
        EngineEvent::FilesListed(Ok(files)) => {
            Some(Msg::FilesLoaded(files.into_iter().map(file_row).collect()))
        }
        EngineEvent::FilesListed(Err(err)) => {
            mediagrab_warn!("File listing failed: {}", err);
            Some(Msg::FilesFailed(err.to_string()))
        }
        EngineEvent::ArtifactSaved { job_id, result } => {
            match result {
                Ok(path) => mediagrab_info!("Job {} saved to {:?}", job_id, path),
                Err(err) => mediagrab_warn!("Job {} could not be saved: {}", job_id, err),
            }
            None
        }
        EngineEvent::Interrupted => None,
    }
}

fn file_row(entry: FileEntry) -> FileRow {
    FileRow {
        name: entry.name,
        size: entry.size,
        kind: entry.kind,
        modified_at: entry.mod_time,
        download_url: entry.download_url,
    }
}
