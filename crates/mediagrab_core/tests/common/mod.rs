#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use mediagrab_core::{update, AppState, Effect, JobId, MediaKind, Msg, SubmitRequest};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(mediagrab_logging::initialize_for_tests);
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn video_request(url: &str) -> SubmitRequest {
    SubmitRequest {
        url: url.to_string(),
        media_kind: MediaKind::Video,
        resolution: "720".to_string(),
        container: "mp4".to_string(),
    }
}

pub fn submit(state: AppState, url: &str) -> (AppState, JobId) {
    let (state, effects) = update(
        state,
        Msg::JobSubmitted {
            request: video_request(url),
            at: at(0),
        },
    );
    let job_id = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::OpenStream { job_id, .. } => Some(*job_id),
            _ => None,
        })
        .expect("open stream effect");
    (state, job_id)
}

pub fn progress(job_id: JobId, text: &str, percent: Option<f64>) -> Msg {
    Msg::JobProgress {
        job_id,
        text: text.to_string(),
        percent,
    }
}

pub fn metadata(job_id: JobId, filename: &str, locator: &str) -> Msg {
    Msg::JobMetadata {
        job_id,
        filename: filename.to_string(),
        download_locator: locator.to_string(),
    }
}

pub fn failed(job_id: JobId, detail: &str, secs: i64) -> Msg {
    Msg::JobFailed {
        job_id,
        detail: detail.to_string(),
        at: at(secs),
    }
}

/// Applies messages in order and collects every effect produced.
pub fn apply_all(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    msgs.into_iter()
        .fold((state, Vec::new()), |(state, mut effects), msg| {
            let (state, more) = update(state, msg);
            effects.extend(more);
            (state, effects)
        })
}
