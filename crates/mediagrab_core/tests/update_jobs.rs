mod common;

use common::{apply_all, at, failed, init_logging, metadata, progress, submit};
use mediagrab_core::{update, AppState, Effect, JobStatus, Msg};
use pretty_assertions::assert_eq;

#[test]
fn progress_metadata_then_completed_finishes_job() {
    init_logging();
    let (state, job_id) = submit(AppState::new(), "https://example.com/watch?v=x");

    let (state, effects) = apply_all(
        state,
        vec![
            progress(job_id, "10% downloading", Some(10.0)),
            progress(job_id, "55% downloading", Some(55.0)),
            metadata(job_id, "x.mp4", "/files/x.mp4"),
            Msg::JobCompleted { job_id, at: at(12) },
        ],
    );

    let job = state.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress_percent, 100.0);
    assert_eq!(job.output_filename.as_deref(), Some("x.mp4"));
    assert_eq!(job.download_locator.as_deref(), Some("/files/x.mp4"));
    assert_eq!(job.ended_at, Some(at(12)));
    assert_eq!(job.error_detail, None);
    assert_eq!(
        effects,
        vec![
            Effect::RefreshFiles,
            Effect::ArtifactReady {
                job_id,
                filename: Some("x.mp4".to_string()),
                download_locator: "/files/x.mp4".to_string(),
            },
        ]
    );

    let row = &state.view().jobs[0];
    assert_eq!(row.title(), "x.mp4");
    assert_eq!(row.elapsed_secs, Some(12));
}

#[test]
fn failure_keeps_last_progress_and_reports_detail() {
    init_logging();
    let (state, job_id) = submit(AppState::new(), "https://example.com/v");

    let (state, effects) = apply_all(
        state,
        vec![
            progress(job_id, "20% downloading", Some(20.0)),
            failed(job_id, "stream closed before completion", 3),
        ],
    );

    let job = state.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.progress_percent, 20.0);
    assert_eq!(
        job.error_detail.as_deref(),
        Some("stream closed before completion")
    );
    assert_eq!(job.ended_at, Some(at(3)));
    assert!(effects.is_empty());
}

#[test]
fn completion_without_metadata_leaves_filename_unset() {
    init_logging();
    let (state, job_id) = submit(AppState::new(), "https://example.com/v");

    let (state, effects) = update(state, Msg::JobCompleted { job_id, at: at(1) });

    let job = state.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.output_filename, None);
    assert_eq!(effects, vec![Effect::RefreshFiles]);
    assert_eq!(state.view().jobs[0].title(), "Processing...");
}

#[test]
fn failure_preserves_metadata_seen_before() {
    let (state, job_id) = submit(AppState::new(), "https://example.com/v");

    let (state, _) = apply_all(
        state,
        vec![
            metadata(job_id, "partial.webm", "/files/partial.webm"),
            failed(job_id, "network error", 5),
        ],
    );

    let job = state.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Error);
    assert_eq!(job.output_filename.as_deref(), Some("partial.webm"));
}

#[test]
fn later_metadata_overwrites_earlier() {
    let (state, job_id) = submit(AppState::new(), "https://example.com/v");

    let (state, _) = apply_all(
        state,
        vec![
            metadata(job_id, "a.mp4", "/files/a.mp4"),
            progress(job_id, "90%", Some(90.0)),
            metadata(job_id, "b.mp4", "/files/b.mp4"),
            metadata(job_id, "b.mp4", "/files/b.mp4"),
        ],
    );

    let job = state.job(job_id).unwrap();
    assert_eq!(job.status, JobStatus::Downloading);
    assert_eq!(job.output_filename.as_deref(), Some("b.mp4"));
    assert_eq!(job.download_locator.as_deref(), Some("/files/b.mp4"));
    assert_eq!(job.progress_percent, 90.0);
}

#[test]
fn progress_without_percent_only_updates_text() {
    let (state, job_id) = submit(AppState::new(), "https://example.com/v");

    let (mut state, _) = apply_all(
        state,
        vec![
            progress(job_id, "42.5% of 10MiB", Some(42.5)),
            progress(job_id, "Merging formats", None),
        ],
    );

    let job = state.job(job_id).unwrap();
    assert_eq!(job.progress_percent, 42.5);
    assert_eq!(job.progress_text.as_deref(), Some("Merging formats"));
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn progress_overwrites_and_is_clamped() {
    let (state, job_id) = submit(AppState::new(), "https://example.com/v");

    let (state, _) = update(state, progress(job_id, "250%", Some(250.0)));
    assert_eq!(state.job(job_id).unwrap().progress_percent, 100.0);

    let (state, _) = update(state, progress(job_id, "30%", Some(30.0)));
    assert_eq!(state.job(job_id).unwrap().progress_percent, 30.0);

    let (state, _) = update(state, progress(job_id, "nan", Some(f64::NAN)));
    assert_eq!(state.job(job_id).unwrap().progress_percent, 30.0);
}

#[test]
fn interleaved_jobs_reach_independent_terminal_states() {
    init_logging();
    let (state, first) = submit(AppState::new(), "https://example.com/one");
    let (state, second) = submit(state, "https://example.com/two");
    assert_ne!(first, second);

    let (state, effects) = apply_all(
        state,
        vec![
            progress(first, "5%", Some(5.0)),
            progress(second, "70%", Some(70.0)),
            metadata(second, "two.mp3", "/files/two.mp3"),
            progress(first, "15%", Some(15.0)),
            Msg::JobCompleted {
                job_id: second,
                at: at(4),
            },
            failed(first, "http status 502", 6),
        ],
    );

    let one = state.job(first).unwrap();
    assert_eq!(one.status, JobStatus::Error);
    assert_eq!(one.progress_percent, 15.0);
    assert_eq!(one.output_filename, None);

    let two = state.job(second).unwrap();
    assert_eq!(two.status, JobStatus::Completed);
    assert_eq!(two.output_filename.as_deref(), Some("two.mp3"));

    let refreshes = effects
        .iter()
        .filter(|effect| matches!(effect, Effect::RefreshFiles))
        .count();
    assert_eq!(refreshes, 1);
    assert!(state.all_terminal());

    let view = state.view();
    assert_eq!(view.job_count, 2);
    assert_eq!(view.completed_count, 1);
    assert_eq!(view.failed_count, 1);
    assert_eq!(view.active_count, 0);
    // Newest first.
    assert_eq!(view.jobs[0].job_id, second);
    assert_eq!(view.jobs[1].job_id, first);
}

#[test]
fn events_for_unknown_job_are_ignored() {
    let (mut state, job_id) = submit(AppState::new(), "https://example.com/v");
    assert!(state.consume_dirty());
    let stranger = mediagrab_core::JobId::new(job_id.get() + 100);

    let (mut next, effects) = apply_all(
        state.clone(),
        vec![
            progress(stranger, "50%", Some(50.0)),
            Msg::JobCompleted {
                job_id: stranger,
                at: at(1),
            },
        ],
    );

    assert_eq!(next, state);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
