mod common;

use common::{init_logging, submit};
use mediagrab_core::{update, AppState, Effect, FileRow, JobStatus, Msg};
use pretty_assertions::assert_eq;

#[test]
fn refresh_request_leaves_state_untouched() {
    init_logging();
    let (mut state, _) = submit(AppState::new(), "https://example.com/a");
    state.consume_dirty();

    let (next, effects) = update(state.clone(), Msg::RefreshFilesRequested);

    assert_eq!(next, state);
    assert_eq!(effects, vec![Effect::RefreshFiles]);
}

#[test]
fn file_listing_does_not_touch_jobs() {
    init_logging();
    let (state, job_id) = submit(AppState::new(), "https://example.com/a");
    let row = FileRow {
        name: "a.mp4".to_string(),
        size: 1,
        kind: "video".to_string(),
        modified_at: "2024-05-01T10:00:00Z".to_string(),
        download_url: "/files/a.mp4".to_string(),
    };

    let (state, effects) = update(state, Msg::FilesLoaded(vec![row.clone()]));

    assert!(effects.is_empty());
    assert_eq!(state.files(), &[row][..]);
    let job = state.job(job_id).expect("job kept");
    assert_eq!(job.status, JobStatus::Downloading);
    assert_eq!(job.progress_percent, 0.0);
}
