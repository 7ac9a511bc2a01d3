//! Mediagrab core: pure job state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod submit;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{AppState, FileRow, JobId, JobRecord, JobStatus};
pub use submit::{validate, Container, JobParams, MediaKind, SubmitError, SubmitRequest};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView};
