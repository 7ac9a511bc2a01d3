//! Mediagrab engine: progress stream decoding and backend IO.
mod decode;
mod engine;
mod fetch;
mod persist;
mod progress;
mod stream;
mod types;

pub use decode::{classify_payload, decode_line, StreamDecoder};
pub use engine::EngineHandle;
pub use fetch::{BackendClient, FileLister, StreamSettings};
pub use persist::{ensure_output_dir, safe_filename, ArtifactWriter, PersistError};
pub use progress::extract_percent;
pub use stream::{ChannelProgressSink, JobStreamer, ProgressSink, StreamSummary};
pub use types::{
    ArtifactInfo, EngineEvent, FailureKind, FetchError, FileEntry, JobId, ProtocolEvent,
    StreamRequest,
};
