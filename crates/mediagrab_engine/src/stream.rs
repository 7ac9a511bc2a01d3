use futures_util::StreamExt;
use mediagrab_logging::{mediagrab_debug, mediagrab_info};
use tokio_util::sync::CancellationToken;

use crate::decode::StreamDecoder;
use crate::fetch::{map_reqwest_error, BackendClient};
use crate::{EngineEvent, FailureKind, FetchError, JobId, ProtocolEvent, StreamRequest};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Events delivered to the sink, the final `Completed` included.
    pub events: usize,
}

#[async_trait::async_trait]
pub trait JobStreamer: Send + Sync {
    /// Follows a job's progress stream, emitting each decoded event to `sink`
    /// in stream order.
    ///
    /// Returns `Ok` only once the terminal-success event was delivered. Any
    /// other ending, including a clean EOF or cancellation, is an error.
    async fn stream(
        &self,
        job_id: JobId,
        request: &StreamRequest,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<StreamSummary, FetchError>;
}

#[async_trait::async_trait]
impl JobStreamer for BackendClient {
    async fn stream(
        &self,
        job_id: JobId,
        request: &StreamRequest,
        cancel: &CancellationToken,
        sink: &dyn ProgressSink,
    ) -> Result<StreamSummary, FetchError> {
        let url = self.stream_url(request)?;
        let client = self.build_client()?;
        mediagrab_info!("Opening stream for job {} at {}", job_id, url);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(FetchError::new(FailureKind::Cancelled, "cancelled before response"));
            }
            result = client.get(url).send() => result.map_err(map_reqwest_error)?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let mut decoder = StreamDecoder::new();
        let mut delivered = 0;
        let mut body = response.bytes_stream();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(FetchError::new(FailureKind::Cancelled, "connection aborted"));
                }
                next = body.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(map_reqwest_error)?;

            for event in decoder.push(&chunk) {
                let completed = matches!(event, ProtocolEvent::Completed);
                sink.emit(EngineEvent::Stream { job_id, event });
                delivered += 1;
                if completed {
                    mediagrab_info!("Job {} completed after {} events", job_id, delivered);
                    return Ok(StreamSummary { events: delivered });
                }
            }
        }

        let discarded = decoder.finish();
        if discarded > 0 {
            mediagrab_debug!(
                "Job {} stream ended with {} bytes of unterminated line",
                job_id,
                discarded
            );
        }
        Err(FetchError::new(
            FailureKind::ClosedEarly,
            format!("stream ended after {delivered} events"),
        ))
    }
}
