use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use mediagrab_logging::{mediagrab_info, mediagrab_warn};
use tokio_util::sync::CancellationToken;

use crate::fetch::{BackendClient, FileLister, StreamSettings};
use crate::stream::{ChannelProgressSink, JobStreamer};
use crate::{EngineEvent, FailureKind, FetchError, JobId, StreamRequest};

enum EngineCommand {
    OpenStream {
        job_id: JobId,
        request: StreamRequest,
    },
    Cancel {
        job_id: JobId,
    },
    CancelAll,
    ListFiles,
    Retrieve {
        job_id: JobId,
        locator: String,
        filename: Option<String>,
        dir: PathBuf,
    },
    Interrupt,
    WatchInterrupt,
}

/// Work the engine can cancel: a job's stream, a file listing, or an artifact save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TaskKey {
    Stream(JobId),
    Listing(u64),
    Save(JobId),
}

/// Cancellation tokens of the tasks still running.
#[derive(Clone, Default)]
struct ActiveTasks {
    tokens: Arc<Mutex<HashMap<TaskKey, CancellationToken>>>,
    listings: Arc<AtomicU64>,
}

impl ActiveTasks {
    fn next_listing(&self) -> TaskKey {
        TaskKey::Listing(self.listings.fetch_add(1, Ordering::Relaxed))
    }

    fn register(&self, key: TaskKey) -> CancellationToken {
        let token = CancellationToken::new();
        self.lock().insert(key, token.clone());
        token
    }

    fn release(&self, key: TaskKey) {
        self.lock().remove(&key);
    }

    fn cancel(&self, key: TaskKey) -> bool {
        match self.lock().get(&key) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    fn cancel_all(&self) -> usize {
        let tokens = self.lock();
        for token in tokens.values() {
            token.cancel();
        }
        tokens.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TaskKey, CancellationToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs backend IO on a background tokio runtime.
///
/// Every stream is its own task; events come back through [`EngineHandle::try_recv`]
/// in stream order per job.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: StreamSettings) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let client = Arc::new(BackendClient::new(settings));
        let runtime = tokio::runtime::Runtime::new()?;
        let active = ActiveTasks::default();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &client, &active, command, &event_tx);
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn open_stream(&self, job_id: JobId, request: StreamRequest) {
        self.send(EngineCommand::OpenStream { job_id, request });
    }

    /// Aborts a job's connection; the job then fails as cancelled.
    pub fn cancel(&self, job_id: JobId) {
        self.send(EngineCommand::Cancel { job_id });
    }

    pub fn cancel_all(&self) {
        self.send(EngineCommand::CancelAll);
    }

    pub fn list_files(&self) {
        self.send(EngineCommand::ListFiles);
    }

    pub fn retrieve(
        &self,
        job_id: JobId,
        locator: impl Into<String>,
        filename: Option<String>,
        dir: PathBuf,
    ) {
        self.send(EngineCommand::Retrieve {
            job_id,
            locator: locator.into(),
            filename,
            dir,
        });
    }

    /// Cancels every running task and reports [`EngineEvent::Interrupted`].
    pub fn interrupt(&self) {
        self.send(EngineCommand::Interrupt);
    }

    /// Treats every Ctrl-C the process receives like [`EngineHandle::interrupt`].
    pub fn watch_interrupt(&self) {
        self.send(EngineCommand::WatchInterrupt);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

fn handle_command(
    runtime: &tokio::runtime::Runtime,
    client: &Arc<BackendClient>,
    active: &ActiveTasks,
    command: EngineCommand,
    event_tx: &mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::OpenStream { job_id, request } => {
            let key = TaskKey::Stream(job_id);
            let token = active.register(key);
            let client = client.clone();
            let active = active.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let sink = ChannelProgressSink::new(event_tx.clone());
                if let Err(error) = client.stream(job_id, &request, &token, &sink).await {
                    mediagrab_warn!("Job {} failed: {}", job_id, error);
                    let _ = event_tx.send(EngineEvent::StreamFailed { job_id, error });
                }
                active.release(key);
            });
        }
        EngineCommand::Cancel { job_id } => {
            if active.cancel(TaskKey::Stream(job_id)) {
                mediagrab_info!("Cancelling job {}", job_id);
            }
        }
        EngineCommand::CancelAll => {
            let count = active.cancel_all();
            mediagrab_info!("Cancelling {} running tasks", count);
        }
        EngineCommand::ListFiles => {
            let key = active.next_listing();
            let token = active.register(key);
            let client = client.clone();
            let active = active.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        Err(FetchError::new(FailureKind::Cancelled, "file listing aborted"))
                    }
                    result = client.list_files() => result,
                };
                active.release(key);
                let _ = event_tx.send(EngineEvent::FilesListed(result));
            });
        }
        EngineCommand::Retrieve {
            job_id,
            locator,
            filename,
            dir,
        } => {
            let key = TaskKey::Save(job_id);
            let token = active.register(key);
            let client = client.clone();
            let active = active.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => Err("cancelled: save aborted".to_string()),
                    result = client.retrieve(&locator, filename.as_deref(), &dir) => {
                        result.map_err(|err| err.to_string())
                    }
                };
                active.release(key);
                let _ = event_tx.send(EngineEvent::ArtifactSaved { job_id, result });
            });
        }
        EngineCommand::Interrupt => interrupt(active, event_tx),
        EngineCommand::WatchInterrupt => {
            let active = active.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    interrupt(&active, &event_tx);
                }
            });
        }
    }
}

fn interrupt(active: &ActiveTasks, event_tx: &mpsc::Sender<EngineEvent>) {
    let count = active.cancel_all();
    mediagrab_warn!("Interrupted; cancelling {} running tasks", count);
    let _ = event_tx.send(EngineEvent::Interrupted);
}
