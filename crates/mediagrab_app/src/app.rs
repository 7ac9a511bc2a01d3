use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Utc;
use mediagrab_core::{update, AppState, AppViewModel, JobId, Msg};
use mediagrab_engine::{EngineEvent, EngineHandle};
use mediagrab_logging::mediagrab_info;

use crate::cli::{Cli, Command};
use crate::config::{log_level, AppConfig};
use crate::effects::{map_event, EffectRunner};
use crate::render;

const POLL_INTERVAL: Duration = Duration::from_millis(75);
/// How long cancelled jobs get to report back after Ctrl-C.
const INTERRUPT_GRACE: Duration = Duration::from_secs(2);
const INTERRUPTED_EXIT: u8 = 130;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    mediagrab_logging::initialize(config.log_destination()?, log_level(cli.verbose));
    mediagrab_info!("Using backend {}", config.base_url);

    let engine = EngineHandle::new(config.stream_settings()).context("failed to start engine")?;
    engine.watch_interrupt();

    match cli.command {
        Command::Get(args) => {
            let mut session = Session::new(&engine, config.save_to.clone());
            for request in args.requests() {
                let url = request.url.clone();
                let before = session.state.job_count();
                session.dispatch(Msg::JobSubmitted {
                    request,
                    at: Utc::now(),
                });
                if session.state.job_count() == before {
                    if let Some(err) = session.state.last_rejection() {
                        eprintln!("Skipping {:?}: {}", url, err);
                    }
                }
            }
            if session.state.job_count() == 0 {
                return Ok(ExitCode::from(2));
            }

            let interrupted = session.run_until_settled();

            let view = session.state.view();
            println!("{}", render::summary_line(&view));
            if interrupted {
                Ok(ExitCode::from(INTERRUPTED_EXIT))
            } else if view.failed_count > 0 {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Files => {
            let mut session = Session::new(&engine, None);
            session.dispatch(Msg::RefreshFilesRequested);
            if session.run_until_settled() {
                return Ok(ExitCode::from(INTERRUPTED_EXIT));
            }

            let view = session.state.view();
            if let Some(err) = view.files_error {
                eprintln!("Could not list files: {}", err);
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Owns the state machine for one CLI invocation and feeds it engine events.
struct Session<'a> {
    state: AppState,
    engine: &'a EngineHandle,
    runner: EffectRunner<'a>,
    printed: HashMap<JobId, String>,
}

impl<'a> Session<'a> {
    fn new(engine: &'a EngineHandle, save_to: Option<PathBuf>) -> Self {
        Self {
            state: AppState::new(),
            engine,
            runner: EffectRunner::new(engine, save_to),
            printed: HashMap::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let listing = matches!(msg, Msg::FilesLoaded(_));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;
        self.runner.enqueue(effects);

        if let Some(view) = view {
            self.render(&view, listing);
        }
    }

    fn render(&mut self, view: &AppViewModel, listing: bool) {
        // Oldest first on the terminal so new jobs append below.
        for job in view.jobs.iter().rev() {
            let line = render::job_line(job);
            if self.printed.get(&job.job_id) != Some(&line) {
                println!("{}", line);
                self.printed.insert(job.job_id, line);
            }
        }
        if listing {
            println!("Files on server:");
            for line in render::render_files(&view.files) {
                println!("  {}", line);
            }
        }
    }

    /// Blocks until no job is downloading and every side request was answered.
    ///
    /// After an interrupt only the jobs are waited for, and at most for
    /// [`INTERRUPT_GRACE`]; a second interrupt stops at once. Returns whether
    /// the session was interrupted.
    fn run_until_settled(&mut self) -> bool {
        let mut interruption = Interruption::default();
        loop {
            let drained = self.state.all_terminal()
                && (interruption.is_set() || self.runner.is_idle());
            if drained || interruption.expired(Instant::now()) {
                break;
            }
            let Some(event) = self.engine.recv_timeout(POLL_INTERVAL) else {
                continue;
            };
            if event == EngineEvent::Interrupted {
                interruption.record(Instant::now());
                continue;
            }
            self.runner.settle(&event);
            if let Some(msg) = map_event(event, Utc::now()) {
                self.dispatch(msg);
            }
        }
        interruption.is_set()
    }
}

/// Ctrl-C presses seen while a session drains.
#[derive(Debug, Default)]
struct Interruption {
    first_at: Option<Instant>,
    presses: u32,
}

impl Interruption {
    fn record(&mut self, now: Instant) {
        self.presses += 1;
        self.first_at.get_or_insert(now);
    }

    fn is_set(&self) -> bool {
        self.presses > 0
    }

    fn expired(&self, now: Instant) -> bool {
        self.presses > 1
            || self
                .first_at
                .is_some_and(|at| now.duration_since(at) >= INTERRUPT_GRACE)
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use mediagrab_engine::StreamSettings;

    use super::*;

    #[test]
    fn interruption_expires_after_grace_or_second_press() {
        let start = Instant::now();
        let mut interruption = Interruption::default();
        assert!(!interruption.is_set());
        assert!(!interruption.expired(start));

        interruption.record(start);
        assert!(interruption.is_set());
        assert!(!interruption.expired(start + Duration::from_millis(500)));
        assert!(interruption.expired(start + INTERRUPT_GRACE));

        interruption.record(start + Duration::from_millis(10));
        assert!(interruption.expired(start + Duration::from_millis(10)));
    }

    #[test]
    fn interrupt_stops_waiting_on_an_unanswered_listing() {
        // Accepted by the kernel backlog, never answered.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let engine = EngineHandle::new(StreamSettings {
            base_url,
            ..StreamSettings::default()
        })
        .unwrap();

        let mut session = Session::new(&engine, None);
        session.dispatch(Msg::RefreshFilesRequested);
        assert!(!session.runner.is_idle());
        engine.interrupt();

        let started = Instant::now();
        assert!(session.run_until_settled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
