//! Optional RON config file, overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use log::LevelFilter;
use mediagrab_engine::StreamSettings;
use mediagrab_logging::LogDestination;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Command};

pub const DEFAULT_CONFIG_FILE: &str = "mediagrab.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub save_to: Option<PathBuf>,
    pub log: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: StreamSettings::default().base_url,
            connect_timeout_secs: 10,
            save_to: None,
            log: "terminal".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads the config file. An explicitly named file must exist; the
    /// default file is optional.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {:?}", path));
            }
        };
        Self::parse(&content).with_context(|| format!("failed to parse config {:?}", path))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.base_url = server.clone();
        }
        if let Some(log) = &cli.log {
            self.log = log.clone();
        }
        if let Command::Get(args) = &cli.command {
            if let Some(dir) = &args.save_to {
                self.save_to = Some(dir.clone());
            }
        }
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..StreamSettings::default()
        }
    }

    pub fn log_destination(&self) -> anyhow::Result<LogDestination> {
        LogDestination::from_name(&self.log)
            .ok_or_else(|| anyhow!("unknown log destination {:?}", self.log))
    }
}

pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
