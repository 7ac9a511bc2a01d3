use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use mediagrab_core::{MediaKind, SubmitRequest};

#[derive(Debug, Parser)]
#[command(
    name = "mediagrab",
    version,
    about = "Download media through a streaming transcode backend"
)]
pub struct Cli {
    /// RON config file; defaults to ./mediagrab.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Backend base URL, e.g. http://localhost:5000
    #[arg(long, global = true)]
    pub server: Option<String>,
    /// Log destination: terminal, file or both.
    #[arg(long, global = true)]
    pub log: Option<String>,
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit one job per URL and follow them to completion.
    Get(GetArgs),
    /// Show the files the backend has produced.
    Files,
}

#[derive(Debug, Args)]
pub struct GetArgs {
    #[arg(required = true)]
    pub urls: Vec<String>,
    /// Extract audio instead of downloading video.
    #[arg(long)]
    pub audio: bool,
    /// Maximum video height such as 720; empty means best available.
    #[arg(long, default_value = "")]
    pub resolution: String,
    /// Container: mp4, webm, mkv, avi, mov, flv, 3gp or best.
    #[arg(long, default_value = "best")]
    pub video_format: String,
    /// Save each finished artifact into this directory.
    #[arg(long)]
    pub save_to: Option<PathBuf>,
}

impl GetArgs {
    pub fn requests(&self) -> Vec<SubmitRequest> {
        let media_kind = if self.audio {
            MediaKind::Audio
        } else {
            MediaKind::Video
        };
        self.urls
            .iter()
            .map(|url| SubmitRequest {
                url: url.clone(),
                media_kind,
                resolution: self.resolution.clone(),
                container: self.video_format.clone(),
            })
            .collect()
    }
}
