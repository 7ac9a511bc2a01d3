mod app;
mod cli;
mod config;
mod effects;
mod render;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match app::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("mediagrab: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
