mod cli;
mod commands;
mod edition;
mod extract;
mod model;
mod source;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    match run() {
        Ok(0) => {}
        Ok(failures) => std::process::exit(exit_code(failures)),
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<usize> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Import(args) => commands::import::run(args),
        Commands::Export(args) => commands::export::run(args).map(|()| 0),
        Commands::Report(args) => commands::report::run(args),
        Commands::Status(args) => commands::status::run(args).map(|()| 0),
    }
}

fn exit_code(failures: usize) -> i32 {
    failures.min(255) as i32
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
