mod access;
mod cli;
mod config;
mod engine;
mod error;
mod identity;
mod lifecycle;
mod model;
mod notify;
mod retry;
mod storage;

use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

use config::Config;

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roster=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(failure) = cli::run(&config) {
        eprintln!("Error: {failure}");
        process::exit(failure.code);
    }
}
