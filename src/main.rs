mod args;
mod etl;

use clap::Parser;
use log::{info, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::etl::run_pipeline;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    info!("args: {:?}", args);

    match run_pipeline(&args) {
        Ok(outcome) if outcome.failed_tables.is_empty() => {
            info!("Tables: {:?}", outcome.summary);
            info!("Database operations completed.");
        }
        Ok(outcome) => {
            warn!(
                "Database operations completed with failures: {:?}",
                outcome.failed_tables
            );
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("An error occured: {}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                eprintln!("trace: {}", bt);
            }
            std::process::exit(1);
        }
    }
}
