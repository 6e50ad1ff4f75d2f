//! sq2cql CLI entry point.

use std::{
    env,
    io::{self, Write},
    process,
    str::FromStr,
};

use log::{LevelFilter, debug, info};

use sq2cql::RetrievalTranslator;
use sq2cql_cli::{Startup, error::EXIT_SUCCESS};

fn main() {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    // Parse configuration first
    let args = match sq2cql_cli::parse_args(env::args_os(), &mut stdout, &mut stderr) {
        Startup::Exit(code) => {
            let _ = stdout.flush();
            process::exit(code);
        }
        Startup::Proceed(args) => args,
    };

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting sq2cql");
    debug!(args:?; "Parsed arguments");

    let code = sq2cql_cli::execute(&args, &RetrievalTranslator, &mut stdout, &mut stderr);
    if code != EXIT_SUCCESS {
        let _ = stdout.flush();
        process::exit(code);
    }

    info!("Completed successfully");
}
