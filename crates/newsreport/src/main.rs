#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use newsreport::cli::app::Cli;
use newsreport::cli::commands;
use newsreport::config::{ConfigFailure, RuntimeEnv};
use newsreport::sqlite::{ConnectionFailure, SetupFailure};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_DATABASE_FAILURE: i32 = 2;
const EXIT_USAGE_ERROR: i32 = 64;

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();

    match execute(&cli) {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            let exit_code = classify_runtime_error(&error);
            eprintln!("newsreport: failed (exit_code={exit_code})");
            eprintln!("{error:#}");
            exit_code
        }
    }
}

fn execute(cli: &Cli) -> Result<()> {
    let env = RuntimeEnv::from_process()?;
    commands::report::run(&cli.report, &env)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn classify_runtime_error(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<ConfigFailure>().is_some() {
        EXIT_USAGE_ERROR
    } else if error.downcast_ref::<ConnectionFailure>().is_some()
        || error.downcast_ref::<SetupFailure>().is_some()
    {
        EXIT_DATABASE_FAILURE
    } else {
        EXIT_RUNTIME_FAILURE
    }
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}
