//! `dt` command-line entry point.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use dt::logging::{LogConfig, LogFormat, init_logging};
use dt::persistence::SledStore;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::commands::{run_config, run_records, run_transform};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    let mut store = match SledStore::open(&store_path) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Transform(args) => run_transform(args, &mut store, cli.verbose > 0),
        Command::Config(command) => run_config(command, &store),
        Command::Records(command) => run_records(command, &store),
    };
    if let Err(error) = result {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    LogConfig::from_verbosity(cli.verbose)
        .with_format(format)
        .with_ansi(cli.log_file.is_none() && io::stderr().is_terminal())
        .with_log_file(cli.log_file.clone())
}

fn default_store_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("dt.db")))
        .unwrap_or_else(|| PathBuf::from("dt.db"))
}
