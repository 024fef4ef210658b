//! CLI argument definitions for `dt`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "dt",
    version,
    about = "Normalize bank and card CSV exports into a deduplicated transaction ledger",
    long_about = "Normalize bank and card CSV exports into a deduplicated transaction ledger.\n\n\
                  Each input format is described by a saved profile: an ordered list of\n\
                  declarative transforms that map the export onto date, description,\n\
                  institution, type and amount columns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (-v stages and counts, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Store directory (default: `dt.db` next to the executable).
    #[arg(long = "store", value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Transform CSV files and commit the resulting transactions.
    Transform(TransformArgs),

    /// Manage saved profiles.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Inspect stored transactions.
    #[command(subcommand)]
    Records(RecordsCommand),
}

#[derive(Parser)]
pub struct TransformArgs {
    /// CSV files, or directories containing CSV files.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Saved profile name, or path to a profile JSON file.
    #[arg(short = 'c', long = "config", value_name = "NAME|FILE")]
    pub config: String,

    /// Write to this CSV file instead of the store.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Append to the output file instead of overwriting it.
    #[arg(short = 'a', long = "append", requires = "output")]
    pub append: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Save a profile file under its file stem.
    Add {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// List saved profiles.
    List,
    /// Delete a saved profile.
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Show a saved profile and its transforms.
    Info {
        #[arg(value_name = "NAME")]
        name: String,
    },
}

#[derive(Subcommand)]
pub enum RecordsCommand {
    /// Print stored transactions, oldest first.
    List,
    /// Print the number of stored transactions.
    Count,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
