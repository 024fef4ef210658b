//! Command implementations for the `dt` binary.

use std::path::Path;

use tracing::info;

use dt::config::Configuration;
use dt::error::{PipelineError, PipelineResult};
use dt::execution::{PipelineEvent, Transformer};
use dt::ingestion::discover_csv_paths;
use dt::persistence::{CsvExport, SledStore, TransactionStore};

use crate::cli::{ConfigCommand, RecordsCommand, TransformArgs};

/// Run a profile over the given inputs and commit (or export) the records.
pub fn run_transform(args: &TransformArgs, store: &mut SledStore, verbose: bool) -> PipelineResult<()> {
    let configuration = resolve_configuration(&args.config, store)?;
    let transformer = Transformer::from_configuration(&configuration)?.with_verbose(verbose);
    let paths = discover_csv_paths(&args.paths)?;
    info!(profile = %configuration.name, files = paths.len(), "starting transform");

    let batch = transformer.transform_files(&paths, configuration.headers)?;

    match &args.output {
        Some(output) => {
            let written = CsvExport::new(output).write(&batch, args.append)?;
            info!(path = %output.display(), written, "wrote transactions");
        }
        None => {
            let summary = batch.commit(store)?;
            store.flush()?;
            transformer.emit(PipelineEvent::RecordsCommitted {
                added: summary.added,
                skipped: summary.skipped,
            });
        }
    }
    Ok(())
}

pub fn run_config(command: &ConfigCommand, store: &SledStore) -> PipelineResult<()> {
    match command {
        ConfigCommand::Add { file } => {
            let name = profile_name(file)?;
            let document = std::fs::read_to_string(file)?;
            store.add_profile(&name, &document)?;
            store.flush()?;
            println!("Saved profile '{name}'");
        }
        ConfigCommand::List => {
            let names = store.list_profiles()?;
            println!("Saved profiles ({})\n-----", names.len());
            for (index, name) in names.iter().enumerate() {
                println!("{}| {name}", index + 1);
            }
        }
        ConfigCommand::Delete { name } => {
            store.delete_profile(name)?;
            store.flush()?;
            println!("Deleted profile '{name}'");
        }
        ConfigCommand::Info { name } => {
            let configuration = Configuration::load(name, store)?;
            println!("Name:\n\t{}", configuration.name);
            println!("Description:\n\t{}", configuration.description);
            println!("Headers:\n\t{}", configuration.headers);
            println!("Transforms:");
            for transform in configuration.transforms()? {
                println!("\t{transform}");
            }
        }
    }
    Ok(())
}

pub fn run_records(command: &RecordsCommand, store: &SledStore) -> PipelineResult<()> {
    match command {
        RecordsCommand::List => {
            let mut transactions = store.list()?;
            transactions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.description.cmp(&b.description)));
            for transaction in &transactions {
                println!("{transaction}");
            }
        }
        RecordsCommand::Count => println!("{}", store.count()?),
    }
    Ok(())
}

/// `--config` names a profile file when such a file exists, otherwise a saved profile.
fn resolve_configuration(config: &str, store: &SledStore) -> PipelineResult<Configuration> {
    let path = Path::new(config);
    if path.is_file() {
        Configuration::from_path(path)
    } else {
        Configuration::load(config, store)
    }
}

fn profile_name(file: &Path) -> PipelineResult<String> {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PipelineError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cannot derive a profile name from {}", file.display()),
            ))
        })
}
