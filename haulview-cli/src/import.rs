//! `import` command: load survey files and persist them to a store.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use haulview::{EntityBatch, EntityKind, IngestMode, SourceFormat, Workspace};
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_FORMAT, ARG_INPUTS, CliError, ENV_IMPORT_DATABASE, ENV_IMPORT_INPUTS,
    require_existing, write_line,
};

/// CLI arguments for the `import` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load one or more survey files and replace the matching \
                 tables of the store. The first file starts a new session and \
                 later files append, so identifiers keep increasing across \
                 files. Formats are inferred from extensions (.xyz, .srg, \
                 .csv) unless --format is given.",
    about = "Load survey files into a store"
)]
#[ortho_config(prefix = "HAULVIEW")]
pub(crate) struct ImportArgs {
    /// Survey files to load, in order.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) inputs: Vec<Utf8PathBuf>,
    /// Store to write (`.db`).
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Reader to use for every input: polyline-text, polyline-csv,
    /// point-list or surface-text.
    #[arg(long = ARG_FORMAT, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<String>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) inputs: Vec<Utf8PathBuf>,
    pub(crate) database: Utf8PathBuf,
    pub(crate) format: Option<SourceFormat>,
}

impl ImportConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        self.inputs
            .iter()
            .try_for_each(|input| require_existing(input, ARG_INPUTS))
    }
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        if args.inputs.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_INPUTS,
                env: ENV_IMPORT_INPUTS,
            });
        }
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_IMPORT_DATABASE,
        })?;
        let format = args
            .format
            .map(|raw| {
                raw.parse::<SourceFormat>()
                    .map_err(|reason| CliError::InvalidArgument {
                        field: ARG_FORMAT,
                        value: raw.clone(),
                        reason,
                    })
            })
            .transpose()?;
        Ok(Self {
            inputs: args.inputs,
            database,
            format,
        })
    }
}

pub(crate) fn run_import(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_import(&config, writer)
}

pub(crate) fn execute_import(config: &ImportConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    debug!("importing {} files into {}", config.inputs.len(), config.database);
    let mut workspace = Workspace::new();
    for (index, input) in config.inputs.iter().enumerate() {
        let mode = if index == 0 {
            IngestMode::NewSession
        } else {
            IngestMode::Append
        };
        let batches = match config.format {
            Some(format) => vec![workspace.load_from_file(input, format, mode)?],
            None => workspace.load_detected(input, mode)?,
        };
        for batch in &batches {
            write_line(writer, &describe_batch(input, batch))?;
        }
    }

    let kinds: Vec<EntityKind> = EntityKind::ALL
        .into_iter()
        .filter(|kind| workspace.store().has_any(*kind))
        .collect();
    if kinds.is_empty() {
        return Err(CliError::NothingImported);
    }
    for kind in kinds {
        let rows = workspace.save_to_store(&config.database, kind)?;
        write_line(
            writer,
            &format!("saved {rows} {kind} rows to {}", config.database),
        )?;
    }
    Ok(())
}

fn describe_batch(input: &Utf8Path, batch: &EntityBatch) -> String {
    match (batch.first_id(), batch.last_id()) {
        (Some(first), Some(last)) => format!(
            "{input}: {} {} entities (ids {first}..={last})",
            batch.len(),
            batch.kind
        ),
        _ => format!("{input}: no {} entities", batch.kind),
    }
}
