//! `summary` command: report row counts for every store table.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use haulview::{PersistenceGateway, Table, TonnageAggregator, WorkspaceError};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, CliError, ENV_SUMMARY_DATABASE, require_existing, write_line};

/// CLI arguments for the `summary` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Report row counts for each store table")]
#[ortho_config(prefix = "HAULVIEW")]
pub(crate) struct SummaryArgs {
    /// Store to inspect.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

pub(crate) fn run_summary(args: SummaryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let database = merged.database.ok_or(CliError::MissingArgument {
        field: ARG_DATABASE,
        env: ENV_SUMMARY_DATABASE,
    })?;
    require_existing(&database, ARG_DATABASE)?;
    execute_summary(&database, writer)
}

pub(crate) fn execute_summary(
    database: &Utf8Path,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let gateway = PersistenceGateway::new(database);
    for table in Table::ALL {
        if gateway.table_exists(table.name()) {
            let rows = gateway
                .row_count(table.name())
                .map_err(WorkspaceError::from)?;
            write_line(writer, &format!("{table}: {rows} rows"))?;
        } else {
            write_line(writer, &format!("{table}: missing"))?;
        }
    }
    let status = TonnageAggregator::new(database).status();
    let readiness = if status.routes_tonnes {
        "built"
    } else if status.sources_ready() {
        "ready to build"
    } else {
        "sources missing"
    };
    write_line(writer, &format!("tonnage: {readiness}"))
}
