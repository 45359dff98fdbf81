//! Command-line interface for Haulview survey processing.
//!
//! Every command works against a survey store (`--database`): `import`
//! loads survey files into it, `tonnage` imports haul tonnage and applies a
//! period, `reconstruct` triangulates the stored contours and `summary`
//! reports table row counts.
#![forbid(unsafe_code)]

use std::ffi::OsString;
use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};

mod error;
mod import;
mod reconstruct;
mod summary;
mod tonnage;

pub use error::CliError;

use crate::import::ImportArgs;
use crate::reconstruct::ReconstructArgs;
use crate::summary::SummaryArgs;
use crate::tonnage::TonnageArgs;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_INPUTS: &str = "inputs";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ARG_ROUTES: &str = "routes";
pub(crate) const ARG_TONNES: &str = "tonnes";
pub(crate) const ARG_ROUTE_MATCH: &str = "route-match";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ENV_IMPORT_DATABASE: &str = "HAULVIEW_CMDS_IMPORT_DATABASE";
pub(crate) const ENV_IMPORT_INPUTS: &str = "HAULVIEW_CMDS_IMPORT_INPUTS";
pub(crate) const ENV_TONNAGE_DATABASE: &str = "HAULVIEW_CMDS_TONNAGE_DATABASE";
pub(crate) const ENV_RECONSTRUCT_DATABASE: &str = "HAULVIEW_CMDS_RECONSTRUCT_DATABASE";
pub(crate) const ENV_SUMMARY_DATABASE: &str = "HAULVIEW_CMDS_SUMMARY_DATABASE";

/// Run the Haulview CLI with the current process arguments and environment,
/// writing reports to standard output.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid or the command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

/// Run the CLI with explicit arguments, writing reports to `writer`.
///
/// The first argument is the program name, as with [`std::env::args_os`].
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid or the command fails.
pub fn run_from<I, T>(args: I, writer: &mut dyn Write) -> Result<(), CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(CliError::ArgumentParsing)?;
    dispatch(cli.command, writer)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Import(args) => import::run_import(args, writer),
        Command::Tonnage(args) => tonnage::run_tonnage(args, writer),
        Command::Reconstruct(args) => reconstruct::run_reconstruct(args, writer),
        Command::Summary(args) => summary::run_summary(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "haulview",
    about = "Survey import, tonnage and surface tools for mine haul networks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load survey files into a store.
    Import(ImportArgs),
    /// Import tonnage sources and apply a period.
    Tonnage(TonnageArgs),
    /// Triangulate the stored contours.
    Reconstruct(ReconstructArgs),
    /// Report row counts for each store table.
    Summary(SummaryArgs),
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match haulview_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub(crate) fn write_line(writer: &mut dyn Write, line: &str) -> Result<(), CliError> {
    writeln!(writer, "{line}").map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
