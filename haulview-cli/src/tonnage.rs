//! `tonnage` command: import tonnage sources and apply a period.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use haulview::{PeriodReport, RouteMatch, Workspace};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_ROUTE_MATCH, ARG_ROUTES, ARG_TONNES, CliError, ENV_TONNAGE_DATABASE,
    require_existing, write_line,
};

/// CLI arguments for the `tonnage` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Import route definitions and per-period tonnage into the \
                 store, rebuild the joined routes_tonnes table, and \
                 optionally apply one period to every stored polyline.",
    about = "Import tonnage and apply a period"
)]
#[ortho_config(prefix = "HAULVIEW")]
pub(crate) struct TonnageArgs {
    /// Store holding the polylines.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Route definition CSV (`route_id, segment, ...`).
    #[arg(long = ARG_ROUTES, value_name = "path")]
    #[serde(default)]
    pub(crate) routes: Option<Utf8PathBuf>,
    /// Tonnage CSV (`period, route_id, tonne`).
    #[arg(long = ARG_TONNES, value_name = "path")]
    #[serde(default)]
    pub(crate) tonnes: Option<Utf8PathBuf>,
    /// Period to apply.
    #[arg(long, value_name = "n")]
    #[serde(default)]
    pub(crate) period: Option<u32>,
    /// Route matching rule: token (default) or substring.
    #[arg(long = ARG_ROUTE_MATCH, value_name = "rule")]
    #[serde(default)]
    pub(crate) route_match: Option<String>,
}

impl TonnageArgs {
    pub(crate) fn into_config(self) -> Result<TonnageConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TonnageConfig::try_from(merged)
    }
}

/// Resolved `tonnage` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TonnageConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) routes: Option<Utf8PathBuf>,
    pub(crate) tonnes: Option<Utf8PathBuf>,
    pub(crate) period: Option<u32>,
    pub(crate) route_match: RouteMatch,
}

impl TonnageConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        if let Some(routes) = &self.routes {
            require_existing(routes, ARG_ROUTES)?;
        }
        if let Some(tonnes) = &self.tonnes {
            require_existing(tonnes, ARG_TONNES)?;
        }
        Ok(())
    }
}

impl TryFrom<TonnageArgs> for TonnageConfig {
    type Error = CliError;

    fn try_from(args: TonnageArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_TONNAGE_DATABASE,
        })?;
        let route_match = match args.route_match {
            Some(raw) => raw
                .parse::<RouteMatch>()
                .map_err(|reason| CliError::InvalidArgument {
                    field: ARG_ROUTE_MATCH,
                    value: raw.clone(),
                    reason,
                })?,
            None => RouteMatch::default(),
        };
        Ok(Self {
            database,
            routes: args.routes,
            tonnes: args.tonnes,
            period: args.period,
            route_match,
        })
    }
}

pub(crate) fn run_tonnage(args: TonnageArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_tonnage(&config, writer)
}

pub(crate) fn execute_tonnage(
    config: &TonnageConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut workspace = Workspace::new();
    workspace.set_route_match(config.route_match);
    if haulview_fs::file_is_file(&config.database).unwrap_or(false) {
        workspace.load_from_store(&config.database)?;
    }
    workspace.attach_tonnage(&config.database)?;

    let mut imported = false;
    if let Some(routes) = &config.routes {
        let rows = workspace.import_routes(routes)?;
        write_line(writer, &format!("imported {rows} routes from {routes}"))?;
        imported = true;
    }
    if let Some(tonnes) = &config.tonnes {
        let rows = workspace.import_tonnes(tonnes)?;
        write_line(writer, &format!("imported {rows} tonnage rows from {tonnes}"))?;
        imported = true;
    }
    if imported {
        let rows = workspace.build_tonnage()?;
        write_line(writer, &format!("joined {rows} route tonnage rows"))?;
    }
    write_line(
        writer,
        &format!("periods available: {}", workspace.max_period()),
    )?;

    if let Some(period) = config.period {
        let report = workspace.set_period(period)?;
        write_line(writer, &describe_report(&report))?;
    }
    Ok(())
}

fn describe_report(report: &PeriodReport) -> String {
    format!(
        "period {}: {} joined rows, {} polylines matched, {} stored polylines updated",
        report.period, report.rows, report.matched, report.persisted
    )
}
