//! `reconstruct` command: triangulate stored contours and export the mesh.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use haulview::{
    PresentationCfg, ProjectionPlane, ReconstructionProfile, SurfaceMesh, Workspace,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_OUTPUT, CliError, ENV_RECONSTRUCT_DATABASE, require_existing, write_line,
};

/// CLI arguments for the `reconstruct` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the contours from a store, triangulate them with the \
                 given profile and write the mesh, its normals and feature \
                 edges as JSON. Unset parameters use the profile defaults.",
    about = "Triangulate stored contours"
)]
#[ortho_config(prefix = "HAULVIEW")]
pub(crate) struct ReconstructArgs {
    /// Store holding the contours.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Write the mesh JSON here instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Merge distance as a fraction of the cloud diagonal.
    #[arg(long, value_name = "fraction")]
    #[serde(default)]
    pub(crate) cleaner_tolerance: Option<f64>,
    /// Largest kept circumradius; 0 keeps the convex hull.
    #[arg(long, value_name = "distance")]
    #[serde(default)]
    pub(crate) alpha: Option<f64>,
    /// Coincidence distance as a fraction of the projected diagonal.
    #[arg(long, value_name = "fraction")]
    #[serde(default)]
    pub(crate) triangulation_tolerance: Option<f64>,
    /// Super-triangle margin multiplier.
    #[arg(long, value_name = "factor")]
    #[serde(default)]
    pub(crate) offset: Option<f64>,
    /// Dihedral angle in degrees above which edges are sharp.
    #[arg(long, value_name = "degrees")]
    #[serde(default)]
    pub(crate) feature_angle: Option<f64>,
    /// Projection plane: bestfit, xy, yz or xz.
    #[arg(long, value_name = "plane")]
    #[serde(default)]
    pub(crate) projection_plane: Option<ProjectionPlane>,
}

impl ReconstructArgs {
    pub(crate) fn into_config(self) -> Result<ReconstructConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReconstructConfig::try_from(merged)
    }
}

/// Resolved `reconstruct` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReconstructConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) profile: ReconstructionProfile,
}

impl TryFrom<ReconstructArgs> for ReconstructConfig {
    type Error = CliError;

    fn try_from(args: ReconstructArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_RECONSTRUCT_DATABASE,
        })?;
        let defaults = ReconstructionProfile::default();
        let profile = ReconstructionProfile::new(
            args.cleaner_tolerance.unwrap_or(defaults.cleaner_tolerance),
            args.alpha.unwrap_or(defaults.alpha),
            args.triangulation_tolerance
                .unwrap_or(defaults.triangulation_tolerance),
            args.offset.unwrap_or(defaults.offset),
            args.feature_angle.unwrap_or(defaults.feature_angle),
            args.projection_plane.unwrap_or(defaults.projection_plane),
        )?;
        Ok(Self {
            database,
            output: args.output,
            profile,
        })
    }
}

/// JSON document written by the command.
#[derive(Debug, Serialize)]
struct MeshExport<'a> {
    profile: &'a ReconstructionProfile,
    presentation: &'a PresentationCfg,
    mesh: &'a SurfaceMesh,
}

pub(crate) fn run_reconstruct(
    args: ReconstructArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.database, ARG_DATABASE)?;
    execute_reconstruct(&config, writer)
}

pub(crate) fn execute_reconstruct(
    config: &ReconstructConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let mut workspace = Workspace::new();
    workspace.load_from_store(&config.database)?;
    let mesh = workspace.reconstruct_surface(&config.profile)?;
    let export = MeshExport {
        profile: &config.profile,
        presentation: workspace.presentation(),
        mesh: &mesh,
    };

    match &config.output {
        Some(path) => {
            let file = haulview_fs::create_utf8_file(path).map_err(|source| {
                CliError::CreateOutput {
                    path: path.clone(),
                    source,
                }
            })?;
            let mut file = std::io::BufWriter::new(file);
            serde_json::to_writer_pretty(&mut file, &export).map_err(CliError::SerialiseMesh)?;
            file.flush().map_err(CliError::WriteOutput)?;
            write_line(
                writer,
                &format!(
                    "wrote {} vertices and {} triangles to {path}",
                    mesh.vertex_count(),
                    mesh.triangle_count()
                ),
            )
        }
        None => {
            serde_json::to_writer_pretty(&mut *writer, &export).map_err(CliError::SerialiseMesh)?;
            write_line(writer, "")
        }
    }
}
