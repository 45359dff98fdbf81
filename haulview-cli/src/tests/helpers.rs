//! Test helpers for writing survey inputs and capturing CLI output.

use super::*;
use camino::Utf8PathBuf;
use tempfile::TempDir;

/// A scratch directory of survey inputs.
#[derive(Debug)]
pub(super) struct SurveyFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SurveyFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write survey file");
        path
    }

    /// Two routed haul roads in polyline CSV form.
    pub(super) fn haul_roads(&self) -> Utf8PathBuf {
        self.write(
            "roads.csv",
            "$\nR1,0,0,100\nR1,3,4,110\n$\nR2,10,0,100\nR2,10,5,100\n",
        )
    }

    /// Two roads in polyline text form.
    pub(super) fn plain_roads(&self) -> Utf8PathBuf {
        self.write("roads.xyz", "$\n0 0 0\n3 4 10\n$\n5 5 0\n6 6 1\n")
    }

    /// Three square contours climbing a pyramid.
    pub(super) fn contours(&self) -> Utf8PathBuf {
        self.write(
            "hill.srg",
            "$\n0 0 100\n40 0 100\n40 40 100\n0 40 100\n\
             $\n10 10 105\n30 12 105\n29 31 105\n9 29 105\n\
             $\n20 21 112\n",
        )
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.path("survey.db")
    }
}

/// Run the CLI with `args` after the program name, returning its output.
pub(super) fn run_cli(args: &[&str]) -> Result<String, CliError> {
    let mut output = Vec::new();
    let invocation = std::iter::once("haulview").chain(args.iter().copied());
    run_from(invocation, &mut output)?;
    Ok(String::from_utf8(output).expect("utf-8 output"))
}
