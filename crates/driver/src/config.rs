//! Study files and run settings.

use std::{fs, path::Path, path::PathBuf, str::FromStr};

use serde::Deserialize;
use tether_core::Problem;
use tether_deck::Study;

use crate::Error;

/// Settings passed through to the engine for a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory the deck is written to and the engine runs in.
    pub work_dir: PathBuf,
    /// File the engine's standard output is redirected to.
    pub stdout: Option<PathBuf>,
    /// File the engine's standard error is redirected to.
    pub stderr: Option<PathBuf>,
    /// Resume from the engine's restart file.
    pub restart: bool,
    pub mpi: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            stdout: None,
            stderr: None,
            restart: false,
            mpi: false,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }
}

/// A study described in TOML.
///
/// ```toml
/// name = "beam"
///
/// [settings]
/// work_dir = "runs"
///
/// [study.method]
/// kind = "optimization"
/// method = "conmin"
///
/// [[problem.parameters]]
/// name = "width"
/// value = 1.0
/// lower = 0.1
/// upper = 5.0
///
/// [[problem.objectives]]
/// name = "mass"
/// ```
///
/// The `problem` table is only needed when no model is at hand to declare
/// one, as with `tether compile`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyFile {
    pub name: String,
    #[serde(default)]
    pub settings: Settings,
    pub study: Study,
    pub problem: Option<Problem>,
}

impl StudyFile {
    /// Reads and parses a study file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid study.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(Error::io(path))?;
        text.parse()
    }
}

impl FromStr for StudyFile {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(text)?)
    }
}
