use std::{io, path::PathBuf};

use tether_deck::ConfigError;
use thiserror::Error;

/// Errors raised while configuring, compiling, or running a study.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("study is already compiled and can no longer be configured")]
    AlreadyCompiled,

    #[error("no study configured")]
    NotConfigured,

    #[error("failed to access `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid study file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("engine failed: {0}")]
    Engine(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
